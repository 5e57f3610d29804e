//! Web front end: a form listing every meal slot, and a POST handler that
//! renders the chosen items into the template deck and returns it as a
//! download.

pub mod config;
pub mod error;
pub mod routes;

pub use config::Config;
pub use error::AppError;
pub use routes::{router, AppState};
