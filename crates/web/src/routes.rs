use crate::error::AppError;
use askama::Template;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use menu_core::{resolve_all, Catalog, DeckDate, MenuLayout};
use menu_pptx::{StylePolicy, TemplateDeck};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Shared, read-only state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub layout: Arc<MenuLayout>,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub styling: StylePolicy,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        layout: MenuLayout,
        template_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        styling: StylePolicy,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            layout: Arc::new(layout),
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            styling,
        }
    }
}

pub struct MealForm {
    pub name: String,
    pub label: String,
    pub slots: Vec<usize>,
}

pub struct ItemOption {
    pub id: String,
    pub name: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub meals: Vec<MealForm>,
    pub items: Vec<ItemOption>,
}

impl IndexTemplate {
    fn new(state: &AppState) -> Self {
        let meals = state
            .layout
            .meals
            .iter()
            .map(|meal| MealForm {
                name: meal.name.clone(),
                label: meal.label(),
                slots: (1..=meal.slots).collect(),
            })
            .collect();
        let items = state
            .catalog
            .items()
            .iter()
            .map(|item| ItemOption {
                id: item.id.clone(),
                name: item.name.clone(),
            })
            .collect();
        Self { meals, items }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_index).post(post_index))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(IndexTemplate::new(&state).render()?))
}

async fn post_index(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let date = DeckDate::today();
    let file_name = date.output_file_name();

    let bytes = tokio::task::spawn_blocking(move || generate(&state, &fields, &date))
        .await
        .map_err(|e| AppError::Internal(format!("Deck task failed: {}", e)))??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Resolve the submitted form, render the deck and save it to the output
/// directory. Returns the deck bytes for the response body.
fn generate(
    state: &AppState,
    fields: &HashMap<String, String>,
    date: &DeckDate,
) -> Result<Vec<u8>, AppError> {
    let selections = state.layout.selections_from_fields(fields);
    let filled: usize = selections.iter().map(|s| s.filled()).sum();
    log::info!("Generating deck for {} with {} selected items", date.long(), filled);

    let meals = resolve_all(&state.catalog, &selections);
    let template = TemplateDeck::open(&state.template_path)?;
    let deck = menu_pptx::substitute(&template, &meals, date, state.styling)?;
    menu_pptx::save(&deck.bytes, &state.output_dir, date)?;
    Ok(deck.bytes)
}

async fn health() -> &'static str {
    "OK"
}
