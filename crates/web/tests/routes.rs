mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use menu_core::DeckDate;
use menu_web::router;
use menu_web::routes::PPTX_CONTENT_TYPE;
use tower::ServiceExt;

const LINES: &[&str] = &[
    "{{day}} {{date}}",
    "{{breakfast_01}} {{breakfast_c_01}} {{breakfast_a_01}}",
    "{{breakfast_02}} {{breakfast_a_02}}",
    "{{lunch_01}} {{lunch_a_01}}",
    "{{dinner_09}}",
];

fn post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(common::state(dir.path(), LINES));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_form_lists_slots_and_items() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(common::state(dir.path(), LINES));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(r#"name="breakfast_1""#));
    assert!(html.contains(r#"name="breakfast_7""#));
    assert!(!html.contains(r#"name="breakfast_8""#));
    assert!(html.contains(r#"name="lunch_9""#));
    assert!(html.contains(r#"name="dinner_9""#));
    assert!(html.contains(r#"<option value="L1">L1 - Tomato Soup</option>"#));
    // item names are HTML-escaped
    assert!(html.contains("Granola &amp; Yogurt") || html.contains("Granola &#38; Yogurt"));
}

#[tokio::test]
async fn test_submit_returns_deck() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(common::state(dir.path(), LINES));

    let response = app
        .oneshot(post("breakfast_1=B1&breakfast_2=B2&lunch_1=L1&lunch_2=UNKNOWN"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let date = DeckDate::today();
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], PPTX_CONTENT_TYPE);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
        format!("attachment; filename=\"{}\"", date.output_file_name())
    );

    let bytes = body_bytes(response).await;
    let slide = common::read_part(&bytes, common::SLIDE);
    assert!(slide.contains(&format!("<a:t>{} {}</a:t>", date.weekday(), date.long())));
    assert!(slide.contains("<a:t>Oatmeal 300 Free / no allergic ingredients.</a:t>"));
    assert!(slide.contains("<a:t>Granola &amp; Yogurt Contains nuts.</a:t>"));
    assert!(slide.contains("<a:t>Tomato Soup Contains celery.</a:t>"));
    assert!(slide.contains("FF0000"));
    assert!(!slide.contains("{{"));

    // the same deck is saved to the output directory
    let saved = std::fs::read(dir.path().join("out").join(date.output_file_name())).unwrap();
    assert_eq!(saved, bytes);
}

#[tokio::test]
async fn test_submit_without_selections() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(common::state(dir.path(), LINES));

    let response = app.oneshot(post("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let slide = common::read_part(&body_bytes(response).await, common::SLIDE);
    assert!(!slide.contains("{{"));
    assert!(!slide.contains("Oatmeal"));
    // empty allergen text is not the allergen-free sentinel
    assert!(slide.contains("FF0000"));
}

#[tokio::test]
async fn test_missing_template_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let state = common::state(dir.path(), LINES);
    std::fs::remove_file(&state.template_path).unwrap();

    let response = router(state).oneshot(post("breakfast_1=B1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!dir.path().join("out").exists());
}
