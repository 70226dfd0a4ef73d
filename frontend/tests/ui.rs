use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use httpmock::prelude::*;
use reqwest::Url;
use sentiment_ui::error::ClientError;
use sentiment_ui::render::Pages;
use sentiment_ui::types::Label;
use sentiment_ui::{routes, ApiClient, UiState};

fn client_for(base: &str) -> ApiClient {
    client_with_timeout(base, Duration::from_secs(5))
}

fn client_with_timeout(base: &str, timeout: Duration) -> ApiClient {
    let url = Url::parse(base).unwrap();
    ApiClient::new(&url, timeout).unwrap()
}

async fn slow_api(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200)
                .header("content-type", "application/json")
                .delay(Duration::from_millis(500))
                .json_body_obj(&serde_json::json!({ "label": "POSITIVE", "score": 0.9 }));
        })
        .await;
}

/// A loopback port that nothing listens on.
fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn analyze_posts_text_and_decodes_result() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/predict")
                .json_body_obj(&serde_json::json!({ "text": "I love it" }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body_obj(&serde_json::json!({ "label": "POSITIVE", "score": 0.93 }));
        })
        .await;

    let result = client_for(&server.base_url())
        .analyze("I love it")
        .await
        .expect("analysis should succeed");

    mock.assert_async().await;
    assert_eq!(result.label, Label::Positive);
    assert!((result.score - 0.93).abs() < 1e-6);
}

#[tokio::test]
async fn analyze_surfaces_api_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(400)
                .header("content-type", "application/json")
                .json_body_obj(&serde_json::json!({ "detail": "bad input" }));
        })
        .await;

    let err = client_for(&server.base_url())
        .analyze("")
        .await
        .expect_err("400 must be an error");
    assert!(err.to_string().contains("400"));
}

#[tokio::test]
async fn analyze_rejects_unknown_labels() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200)
                .header("content-type", "application/json")
                .json_body_obj(&serde_json::json!({ "label": "NEUTRAL", "score": 0.5 }));
        })
        .await;

    assert!(client_for(&server.base_url()).analyze("hm").await.is_err());
}

#[tokio::test]
async fn analyze_fails_when_api_is_down() {
    let result = client_for(&unreachable_base()).analyze("hello").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn analyze_gives_up_after_timeout() {
    let server = MockServer::start_async().await;
    slow_api(&server).await;

    let err = client_with_timeout(&server.base_url(), Duration::from_millis(100))
        .analyze("slow")
        .await
        .expect_err("a response slower than the timeout must fail");
    match err {
        ClientError::Http(e) => assert!(e.is_timeout(), "{e}"),
    }
}

macro_rules! ui_with {
    ($client:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(UiState {
                    client: $client,
                    pages: Pages::new().unwrap(),
                }))
                .configure(routes::configure),
        )
        .await
    };
}

macro_rules! ui_for {
    ($base:expr) => {
        ui_with!(client_for($base))
    };
}

#[actix_web::test]
async fn index_shows_form_with_sample_text() {
    let app = ui_for!("http://127.0.0.1:8000");

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains("I love everyone and everything"));
    assert!(!html.contains("result-card"));
}

#[actix_web::test]
async fn submission_renders_card_and_chart() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200)
                .header("content-type", "application/json")
                .json_body_obj(&serde_json::json!({ "label": "NEGATIVE", "score": 0.8 }));
        })
        .await;
    let app = ui_for!(&server.base_url());

    let req = test::TestRequest::post()
        .uri("/")
        .set_form([("text", "The staff was rude")])
        .to_request();
    let html = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();

    assert!(html.contains("result-card"));
    assert!(html.contains("NEGATIVE"));
    assert!(html.contains(">0.80<"));
    assert!(html.contains(">0.20<"));
    assert!(html.contains("<svg"));
    assert!(html.contains("The staff was rude"));
}

#[actix_web::test]
async fn unreachable_api_shows_error_without_chart() {
    let app = ui_for!(&unreachable_base());

    let req = test::TestRequest::post()
        .uri("/")
        .set_form([("text", "hello")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Error talking to the API"));
    assert!(!html.contains("result-card"));
    assert!(!html.contains("<svg"));
}

#[actix_web::test]
async fn timed_out_call_shows_error_without_chart() {
    let server = MockServer::start_async().await;
    slow_api(&server).await;
    let app = ui_with!(client_with_timeout(
        &server.base_url(),
        Duration::from_millis(100)
    ));

    let req = test::TestRequest::post()
        .uri("/")
        .set_form([("text", "slow")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Error talking to the API"));
    assert!(!html.contains("result-card"));
    assert!(!html.contains("<svg"));
}
