use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chat_cell::router::chat_routes;
use shared_utils::test_utils::{MockSupabaseRows, TestConfig};

const SENDER: &str = "whatsapp:+5215550000001";
const SENDER_FORM: &str = "whatsapp%3A%2B5215550000001";

fn test_app(supabase_url: &str) -> Router {
    let config = TestConfig {
        supabase_url: supabase_url.to_string(),
        ..TestConfig::default()
    };
    chat_routes(config.to_arc())
}

fn whatsapp_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/whatsapp")
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from(format!("Body={}&From={}", body, SENDER_FORM)))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mock_conversation_upsert(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/conversations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn hola_from_new_sender_returns_twiml_menu() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("sender", format!("eq.{}", SENDER)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mock_conversation_upsert(&server).await;

    let response = test_app(&server.uri())
        .oneshot(whatsapp_request("hola"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );
    let xml = body_text(response).await;
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<Response><Message>"));
    assert!(xml.contains("1. Book an appointment"));
}

#[tokio::test]
async fn menu_option_two_lists_confirmed_appointments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::conversation(SENDER, "menu", None, None)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::appointment(
                SENDER, "Cardiology", "Dr. Perez", "Monday", "9:00 AM", "confirmed"
            )
        ])))
        .mount(&server)
        .await;
    mock_conversation_upsert(&server).await;

    let response = test_app(&server.uri())
        .oneshot(whatsapp_request("2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("Cardiology with Dr. Perez - Monday 9:00 AM"));
}

#[tokio::test]
async fn empty_body_from_new_sender_still_gets_the_menu() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mock_conversation_upsert(&server).await;

    // Twilio sends no Body field for media-only messages.
    let request = Request::builder()
        .method("POST")
        .uri("/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("From={}", SENDER_FORM)))
        .unwrap();

    let response = test_app(&server.uri()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("Pick an option"));
}

#[tokio::test]
async fn conversation_store_failure_aborts_without_twiml() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let response = test_app(&server.uri())
        .oneshot(whatsapp_request("hola"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains("error"));
    assert!(!body.contains("<Response>"));
}
