use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use newsclf::config::MAX_BODY_BYTES;
use newsclf::labels::RawLabel;
use newsclf::model::model_manager::ModelManager;
use newsclf::model::model_utils::{Classifier, Features, Vectorizer};
use newsclf::prediction::AppState;
use newsclf::serve::configure;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

struct StubVectorizer;

#[async_trait]
impl Vectorizer for StubVectorizer {
    async fn transform(&self, texts: Vec<&str>) -> anyhow::Result<Features> {
        Ok(Features::zeros((texts.len(), 4)))
    }
}

enum StubClassifier {
    Returns(RawLabel),
    Fails,
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn predict(&self, features: &Features) -> anyhow::Result<Vec<RawLabel>> {
        match self {
            StubClassifier::Returns(label) => Ok(vec![label.clone(); features.nrows()]),
            StubClassifier::Fails => anyhow::bail!("classifier blew up"),
        }
    }
}

fn stub_state(classifier: StubClassifier) -> web::Data<AppState> {
    let models = ModelManager::new(Arc::new(StubVectorizer), Arc::new(classifier));
    web::Data::new(AppState::new(models))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state).configure(configure)).await
    };
}

#[actix_web::test]
async fn test_healthcheck() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn test_predict_rejects_empty_text() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("REAL"))));
    for payload in [json!({"text": ""}), json!({"text": "   "}), json!({}), json!({"text": null})] {
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {payload}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "No text provided"}));
    }
}

#[actix_web::test]
async fn test_predict_tolerates_unparseable_body() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("REAL"))));
    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(("content-type", "text/plain"))
        .set_payload("definitely not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_predict_real_is_zero() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("REAL"))));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"text": "Local council approves new housing plan."}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"prediction": 0}));
}

#[actix_web::test]
async fn test_predict_passes_through_unclamped_integer() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("42"))));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"text": "anything"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"prediction": 42}));
}

#[actix_web::test]
async fn test_predict_internal_error() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"text": "some text"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "internal error");
    assert!(body["detail"].as_str().unwrap().contains("classifier blew up"));
}

#[actix_web::test]
async fn test_predict_unrecognized_label() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("banana"))));
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"text": "some text"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unrecognized model label");
    assert!(body["detail"].as_str().unwrap().contains("banana"));
}

#[actix_web::test]
async fn test_hidden_error_detail() {
    let models = ModelManager::new(Arc::new(StubVectorizer), Arc::new(StubClassifier::Fails));
    let state = web::Data::new(AppState::new(models).with_error_detail(false));
    let app = app!(state);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({"text": "some text"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "internal error"}));
}

#[actix_web::test]
async fn test_demo_get_renders_form() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::get().uri("/demo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<form method=\"POST\">"));
    assert!(!body.contains("Prediction (0/1)"));
}

#[actix_web::test]
async fn test_demo_post_shows_prediction() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("FAKE"))));
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", "  Lizards <run> the market  ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Prediction (0/1):</strong> 1"));
    assert!(body.contains("<code>FAKE</code>"));
    assert!(body.contains("Lizards &lt;run&gt; the market</textarea>"));
}

#[actix_web::test]
async fn test_demo_post_empty_text() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!body.contains("Prediction (0/1)"));
    assert!(!body.contains("<h3>Error</h3>"));
}

#[actix_web::test]
async fn test_demo_post_failure() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", "some text")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<h3>Error</h3>"));
    assert!(body.contains("classifier blew up"));
}

#[actix_web::test]
async fn test_bundled_models_end_to_end() {
    let model_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models");
    let models = ModelManager::load(
        &model_dir.join("basic_classifier.json"),
        &model_dir.join("count_vectorizer.json"),
    )
    .unwrap();
    let app = app!(web::Data::new(AppState::new(models)));

    let cases = [
        ("BREAKING: Government confirms lizard people control the stock market.", 1),
        ("Local council approves new housing plan after public consultation.", 0),
    ];
    for (text, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(json!({ "text": text }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "prediction": expected }), "text {text:?}");
    }
}

#[actix_web::test]
async fn test_demo_post_without_body_renders_form() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::post().uri("/demo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<form method=\"POST\">"));
    assert!(!body.contains("<h3>Error</h3>"));
}

#[actix_web::test]
async fn test_demo_post_wrong_content_type_renders_form() {
    let app = app!(stub_state(StubClassifier::Fails));
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_json(json!({"text": "some text"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!body.contains("<h3>Error</h3>"));
}

#[actix_web::test]
async fn test_demo_accepts_article_sized_text() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("REAL"))));
    let text = "council ".repeat(50 * 1024 / 8);
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", text.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Prediction (0/1):</strong> 0"));
}

#[actix_web::test]
async fn test_predict_accepts_large_json_body() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("FAKE"))));
    let text = "lizard ".repeat(300 * 1024 / 7);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({ "text": text }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"prediction": 1}));
}

#[actix_web::test]
async fn test_predict_body_over_cap_reads_as_empty() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("FAKE"))));
    let text = "x".repeat(MAX_BODY_BYTES + 1);
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({ "text": text }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "No text provided"}));
}

#[actix_web::test]
async fn test_demo_hidden_error_detail_shows_public_message() {
    let models = ModelManager::new(Arc::new(StubVectorizer), Arc::new(StubClassifier::Fails));
    let state = web::Data::new(AppState::new(models).with_error_detail(false));
    let app = app!(state);
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", "some text")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<pre style=\"white-space:pre-wrap\">internal error</pre>"));
    assert!(!body.contains("classifier blew up"));
}

#[actix_web::test]
async fn test_demo_unrecognized_label() {
    let app = app!(stub_state(StubClassifier::Returns(RawLabel::from("banana"))));
    let req = test::TestRequest::post()
        .uri("/demo")
        .set_form([("text", "some text")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("<h3>Error</h3>"));
    assert!(body.contains("banana"));
    assert!(!body.contains("Prediction (0/1)"));
}
