use crate::config::MAX_BODY_BYTES;
use crate::demo::DemoPage;
use crate::prediction::{extract_text, AppState, PredictError};
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct DemoForm {
    text: Option<String>,
}

pub fn status_code(err: &PredictError) -> StatusCode {
    match err {
        PredictError::Validation => StatusCode::BAD_REQUEST,
        PredictError::UnrecognizedLabel(_) | PredictError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &PredictError, expose_detail: bool) -> HttpResponse {
    let response = ErrorResponse {
        error: err.public_message().to_string(),
        detail: err.detail().filter(|_| expose_detail),
    };
    HttpResponse::build(status_code(err)).json(response)
}

async fn healthcheck() -> impl Responder {
    let response = HealthcheckResponse {
        status: "ok".to_string(),
        message: "Sentiment API is running!".to_string(),
    };
    HttpResponse::Ok().json(response)
}

/// A body the extractor rejects (oversized, unreadable) reads as empty text.
async fn predict(state: web::Data<AppState>, body: Option<web::Bytes>) -> HttpResponse {
    let text = body.map(|b| extract_text(&b)).unwrap_or_default();
    match state.handle_predict(&text).await {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(err) => {
            if !matches!(err, PredictError::Validation) {
                error!("[/predict] {err}");
            }
            error_response(&err, state.expose_error_detail)
        }
    }
}

fn render(status: StatusCode, page: &DemoPage) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(page.render())
}

async fn demo_form() -> HttpResponse {
    render(StatusCode::OK, &DemoPage::default())
}

async fn demo_submit(
    state: web::Data<AppState>,
    form: Option<web::Form<DemoForm>>,
) -> HttpResponse {
    let text = form
        .and_then(|f| f.into_inner().text)
        .unwrap_or_default()
        .trim()
        .to_string();
    let mut page = DemoPage {
        text: text.clone(),
        ..Default::default()
    };
    if text.is_empty() {
        return render(StatusCode::OK, &page);
    }

    match state.handle_predict(&text).await {
        Ok(prediction) => {
            page.prediction = Some(prediction.prediction);
            page.raw = Some(prediction.raw.to_text());
            render(StatusCode::OK, &page)
        }
        Err(err) => {
            error!("[/demo] {err}");
            page.error = Some(match err.detail().filter(|_| state.expose_error_detail) {
                Some(detail) => detail,
                None => err.public_message().to_string(),
            });
            render(status_code(&err), &page)
        }
    }
}

/// Registers every route on the given service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .app_data(web::FormConfig::default().limit(MAX_BODY_BYTES))
        .route("/", web::get().to(healthcheck))
        .route("/predict", web::post().to(predict))
        .service(
            web::resource("/demo")
                .route(web::get().to(demo_form))
                .route(web::post().to(demo_submit)),
        );
}

pub async fn run_server(host: String, port: u16, state: AppState) -> std::io::Result<()> {
    let shared_state = web::Data::new(state);
    info!("Starting on http://{host}:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
