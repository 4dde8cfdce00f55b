use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use common_http_errors::ERROR_CODE_HEADER;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

const SERVICE_NAME: &str = "rating-service";

#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    rating_submissions: IntCounterVec,
    http_errors: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "ratings_login_attempts_total",
                "Count of login attempts grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let rating_submissions = IntCounterVec::new(
            Opts::new(
                "ratings_submissions_total",
                "Count of rating submissions grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(rating_submissions.clone()))?;

        let http_errors = IntCounterVec::new(
            Opts::new(
                "http_errors_total",
                "Count of HTTP error responses emitted (status >= 400)",
            ),
            &["service", "code", "status"],
        )?;
        registry.register(Box::new(http_errors.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            rating_submissions,
            http_errors,
        })
    }

    pub fn login_attempt(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn rating_submission(&self, outcome: &str) {
        self.rating_submissions.with_label_values(&[outcome]).inc();
    }

    pub fn http_error(&self, code: &str, status: StatusCode) {
        self.http_errors
            .with_label_values(&[SERVICE_NAME, code, status.as_str()])
            .inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}

/// Counts every response with status >= 400, labelled by its `X-Error-Code`.
pub async fn track_http_errors(
    State(metrics): State<Arc<ApiMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get(ERROR_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics.http_error(code, status);
    }
    resp
}
