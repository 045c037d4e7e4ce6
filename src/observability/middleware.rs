use std::time::Instant;

use poem::http::HeaderValue;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result as PoemResult};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Middleware to add request ID and correlation ID to requests
pub struct RequestTracingMiddleware;

impl<E: Endpoint> Middleware<E> for RequestTracingMiddleware {
    type Output = RequestTracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestTracingEndpoint { ep }
    }
}

/// Endpoint wrapper that adds request tracing
pub struct RequestTracingEndpoint<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for RequestTracingEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> PoemResult<Self::Output> {
        let request_id = Uuid::new_v4().to_string();
        let correlation_id = extract_correlation_id(&req)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        for (name, value) in [
            (REQUEST_ID_HEADER, &request_id),
            (CORRELATION_ID_HEADER, &correlation_id),
        ] {
            if let Ok(value) = HeaderValue::from_str(value) {
                req.headers_mut().insert(name, value);
            }
        }

        let span = info_span!(
            "http_request",
            request_id = %request_id,
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        async move {
            let started = Instant::now();
            match self.ep.call(req).await {
                Ok(output) => {
                    let resp = output.into_response();
                    info!(
                        status = resp.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "request completed"
                    );
                    Ok(resp)
                }
                Err(err) => {
                    warn!(
                        status = err.status().as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %err,
                        "request failed"
                    );
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Extract request ID from request
pub fn extract_request_id(req: &Request) -> Option<String> {
    req.header(REQUEST_ID_HEADER).map(|s| s.to_string())
}

/// Extract correlation ID from request
pub fn extract_correlation_id(req: &Request) -> Option<String> {
    req.header(CORRELATION_ID_HEADER).map(|s| s.to_string())
}
