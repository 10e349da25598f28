//! Request logging middleware with request IDs and timing.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A `Layer` that tags each request with an ID and logs its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLoggerLayer;

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLoggerService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RequestLoggerService { service }
    }
}

/// A `Service` that logs method, path, status and duration per request.
#[derive(Debug, Clone)]
pub struct RequestLoggerService<S> {
    service: S,
}

impl<S, B, ResBody> Service<Request<B>> for RequestLoggerService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);
        let header_value = HeaderValue::from_str(&request_id).ok();

        if !request.headers().contains_key(REQUEST_ID_HEADER) {
            if let Some(value) = header_value.clone() {
                request.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
        }

        let method = request.method().clone();
        let uri = request.uri().path().to_string();
        let start_time = Instant::now();

        let span = tracing::info_span!("request", request_id = %request_id, method = %method, uri = %uri);
        span.in_scope(|| {
            debug!(request_id = %request_id, method = %method, uri = %uri, "Received request");
        });

        let future = self.service.call(request);
        Box::pin(
            async move {
                let mut result = future.await;
                let duration = start_time.elapsed();

                match &mut result {
                    Ok(response) => {
                        if let Some(value) = header_value {
                            response.headers_mut().insert(REQUEST_ID_HEADER, value);
                        }
                        let status = response.status();
                        if status.is_server_error() {
                            warn!(
                                request_id = %request_id,
                                method = %method,
                                uri = %uri,
                                status = status.as_u16(),
                                duration_ms = duration.as_millis(),
                                "Request failed"
                            );
                        } else {
                            info!(
                                request_id = %request_id,
                                method = %method,
                                uri = %uri,
                                status = status.as_u16(),
                                duration_ms = duration.as_millis(),
                                "Request completed"
                            );
                        }
                    }
                    Err(_) => {
                        warn!(
                            request_id = %request_id,
                            method = %method,
                            uri = %uri,
                            duration_ms = duration.as_millis(),
                            "Request errored"
                        );
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
