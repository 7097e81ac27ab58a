use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use hyper::Method;
use tracing::info;

/// Logs every request with the status it got and how long it took
pub async fn logger_middleware(
    method: Method,
    request: Request<Body>,
    next: Next<Body>,
) -> Response {
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        "{method} {uri} {} {}ms",
        response.status().as_u16(),
        start.elapsed().as_millis()
    );

    response
}
