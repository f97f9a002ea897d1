//! request latency
//!
//! Stamps `x-server-time` on every response, records the latency on the
//! `request` span opened by [`super::request_id::request_id`] and flags
//! requests slower than `server.slowRequestMs`.

use axum::extract::Request;
use axum::http::{HeaderValue, Method};
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};
use tracing::{debug, warn, Span};

pub const X_SERVER_TIME: &str = "x-server-time";

#[derive(Clone, Copy, Debug, Default)]
pub struct ServerTimeLayer {
    slow: Option<Duration>,
}

impl ServerTimeLayer {
    /// `slow_request_ms == 0` turns the slow request warning off.
    pub fn new(slow_request_ms: u64) -> Self {
        Self {
            slow: (slow_request_ms > 0).then(|| Duration::from_millis(slow_request_ms)),
        }
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow.is_some_and(|slow| elapsed >= slow)
    }
}

impl<S> Layer<S> for ServerTimeLayer {
    type Service = ServerTime<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServerTime {
            inner,
            layer: *self,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerTime<S> {
    inner: S,
    layer: ServerTimeLayer,
}

impl<S> Service<Request> for ServerTime<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method: Method = req.method().clone();
        let path = req.uri().path().to_owned();
        let span = Span::current();
        let layer = self.layer;
        let start = tokio::time::Instant::now();
        let future = self.inner.call(req);
        Box::pin(async move {
            let mut response = future.await?;
            let elapsed = start.elapsed();
            let micros = elapsed.as_micros() as u64;
            span.record("elapsed_us", micros);

            let status = response.status().as_u16();
            if layer.is_slow(elapsed) {
                warn!(%method, %path, status, elapsed_ms = micros / 1000, "slow request");
            } else {
                debug!(%method, %path, status, elapsed_us = micros, "request served");
            }

            if let Ok(value) = HeaderValue::from_str(&format!("{micros}us")) {
                response.headers_mut().insert(X_SERVER_TIME, value);
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    fn header_micros(res: &Response) -> u64 {
        let value = res.headers()[X_SERVER_TIME].to_str().unwrap();
        value.strip_suffix("us").unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn stamps_elapsed_micros() {
        let svc = ServerTimeLayer::new(0).layer(service_fn(|_req: Request| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }));
        let req = Request::builder().uri("/hello").body(Body::empty()).unwrap();
        let res = svc.oneshot(req).await.unwrap();
        assert!(header_micros(&res) >= 20_000);
    }

    #[test]
    fn slow_threshold() {
        assert!(!ServerTimeLayer::new(0).is_slow(Duration::from_secs(60)));
        assert!(!ServerTimeLayer::default().is_slow(Duration::from_secs(60)));
        let layer = ServerTimeLayer::new(500);
        assert!(!layer.is_slow(Duration::from_millis(499)));
        assert!(layer.is_slow(Duration::from_millis(500)));
    }
}
