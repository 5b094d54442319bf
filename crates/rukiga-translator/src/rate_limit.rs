use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::warn;

pub const DEFAULT_CLIENT_HEADER: &str = "Fly-Client-IP";
const LOG_INTERVAL: Duration = Duration::from_secs(60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Per-client token bucket in front of the translation routes.
#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    state: SharedState,
    client_header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Clone)]
struct SharedState {
    buckets: Arc<DashMap<String, Bucket>>,
    dropped_since_log: Arc<AtomicU64>,
    last_log: Arc<Mutex<Instant>>,
    last_sweep: Arc<Mutex<Instant>>,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Clone)]
pub struct RateLimiterLayer {
    client_header: HeaderName,
    rate_per_sec: f64,
    burst: f64,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            client_header: HeaderName::from_static("fly-client-ip"),
            rate_per_sec: rate_per_sec as f64,
            burst: burst as f64,
        }
    }

    /// Identify clients by `header` instead of the default proxy header.
    /// Invalid header names keep the current one.
    pub fn with_client_header(mut self, header: &str) -> Self {
        match HeaderName::try_from(header) {
            Ok(name) => self.client_header = name,
            Err(_) => warn!("ignoring invalid rate limit header name {header:?}"),
        }
        self
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            state: SharedState {
                buckets: Arc::new(DashMap::new()),
                dropped_since_log: Arc::new(AtomicU64::new(0)),
                last_log: Arc::new(Mutex::new(Instant::now())),
                last_sweep: Arc::new(Mutex::new(Instant::now())),
            },
            client_header: self.client_header.clone(),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimiter<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        self.sweep_if_needed(Instant::now());
        if let Some(client) = self.client_id(&req)
            && !self.check_and_consume(&client)
        {
            self.state.dropped_since_log.fetch_add(1, Ordering::Relaxed);
            log_drops_if_needed(&self.state);
            return Box::pin(async move {
                Ok((StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(fut)
    }
}

impl<S> RateLimiter<S> {
    /// Last address in the client header, i.e. the one appended by the
    /// nearest proxy; a single-valued header is used whole. Requests without
    /// the header pass freely.
    fn client_id<B>(&self, req: &Request<B>) -> Option<String> {
        req.headers()
            .get(&self.client_header)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.rsplit(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn check_and_consume(&self, client: &str) -> bool {
        let mut entry = self
            .state
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                tokens: self.burst,
                last_refill: Instant::now(),
            });
        let now = Instant::now();
        let elapsed = now
            .saturating_duration_since(entry.last_refill)
            .as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn sweep_if_needed(&self, now: Instant) {
        let Ok(mut last) = self.state.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last) >= SWEEP_INTERVAL {
            self.sweep_idle_buckets(now);
            *last = now;
        }
    }

    /// Drop buckets that have sat idle long enough to be full again; a fresh
    /// bucket for the same client starts full, so nothing is lost.
    fn sweep_idle_buckets(&self, now: Instant) {
        self.state.buckets.retain(|_, bucket| {
            let idle = now.saturating_duration_since(bucket.last_refill);
            let refilled = bucket.tokens + idle.as_secs_f64() * self.rate_per_sec;
            idle < SWEEP_INTERVAL || refilled < self.burst
        });
    }
}

fn log_drops_if_needed(state: &SharedState) {
    let now = Instant::now();
    let Ok(mut last) = state.last_log.lock() else {
        return;
    };
    if now.saturating_duration_since(*last) >= LOG_INTERVAL {
        let dropped = state.dropped_since_log.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("rate limiter dropped {dropped} requests in the last minute");
        }
        *last = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt;
    use tower::service_fn;

    async fn ok(_req: Request<Body>) -> Result<Response<Body>, Infallible> {
        Ok(Response::new(Body::from("ok")))
    }

    fn request(client: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/v1/translate");
        if let Some(client) = client {
            builder = builder.header("x-forwarded-for", client);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn limits_each_client_to_its_burst() {
        let service = RateLimiterLayer::new(1, 2)
            .with_client_header("X-Forwarded-For")
            .layer(service_fn(ok));

        for _ in 0..2 {
            let resp = service
                .clone()
                .oneshot(request(Some("10.0.0.1")))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let limited = service
            .clone()
            .oneshot(request(Some("10.0.0.1")))
            .await
            .unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

        let other = service
            .clone()
            .oneshot(request(Some("10.0.0.2")))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn requests_without_client_header_are_not_limited() {
        let service = RateLimiterLayer::new(1, 1)
            .with_client_header("X-Forwarded-For")
            .layer(service_fn(ok));
        for _ in 0..5 {
            let resp = service.clone().oneshot(request(None)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn keys_on_the_address_appended_by_the_proxy() {
        let layer = RateLimiterLayer::new(1, 1).with_client_header("X-Forwarded-For");
        let service = layer.layer(service_fn(ok));

        let mut passed = 0;
        for i in 0..50 {
            let forwarded = format!("6.6.0.{i}, 10.0.0.1");
            let resp = service
                .clone()
                .oneshot(request(Some(&forwarded)))
                .await
                .unwrap();
            if resp.status() == StatusCode::OK {
                passed += 1;
            }
        }
        assert_eq!(passed, 1);
        assert_eq!(service.state.buckets.len(), 1);
        assert!(service.state.buckets.contains_key("10.0.0.1"));
    }

    #[tokio::test]
    async fn single_valued_header_is_used_whole() {
        let service = RateLimiterLayer::new(1, 1).layer(service_fn(ok));
        let req = Request::builder()
            .uri("/v1/translate")
            .header("fly-client-ip", " 10.0.0.7 ")
            .body(Body::empty())
            .unwrap();
        service.clone().oneshot(req).await.unwrap();
        assert!(service.state.buckets.contains_key("10.0.0.7"));
    }

    #[test]
    fn sweep_drops_only_idle_full_buckets() {
        let service = RateLimiterLayer::new(1, 5).layer(service_fn(ok));
        let now = Instant::now();
        assert!(service.check_and_consume("10.0.0.1"));
        assert!(service.check_and_consume("10.0.0.2"));

        service.sweep_idle_buckets(now);
        assert_eq!(service.state.buckets.len(), 2);

        service.sweep_idle_buckets(now + SWEEP_INTERVAL + Duration::from_secs(1));
        assert!(service.state.buckets.is_empty());
    }

    #[test]
    fn sweep_keeps_drained_buckets() {
        let service = RateLimiterLayer::new(0, 2).layer(service_fn(ok));
        let now = Instant::now();
        assert!(service.check_and_consume("10.0.0.1"));
        assert!(service.check_and_consume("10.0.0.1"));
        assert!(!service.check_and_consume("10.0.0.1"));

        service.sweep_idle_buckets(now + SWEEP_INTERVAL * 10);
        assert!(service.state.buckets.contains_key("10.0.0.1"));
    }

    #[test]
    fn invalid_header_name_keeps_default() {
        let layer = RateLimiterLayer::new(1, 1).with_client_header("bad header");
        assert_eq!(layer.client_header.as_str(), "fly-client-ip");
    }
}
