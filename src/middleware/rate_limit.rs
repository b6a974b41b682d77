use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorTooManyRequests,
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const GUEST_MAX_REQUESTS: u32 = 5;
const GUEST_WINDOW_SECS: u64 = 3600;

/// Fixed-window quota per caller address. Counters live in process memory;
/// each worker keeps its own window, which is enough for a best-effort cap
/// on guest calls to the paid model API.
#[derive(Clone)]
pub struct GuestRateLimit {
    max_requests: u32,
    window: Duration,
    counters: Arc<Mutex<HashMap<String, (Instant, u32)>>>,
}

impl GuestRateLimit {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for GuestRateLimit {
    fn default() -> Self {
        Self::new(GUEST_MAX_REQUESTS, Duration::from_secs(GUEST_WINDOW_SECS))
    }
}

impl<S, B> Transform<S, ServiceRequest> for GuestRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = GuestRateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GuestRateLimitService {
            service,
            max_requests: self.max_requests,
            window: self.window,
            counters: self.counters.clone(),
        }))
    }
}

pub struct GuestRateLimitService<S> {
    service: S,
    max_requests: u32,
    window: Duration,
    counters: Arc<Mutex<HashMap<String, (Instant, u32)>>>,
}

impl<S, B> Service<ServiceRequest> for GuestRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let caller = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let allowed = {
            let mut counters = match self.counters.lock() {
                Ok(counters) => counters,
                // a poisoned lock means another worker thread panicked
                // mid-update; fail open rather than blocking all guests
                Err(poisoned) => poisoned.into_inner(),
            };

            let now = Instant::now();
            let entry = counters.entry(caller).or_insert((now, 0));
            if now.duration_since(entry.0) >= self.window {
                *entry = (now, 0);
            }
            if entry.1 < self.max_requests {
                entry.1 += 1;
                true
            } else {
                false
            }
        };

        if allowed {
            Box::pin(self.service.call(req))
        } else {
            Box::pin(ready(Err(ErrorTooManyRequests(
                "Guest generation quota exceeded. Try again later.",
            ))))
        }
    }
}
