/// Request counters for the /health and /metrics endpoints

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the service counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthStatus {
    /// Calculations answered with a date
    pub requests_succeeded: u64,
    /// Requests refused for bad parameters (HTTP 400)
    pub requests_rejected: u64,
    /// Calculations that failed on our side (HTTP 503)
    pub requests_failed: u64,
    /// Timestamp of last calculation request (Unix epoch seconds)
    pub last_request_time: u64,
}

/// Shared counters updated by connection handlers
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    requests_succeeded: AtomicU64,
    requests_rejected: AtomicU64,
    requests_failed: AtomicU64,
    last_request_time: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            last_request_time: self.last_request_time.load(Ordering::Relaxed),
        }
    }

    fn touch(&self) {
        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            Ordering::Relaxed,
        );
    }
}

pub fn build_health_body(status: &HealthStatus, holidays_loaded: bool) -> String {
    format!(
        r#"{{"status":"healthy","holidays_loaded":{},"requests_succeeded":{},"requests_rejected":{},"requests_failed":{},"last_request_time":{}}}"#,
        holidays_loaded,
        status.requests_succeeded,
        status.requests_rejected,
        status.requests_failed,
        status.last_request_time
    )
}

/// Prometheus text exposition format
pub fn build_metrics_body(status: &HealthStatus, holidays_loaded: bool) -> String {
    format!(
        "# HELP workdays_requests_total Total number of calculation requests\n\
         # TYPE workdays_requests_total counter\n\
         workdays_requests_total{{result=\"success\"}} {}\n\
         workdays_requests_total{{result=\"rejected\"}} {}\n\
         workdays_requests_total{{result=\"failure\"}} {}\n\
         # HELP workdays_last_request_timestamp Unix timestamp of last calculation request\n\
         # TYPE workdays_last_request_timestamp gauge\n\
         workdays_last_request_timestamp {}\n\
         # HELP workdays_holidays_loaded Whether the holiday calendar is cached (1) or not (0)\n\
         # TYPE workdays_holidays_loaded gauge\n\
         workdays_holidays_loaded {}\n",
        status.requests_succeeded,
        status.requests_rejected,
        status.requests_failed,
        status.last_request_time,
        if holidays_loaded { 1 } else { 0 }
    )
}
