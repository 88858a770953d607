/// HTTP endpoint for working-date calculations
/// GET /calculate-date?days=&hours=&date= plus /health and /metrics

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::CalendarError;
use crate::health::{build_health_body, build_metrics_body, ServiceMetrics};
use crate::holidays::HolidaySource;
use crate::orchestrator::WorkingDateService;
use crate::request::parse_query;

/// Timeout for reading HTTP request (prevents slow-loris attacks)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Successful calculation body
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DateResponse {
    /// UTC, ISO 8601, whole seconds
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Bind `0.0.0.0:port` and serve until cancelled
pub async fn run_server<S>(
    port: u16,
    service: Arc<WorkingDateService<S>>,
    metrics: Arc<ServiceMetrics>,
    cancel_token: CancellationToken,
) -> std::io::Result<()>
where
    S: HolidaySource + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}/calculate-date", addr);
    serve(listener, service, metrics, cancel_token).await;
    Ok(())
}

/// Accept loop on an already-bound listener
pub async fn serve<S>(
    listener: TcpListener,
    service: Arc<WorkingDateService<S>>,
    metrics: Arc<ServiceMetrics>,
    cancel_token: CancellationToken,
) where
    S: HolidaySource + 'static,
{
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((mut socket, peer_addr)) => {
                        let service = Arc::clone(&service);
                        let metrics = Arc::clone(&metrics);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(&mut socket, &service, &metrics).await {
                                debug!("Error handling request from {}: {}", peer_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Server shutting down");
                break;
            }
        }
    }
}

async fn handle_connection<S: HolidaySource>(
    socket: &mut TcpStream,
    service: &WorkingDateService<S>,
    metrics: &ServiceMetrics,
) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];

    let n = match timeout(REQUEST_TIMEOUT, socket.read(&mut buf)).await {
        Ok(result) => result?,
        Err(_) => {
            debug!("Request timeout after {:?}", REQUEST_TIMEOUT);
            return Ok(());
        }
    };

    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buf[..n]);
    let mut request_line = request.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("");
    let target = request_line.next().unwrap_or("/");

    let response = route(method, target, service, metrics).await;

    socket.write_all(response.as_bytes()).await?;
    socket.flush().await?;

    Ok(())
}

/// Produce the full HTTP response for a request line
pub async fn route<S: HolidaySource>(
    method: &str,
    target: &str,
    service: &WorkingDateService<S>,
    metrics: &ServiceMetrics,
) -> String {
    if method != "GET" {
        return build_response(405, "Method Not Allowed", "application/json", r#"{"error":"Method Not Allowed"}"#);
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match path {
        "/" => build_response(200, "OK", "text/plain", "Hello, World!"),
        "/calculate-date" | "/calculate-date/" => handle_calculate(query, service, metrics).await,
        "/health" | "/healthz" | "/health/" => {
            let body = build_health_body(&metrics.status(), service.provider().is_loaded());
            build_response(200, "OK", "application/json", &body)
        }
        "/metrics" => {
            let body = build_metrics_body(&metrics.status(), service.provider().is_loaded());
            build_response(200, "OK", "text/plain; version=0.0.4", &body)
        }
        _ => build_response(404, "Not Found", "application/json", r#"{"error":"Not Found"}"#),
    }
}

async fn handle_calculate<S: HolidaySource>(
    query: &str,
    service: &WorkingDateService<S>,
    metrics: &ServiceMetrics,
) -> String {
    let result = match parse_query(query) {
        Ok(request) => service.calculate(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(date) => {
            metrics.record_success();
            build_date_response(date)
        }
        Err(e) if e.is_client_error() => {
            warn!("Rejected request '{}': {}", query, e);
            metrics.record_rejection();
            build_error_response(400, "Bad Request", &e)
        }
        Err(e) => {
            error!("Calculation failed: {}", e);
            metrics.record_failure();
            build_error_response(503, "Service Unavailable", &e)
        }
    }
}

/// `2025-04-21T20:00:00Z`
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn build_date_response(date: DateTime<Utc>) -> String {
    let body = to_json(&DateResponse {
        date: format_instant(date),
    });
    build_response(200, "OK", "application/json", &body)
}

fn build_error_response(status_code: u16, status_text: &str, err: &CalendarError) -> String {
    let body = to_json(&ErrorResponse {
        error: err.code().to_string(),
        message: err.to_string(),
    });
    build_response(status_code, status_text, "application/json", &body)
}

fn to_json<T: Serialize>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        r#"{"error":"ServerError","message":"internal server error"}"#.to_string()
    })
}

fn build_response(status_code: u16, status_text: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_code,
        status_text,
        content_type,
        body.len(),
        body
    )
}
