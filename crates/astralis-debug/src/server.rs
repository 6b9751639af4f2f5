//! HTTP status server implementation.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::{LifecycleCommand, StatusState};

#[derive(Debug, thiserror::Error)]
pub enum DebugServerError {
    #[error("Failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("Status state lock was poisoned")]
    StatePoisoned,
    #[error("Invalid response header")]
    InvalidHeader,
}

type JsonResponse = Response<std::io::Cursor<Vec<u8>>>;

/// HTTP server for the status API.
/// Runs on a background thread so it never blocks the frame loop.
pub struct StatusServer {
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Deserialize)]
struct CommandRequest {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'a str,
    uptime_seconds: f64,
    mode: String,
}

#[derive(Serialize)]
struct UnavailableResponse<'a> {
    available: bool,
    reason: &'a str,
}

impl StatusServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            handle: None,
        }
    }

    pub fn start(&mut self, state: Arc<Mutex<StatusState>>) -> Result<(), DebugServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            DebugServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);
        info!(port = actual_port, "status server listening");

        let handle = thread::spawn(move || {
            Self::run_server(server, state);
        });

        self.handle = Some(handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        // tiny_http blocks in incoming_requests(), so the thread is detached
        // rather than joined. It ends with the process.
        self.handle = None;
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: Server, state: Arc<Mutex<StatusState>>) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, &state) {
                warn!(error = %e, "status server request failed");
            }
        }
    }

    fn handle_request(
        mut request: Request,
        state: &Arc<Mutex<StatusState>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!(method = %request.method(), url = request.url(), "status request");
        let response = match (request.method(), request.url()) {
            (&Method::Get, "/health") => {
                let status = lock(state)?;
                json_response(&HealthResponse {
                    status: "ok",
                    uptime_seconds: status.uptime_seconds,
                    mode: status.mode.to_string(),
                })?
            }
            (&Method::Get, "/state") => {
                let status = lock(state)?;
                json_response(&*status)?
            }
            (&Method::Get, "/metrics") => {
                let status = lock(state)?;
                match (&status.metrics, &status.metrics_unavailable) {
                    (Some(metrics), _) => json_response(metrics)?,
                    (None, reason) => json_response(&UnavailableResponse {
                        available: false,
                        reason: reason.as_deref().unwrap_or("no trajectory loaded"),
                    })?
                    .with_status_code(503),
                }
            }
            (&Method::Post, "/command") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                let command: CommandRequest = serde_json::from_str(&body)?;

                let executed = match command.command.parse::<LifecycleCommand>() {
                    Ok(parsed) => {
                        lock(state)?.push_command(parsed);
                        true
                    }
                    Err(reason) => {
                        debug!(%reason, "ignoring status command");
                        false
                    }
                };

                json_response(&CommandResponse {
                    executed,
                    command: command.command,
                })?
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }
}

impl Drop for StatusServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<StatusState>) -> Result<MutexGuard<'_, StatusState>, DebugServerError> {
    state.lock().map_err(|_| DebugServerError::StatePoisoned)
}

fn json_response<T: Serialize>(
    body: &T,
) -> Result<JsonResponse, Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string(body)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| DebugServerError::InvalidHeader)?;
    Ok(Response::from_string(json).with_header(header))
}
