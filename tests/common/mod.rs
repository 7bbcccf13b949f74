//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sitewatch::config::ConcurrencyConfig;
use sitewatch::dispatch::{ProcessPool, WorkerCommand, WorkerConfig};
use sitewatch::probe::{HttpProbe, ProbeSettings};
use sitewatch::resilience::{RetryPolicy, RetryResolver};
use sitewatch::Dispatcher;

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Start a simple mock backend that always answers 200 with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move {
        MockResponse {
            body: body.to_string(),
            ..MockResponse::status(200)
        }
    })
    .await
}

/// Start a programmable mock backend on an ephemeral port.
///
/// The closure receives the raw request head and decides the response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => head.extend_from_slice(&buf[..n]),
                            }
                        }

                        let response = f(String::from_utf8_lossy(&head).into_owned()).await;
                        if !response.delay.is_zero() {
                            tokio::time::sleep(response.delay).await;
                        }

                        let mut response_str = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            response.status,
                            reason_phrase(response.status),
                            response.body.len(),
                        );
                        for (name, value) in &response.headers {
                            response_str.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response_str.push_str("\r\n");
                        response_str.push_str(&response.body);

                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    closed_ports(1).await[0]
}

/// `n` distinct addresses nothing is listening on.
pub async fn closed_ports(n: usize) -> Vec<SocketAddr> {
    let mut listeners = Vec::with_capacity(n);
    for _ in 0..n {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    listeners.iter().map(|l| l.local_addr().unwrap()).collect()
}

/// Settings for local backends, bypassing any environment proxy.
pub fn local_settings() -> ProbeSettings {
    ProbeSettings {
        system_proxy: false,
        ..Default::default()
    }
}

/// Worker processes running the real `sitewatch` binary.
pub fn worker_pool(settings: ProbeSettings, policy: RetryPolicy) -> ProcessPool {
    ProcessPool::new(
        WorkerCommand::new(env!("CARGO_BIN_EXE_sitewatch"), ["--worker", "--log-level", "warn"]),
        WorkerConfig { settings, policy },
    )
}

/// One shared HTTP probe for thread mode, two worker processes built from
/// the same settings for process mode.
pub fn http_dispatcher(settings: ProbeSettings, policy: RetryPolicy) -> Dispatcher<HttpProbe> {
    let probe = HttpProbe::new(settings.clone()).unwrap();
    let concurrency = ConcurrencyConfig {
        process_workers: Some(2),
        ..Default::default()
    };
    Dispatcher::new(RetryResolver::new(probe, policy), concurrency).with_process_pool(worker_pool(settings, policy))
}
