//! TCP server implementation.
//!
//! Every accepted connection carries exactly one exchange: the worker reads
//! one request frame, runs the handler, writes one response frame and closes
//! the socket. A failure anywhere in that sequence ends that connection only.

use crate::error::ServerError;
use crate::handler::RequestHandler;
use hrnet_protocol::{decode_request, read_frame_limited, to_document, write_frame, ProtocolError};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use uuid::Uuid;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Maximum concurrently served connections.
    pub max_connections: usize,
    /// Deadline for reading the request frame.
    pub read_timeout: Option<Duration>,
    /// Deadline for writing the response frame.
    pub write_timeout: Option<Duration>,
    /// Largest accepted request body.
    pub max_frame_bytes: usize,
    /// Time in-flight connections get to finish after shutdown.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5500)),
            max_connections: 256,
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
            max_frame_bytes: hrnet_protocol::MAX_PAYLOAD_SIZE,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// TCP server dispatching one request per connection to a handler.
pub struct Server<H> {
    config: ServerConfig,
    handler: Arc<H>,
    stats: Arc<ServerStats>,
    shutdown: watch::Sender<bool>,
    running: AtomicBool,
}

impl<H: RequestHandler> Server<H> {
    /// Creates a new server.
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            handler: Arc::new(handler),
            stats: Arc::new(ServerStats::default()),
            shutdown: shutdown_tx,
            running: AtomicBool::new(false),
        }
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        let permits = self.config.max_connections.clamp(1, u32::MAX as usize);
        let limit = Arc::new(Semaphore::new(permits));
        let mut shutdown_rx = self.shutdown.subscribe();

        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Server is ready and listening at {}", local_addr);

        loop {
            // A connection is only accepted once a worker slot is free.
            let permit = tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown_rx) => break,
                permit = limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown_rx) => break,
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
                            self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

                            let handler = self.handler.clone();
                            let stats = self.stats.clone();
                            let config = self.config.clone();

                            tokio::spawn(async move {
                                let conn_id = Uuid::new_v4();
                                tracing::info!(%conn_id, "Client connected: {}", addr);

                                let result =
                                    Self::handle_connection(stream, conn_id, handler, &config, &stats)
                                        .await;
                                if let Err(e) = result {
                                    if e.is_transport() {
                                        tracing::debug!(%conn_id, "Connection {} error: {}", addr, e);
                                    } else {
                                        tracing::warn!(%conn_id, "Connection {} error: {}", addr, e);
                                    }
                                    stats.errors_total.fetch_add(1, Ordering::Relaxed);
                                }

                                stats.connections_active.fetch_sub(1, Ordering::Relaxed);
                                tracing::info!(%conn_id, "Client disconnected: {}", addr);
                                drop(permit);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
            }
        }

        tracing::info!("Server shutting down");
        drop(listener);

        // All permits back means every worker has finished.
        let drained = tokio::time::timeout(
            self.config.shutdown_grace,
            limit.acquire_many(permits as u32),
        )
        .await;
        if drained.is_err() {
            tracing::warn!(
                active = self.stats.connections_active.load(Ordering::Relaxed),
                "Shutdown grace period elapsed with connections still open"
            );
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Serves the single exchange carried by `stream`.
    async fn handle_connection(
        mut stream: TcpStream,
        conn_id: Uuid,
        handler: Arc<H>,
        config: &ServerConfig,
        stats: &ServerStats,
    ) -> Result<(), ServerError> {
        let frame = with_deadline(
            config.read_timeout,
            "read",
            read_frame_limited(&mut stream, config.max_frame_bytes),
        )
        .await?;
        tracing::debug!(%conn_id, "Received {} bytes", frame.payload.len());

        let request = decode_request(&frame)?;
        stats.requests_total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            %conn_id,
            manager = request.manager(),
            action = request.action(),
            "Request"
        );

        let response = tokio::task::spawn_blocking(move || handler.handle(request))
            .await
            .map_err(|e| ServerError::Handler(e.to_string()))?;

        let body = to_document(&response)?;
        with_deadline(
            config.write_timeout,
            "write",
            write_frame(&mut stream, body.as_bytes()),
        )
        .await?;
        tracing::debug!(
            %conn_id,
            success = response.is_success(),
            "Wrote {} bytes",
            body.len()
        );

        stream.shutdown().await?;
        Ok(())
    }

    /// Initiates server shutdown.
    ///
    /// The request is sticky: a server not yet serving stops as soon as it
    /// starts.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Returns whether the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Resolves once shutdown has been requested, including before the call.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn with_deadline<T>(
    deadline: Option<Duration>,
    stage: &'static str,
    fut: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ServerError> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ServerError::Timeout(stage))?
            .map_err(ServerError::from),
        None => fut.await.map_err(ServerError::from),
    }
}
