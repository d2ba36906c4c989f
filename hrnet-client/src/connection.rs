//! One-shot client transport.
//!
//! Every call opens a fresh socket, writes one request frame, reads one
//! response frame and closes. Nothing is reused between calls and nothing is
//! retried.

use crate::error::ClientError;
use hrnet_protocol::{
    decode_response, read_frame_limited, to_document, write_frame, Request, Response,
    LOCAL_HOST, MAX_PAYLOAD_SIZE,
};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server address.
    pub addr: SocketAddr,
    /// Connection timeout; `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Deadline covering the request write and the response read.
    pub request_timeout: Option<Duration>,
    /// Largest accepted response body.
    pub max_frame_bytes: usize,
}

impl ConnectionConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Some(Duration::from_secs(10)),
            request_timeout: Some(Duration::from_secs(30)),
            max_frame_bytes: MAX_PAYLOAD_SIZE,
        }
    }

    /// Targets `port` on the loopback host.
    pub fn from_port(port: u16) -> Self {
        let host: IpAddr = LOCAL_HOST
            .parse()
            .unwrap_or(IpAddr::from([127, 0, 0, 1]));
        Self::new(SocketAddr::new(host, port))
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Transport to an hrnet server.
#[derive(Debug, Clone)]
pub struct Connection {
    config: ConnectionConfig,
}

impl Connection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Performs one round trip on a new socket.
    pub async fn call(&self, request: &Request) -> Result<Response, ClientError> {
        let body = to_document(request)?;

        let connect = TcpStream::connect(self.config.addr);
        let mut stream = match self.config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| ClientError::Timeout("connect"))??,
            None => connect.await?,
        };
        tracing::debug!(
            addr = %self.config.addr,
            manager = request.manager(),
            action = request.action(),
            "Sending {} bytes",
            body.len()
        );

        let exchange = async {
            write_frame(&mut stream, body.as_bytes()).await?;
            let frame = read_frame_limited(&mut stream, self.config.max_frame_bytes).await?;
            Ok::<_, ClientError>(frame)
        };
        let frame = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ClientError::Timeout("request"))??,
            None => exchange.await?,
        };
        tracing::debug!(addr = %self.config.addr, "Received {} bytes", frame.payload.len());

        // The server closes first; a failed shutdown changes nothing.
        let _ = stream.shutdown().await;

        Ok(decode_response(&frame)?)
    }
}
