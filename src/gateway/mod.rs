//! Gateway - TCP listener for game-server bridges.
//!
//! Each bridge connection speaks newline-delimited JSON: [`ServerEvent`]s in,
//! [`Action`]s out. Roster events are applied in arrival order; every check
//! runs on its own task and sends its actions back through the connection's
//! writer channel.

pub mod handler;
pub mod protocol;

pub use handler::EventHandler;
pub use protocol::{Action, ServerEvent};

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{error, info, instrument, warn};

/// Longest accepted bridge line; a full roster sync of a large server fits.
const MAX_LINE_LENGTH: usize = 1 << 20;

const OUTBOUND_QUEUE: usize = 100;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid command prefix: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid blocked IP entry: {0}")]
    BlockedIp(String),
}

/// Accepts bridge connections and feeds their events to the handler.
pub struct Gateway {
    listener: TcpListener,
    handler: Arc<EventHandler>,
}

impl Gateway {
    pub async fn bind(addr: SocketAddr, handler: Arc<EventHandler>) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Bridge listener bound");
        Ok(Self { listener, handler })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, GatewayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept bridges forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> Result<(), GatewayError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!(%addr, "Bridge connected");
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        crate::metrics::bridge_connected();
                        serve_bridge(stream, addr, handler).await;
                        crate::metrics::bridge_disconnected();
                        info!(%addr, "Bridge disconnected");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept bridge connection");
                }
            }
        }
    }
}

async fn serve_bridge(stream: TcpStream, addr: SocketAddr, handler: Arc<EventHandler>) {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let (tx, mut rx) = mpsc::channel::<Action>(OUTBOUND_QUEUE);

    loop {
        tokio::select! {
            Some(action) = rx.recv() => {
                let line = match serde_json::to_string(&action) {
                    Ok(line) => line,
                    Err(e) => {
                        error!(peer = %addr, error = %e, "Failed to encode action");
                        continue;
                    }
                };
                if let Err(e) = framed.send(line).await {
                    error!(peer = %addr, error = %e, "Failed to send to bridge");
                    break;
                }
            }
            result = framed.next() => {
                match result {
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let event = match serde_json::from_str::<ServerEvent>(&line) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!(peer = %addr, error = %e, "Failed to parse bridge event");
                                continue;
                            }
                        };
                        if !handler.observe(&event) {
                            continue;
                        }
                        let handler = Arc::clone(&handler);
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            for action in handler.handle(event).await {
                                if tx.send(action).await.is_err() {
                                    break;
                                }
                            }
                        });
                    }
                    Some(Err(e)) => {
                        warn!(peer = %addr, error = %e, "Bridge read error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}
