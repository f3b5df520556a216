use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use super::protocol::{JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse};
use crate::dispatcher::Dispatcher;

const MAX_REQUEST_SIZE: usize = 1024 * 1024;

const MAX_CONNECTIONS: usize = 256;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

const TOO_LARGE_RESPONSE: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid request: request too large"},"id":null}"#;

const SERIALIZE_FAILED_RESPONSE: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"internal error: failed to serialize response"},"id":null}"#;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("read error: {0}")]
    Read(#[source] std::io::Error),

    #[error("write error: {0}")]
    Write(#[source] std::io::Error),
}

/// Accepts connections and answers one JSON-RPC request per line.
#[derive(Debug)]
pub struct AccountServer {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl AccountServer {
    pub async fn bind(addr: &str, dispatcher: Dispatcher) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until `shutdown` resolves. In-flight connections are left to
    /// finish on their own tasks.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.local_addr() {
            tracing::info!(
                addr = %addr,
                chains = ?self.dispatcher.registry().supported_chains(),
                "wallet account rpc service started"
            );
        }

        let permits = Arc::new(Semaphore::new(MAX_CONNECTIONS));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let Ok(permit) = Arc::clone(&permits).try_acquire_owned() else {
                                tracing::warn!(%peer, "connection limit reached ({MAX_CONNECTIONS}), rejecting");
                                drop(stream);
                                continue;
                            };
                            let dispatcher = Arc::clone(&self.dispatcher);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(dispatcher, stream).await {
                                    tracing::warn!(%peer, error = %e, "connection error");
                                }
                                drop(permit);
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "accept error");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
                () = &mut shutdown => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(dispatcher: Arc<Dispatcher>, stream: TcpStream) -> Result<(), ServerError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_REQUEST_SIZE as u64 + 1)
            .read_until(b'\n', &mut line)
            .await
            .map_err(ServerError::Read)?;
        if read == 0 {
            break;
        }

        if line.len() > MAX_REQUEST_SIZE && line.last() != Some(&b'\n') {
            tracing::warn!(limit = MAX_REQUEST_SIZE, "request too large, disconnecting");
            let _ = writer.write_all(TOO_LARGE_RESPONSE.as_bytes()).await;
            let _ = writer.write_all(b"\n").await;
            let _ = writer.flush().await;
            break;
        }

        let response = match std::str::from_utf8(&line) {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(text) => process_line(&dispatcher, text.trim()).await,
            Err(e) => JsonRpcResponse::error(JsonRpcId::Null, JsonRpcError::parse_error(&e.to_string())),
        };
        let encoded = serde_json::to_string(&response)
            .unwrap_or_else(|_| SERIALIZE_FAILED_RESPONSE.to_string());

        writer.write_all(encoded.as_bytes()).await.map_err(ServerError::Write)?;
        writer.write_all(b"\n").await.map_err(ServerError::Write)?;
        writer.flush().await.map_err(ServerError::Write)?;
    }

    Ok(())
}

/// Answers one request line. Never fails: every problem becomes a
/// JSON-RPC error response.
pub async fn process_line(dispatcher: &Dispatcher, line: &str) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return JsonRpcResponse::error(JsonRpcId::Null, JsonRpcError::parse_error(&e.to_string()))
        }
    };

    if let Err(e) = request.validate() {
        return JsonRpcResponse::error(request.id, e);
    }

    match dispatcher.handle(&request.method, request.params).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::error(request.id, e.into()),
    }
}
