// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` is notified.
///
/// Connections already being served keep running in their own tasks; the
/// listener is dropped on return so no new ones are accepted.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use crate::storage::memory::MemoryGateway;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn exchange(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let listener =
                    create_reusable_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
                let addr = listener.local_addr().unwrap();
                let gateway = Arc::new(MemoryGateway::new().with_file("/a.md", "alpha"));
                let state = Arc::new(AppState::new(Config::for_tests(), gateway));
                let shutdown = Arc::new(Notify::new());

                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::new(AtomicUsize::new(0)),
                    Arc::clone(&shutdown),
                ));

                let ok = exchange(
                    addr,
                    "GET /?file=/a.md HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(ok.starts_with("HTTP/1.1 200 OK"));
                assert!(ok.contains("server: dropbox-md-cms"));
                assert!(ok.contains(">\nalpha</textarea>"));

                let rejected = exchange(
                    addr,
                    "DELETE / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(rejected.starts_with("HTTP/1.1 405 Method Not Allowed"));
                assert!(rejected.contains("allow: GET, POST"));

                shutdown.notify_one();
                server.await.unwrap();
                assert!(tokio::net::TcpStream::connect(addr).await.is_err());
            })
            .await;
    }
}
