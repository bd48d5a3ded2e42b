// Server loop module
// Accepts connections until shutdown is requested

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Run the accept loop until `shutdown` resolves.
///
/// Each connection gets its own task; the loop never waits on a request.
/// After shutdown, open connections get up to the read timeout to finish.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_server_stop(active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    drop(listener);
    drain(&active_connections, state.read_timeout()).await;
}

/// Wait for open connections to close, at most `grace`
async fn drain(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = Instant::now() + grace;
    while active_connections.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let remaining = active_connections.load(Ordering::SeqCst);
    if remaining > 0 {
        logger::log_warning(&format!("Closing with {remaining} connection(s) still open"));
    }
}
