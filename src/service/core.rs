use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::service::session::{SessionOutcome, handle_session};
use crate::service::state::ServiceState;

/// Reference service: accepts connections and hands them, in order, to a
/// single session worker that owns the service state.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServiceConfig>,
}

impl Server {
    pub async fn bind(config: ServiceConfig) -> Result<Self, ServiceError> {
        let addr = config.listen_socket();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServiceError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Service bound to {}", addr);

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs with fresh state until the listener fails.
    pub async fn run(self) -> Result<(), ServiceError> {
        self.run_with_state(ServiceState::new()).await
    }

    pub async fn run_with_state(self, state: ServiceState) -> Result<(), ServiceError> {
        info!(
            "Starting service on {} (queue depth {})",
            self.local_addr()?,
            self.config.queue_depth
        );

        let (tx, rx) = mpsc::channel(self.config.queue_depth);
        let worker = tokio::spawn(session_worker(rx, state, Arc::clone(&self.config)));

        let result = accept_loop(&self.listener, tx).await;
        worker.abort();
        result
    }
}

async fn accept_loop(
    listener: &TcpListener,
    queue: mpsc::Sender<(TcpStream, SocketAddr)>,
) -> Result<(), ServiceError> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("Accepted connection from {}", addr);
                queue
                    .send((stream, addr))
                    .await
                    .map_err(|_| ServiceError::QueueClosed)?;
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

/// Serves queued connections one at a time.
async fn session_worker(
    mut queue: mpsc::Receiver<(TcpStream, SocketAddr)>,
    mut state: ServiceState,
    config: Arc<ServiceConfig>,
) {
    let limit = config.session_timeout();

    while let Some((stream, addr)) = queue.recv().await {
        let session = handle_session(stream, addr, &mut state, &config);

        match tokio::time::timeout(limit, session).await {
            Ok(Ok(SessionOutcome::Rejected(reason))) => {
                info!("Rejected {}: {}", addr, reason);
            }
            Ok(Ok(outcome)) => {
                debug!("Session {} finished: {:?}", addr, outcome);
            }
            Ok(Err(e)) => {
                warn!("Session {} failed: {}", addr, e);
            }
            Err(_) => {
                warn!("Session {} failed: {}", addr, ServiceError::SessionTimeout(limit));
            }
        }
    }
}
