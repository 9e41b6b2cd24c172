use log::{error, info, warn};
use mockable::DefaultClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::auth::CredentialStore;
use crate::client::{Client, ClientRegistry, handle_client};
use crate::config::{ServerConfig, SharedRuntimeConfig, StartupConfig, StorageBackend};
use crate::error::ServerError;
use crate::middleware::RateLimiter;
use crate::middleware::logging::log_connection;
use crate::protocol::responses::{self, format_response};
use crate::storage::{FileAdapter, MemoryAdapter, StorageAdapter};

/// State shared by every connection task.
///
/// The store sits behind a single mutex: every command runs with it held,
/// which serialises registrations and session writes.
#[derive(Clone)]
pub struct SharedState {
    pub store: Arc<Mutex<CredentialStore>>,
    pub clients: Arc<Mutex<ClientRegistry>>,
    pub limiter: Arc<Mutex<RateLimiter>>,
    pub runtime: SharedRuntimeConfig,
    pub max_command_length: usize,
}

pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Builds the store described by `config` and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let (startup, runtime) = config.split();
        let store = CredentialStore::new(
            build_adapter(&startup),
            Arc::new(DefaultClock),
            startup.password_scheme,
        );
        Self::with_store(&startup, runtime, store).await
    }

    /// Binds the listener around an already constructed store.
    pub async fn with_store(
        startup: &StartupConfig,
        runtime: SharedRuntimeConfig,
        store: CredentialStore,
    ) -> Result<Self, ServerError> {
        let socket = startup.listen_socket();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e.into());
            }
        };

        // Surface unreadable slots at startup rather than on first request.
        match store.list_users() {
            Ok(users) => info!(
                "Credential store ready: {} registered users, {:?} passwords",
                users.len(),
                store.scheme()
            ),
            Err(e) => warn!("Credential store is not readable: {}", e),
        }

        let (max_attempts, window) = {
            let runtime = runtime.read().await;
            (runtime.max_signin_attempts, runtime.signin_window())
        };

        Ok(Self {
            listener,
            state: SharedState {
                store: Arc::new(Mutex::new(store)),
                clients: Arc::new(Mutex::new(ClientRegistry::new())),
                limiter: Arc::new(Mutex::new(RateLimiter::new(max_attempts, window))),
                runtime,
                max_command_length: startup.max_command_length,
            },
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub async fn start(&self) {
        let max_clients = self.state.runtime.read().await.max_clients;
        info!(
            "Starting Rax auth server on {:?} (max {} clients)",
            self.listener.local_addr(),
            max_clients
        );

        self.spawn_limiter_pruning();

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = self.state.clone();

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, state).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    fn spawn_limiter_pruning(&self) {
        let limiter = Arc::clone(&self.state.limiter);
        let runtime = Arc::clone(&self.state.runtime);

        tokio::spawn(async move {
            loop {
                let window = runtime.read().await.signin_window();
                tokio::time::sleep(window).await;
                limiter.lock().await.prune();
            }
        });
    }
}

fn build_adapter(startup: &StartupConfig) -> Box<dyn StorageAdapter> {
    match startup.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory credential storage");
            Box::new(MemoryAdapter::new())
        }
        StorageBackend::File => {
            let adapter = FileAdapter::new(startup.storage_path());
            info!("Using credential storage in {}", adapter.root().display());
            Box::new(adapter)
        }
    }
}

/// Handles a new client: greets, enforces the connection limit, registers,
/// and hands off to the session loop.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    state: SharedState,
) -> Result<(), std::io::Error> {
    log_connection(&client_addr.to_string());

    let max_clients = state.runtime.read().await.max_clients;
    let admitted = {
        let mut clients = state.clients.lock().await;
        let admitted = clients.try_insert(Client::new(client_addr), max_clients);
        if admitted {
            info!(
                "Registered client: {} ({}/{} clients)",
                client_addr,
                clients.len(),
                max_clients
            );
        }
        admitted
    };

    if !admitted {
        let reply = format_response(
            responses::SERVICE_UNAVAILABLE,
            "Too many connections. Try again later.",
        );
        stream.write_all(reply.as_bytes()).await?;
        return Ok(());
    }

    let greeting = format_response(responses::READY, "Welcome to RAX Auth Server");
    let greeted = async {
        stream.write_all(greeting.as_bytes()).await?;
        stream.flush().await
    }
    .await;
    if let Err(e) = greeted {
        state.clients.lock().await.remove(&client_addr);
        return Err(e);
    }

    handle_client(stream, client_addr, state).await;

    Ok(())
}
