//! Runtime slot for the search backend client.
//!
//! The service starts serving before the cluster is reachable. Until a
//! client is installed every query fails with [`Error::Unavailable`]; the
//! health endpoints report the same state. A background task keeps trying
//! to connect and installs the client on its first success.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use concepts_core::{Error, Result};

use crate::backend::SearchBackend;
use crate::config::BackendConfig;
use crate::elastic::ElasticClient;

const NO_CLIENT: &str = "no search backend client available";

/// Shared, late-bound search backend.
#[derive(Clone, Default)]
pub struct BackendHandle {
    inner: Arc<RwLock<Option<Arc<dyn SearchBackend>>>>,
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let installed = self
            .inner
            .try_read()
            .map(|slot| slot.is_some().to_string())
            .unwrap_or_else(|_| "locked".to_string());
        f.debug_struct("BackendHandle")
            .field("installed", &installed)
            .finish()
    }
}

impl BackendHandle {
    /// A handle with no client installed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A handle with a client already installed.
    pub fn with_backend(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(backend))),
        }
    }

    /// Install (or replace) the client.
    pub async fn install(&self, backend: Arc<dyn SearchBackend>) {
        *self.inner.write().await = Some(backend);
    }

    /// The installed client, or `Unavailable` when none is installed yet.
    pub async fn current(&self) -> Result<Arc<dyn SearchBackend>> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Unavailable(NO_CLIENT.to_string()))
    }

    pub async fn is_installed(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Call `connect` until it succeeds, waiting `interval` between attempts,
/// then install the result. Returns the number of attempts made.
pub async fn connect_with_retry<F, Fut>(
    handle: &BackendHandle,
    mut connect: F,
    interval: Duration,
) -> u32
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Arc<dyn SearchBackend>>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect().await {
            Ok(backend) => {
                handle.install(backend).await;
                info!(
                    subsystem = "backend",
                    component = "backend_handle",
                    attempt,
                    "Search backend client installed"
                );
                return attempt;
            }
            Err(e) => {
                warn!(
                    subsystem = "backend",
                    component = "backend_handle",
                    attempt,
                    retry_in_secs = interval.as_secs(),
                    error = %e,
                    "Could not connect to search backend"
                );
                tokio::time::sleep(interval).await;
            }
        }
    }
}

/// Build a cluster client and check it can reach the cluster.
pub async fn connect_elastic(config: BackendConfig) -> Result<Arc<dyn SearchBackend>> {
    let client = ElasticClient::new(config)?;
    let health = client.cluster_health().await?;
    info!(
        subsystem = "backend",
        component = "backend_handle",
        cluster = %health.cluster_name,
        status = %health.status,
        "Connected to search cluster"
    );
    Ok(Arc::new(client))
}

/// Spawn the background connector for the cluster client.
pub fn spawn_backend_connector(
    handle: BackendHandle,
    config: BackendConfig,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        connect_with_retry(&handle, || connect_elastic(config.clone()), interval).await;
    })
}
