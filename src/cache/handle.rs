use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;

use super::worker::{CacheError, CachedResponse, OfflineCache};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, CacheError>>;

enum CacheCommand {
    Fetch { url: Url, reply: Reply<CachedResponse> },
    Install { reply: Reply<usize> },
    Activate { reply: Reply<Vec<String>> },
}

/// Cloneable handle to the offline cache worker task.
///
/// The worker owns the [`OfflineCache`]; callers only exchange messages with
/// it. The task stops once every handle has been dropped.
#[derive(Clone)]
pub struct CacheHandle {
    tx: mpsc::Sender<CacheCommand>,
}

impl CacheHandle {
    /// Spawn the worker task for `cache`.
    pub fn spawn(cache: OfflineCache) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(Arc::new(cache), rx));
        (Self { tx }, task)
    }

    pub async fn fetch(&self, url: Url) -> Result<CachedResponse, CacheError> {
        self.request(|reply| CacheCommand::Fetch { url, reply }).await
    }

    pub async fn install(&self) -> Result<usize, CacheError> {
        self.request(|reply| CacheCommand::Install { reply }).await
    }

    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.request(|reply| CacheCommand::Activate { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> CacheCommand,
    ) -> Result<T, CacheError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| CacheError::WorkerGone)?;
        rx.await.map_err(|_| CacheError::WorkerGone)?
    }
}

async fn run(cache: Arc<OfflineCache>, mut rx: mpsc::Receiver<CacheCommand>) {
    tracing::debug!(
        static_cache = %cache.static_cache(),
        dynamic_cache = %cache.dynamic_cache(),
        "Offline cache worker started"
    );

    while let Some(command) = rx.recv().await {
        match command {
            // Fetches run concurrently
            CacheCommand::Fetch { url, reply } => {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let _ = reply.send(cache.fetch(&url).await);
                });
            }
            // Lifecycle steps run inline, in request order
            CacheCommand::Install { reply } => {
                let _ = reply.send(cache.install().await);
            }
            CacheCommand::Activate { reply } => {
                let _ = reply.send(cache.activate().await);
            }
        }
    }

    tracing::debug!("Offline cache worker stopped");
}
