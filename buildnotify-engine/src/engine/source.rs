//! Upstream side of a notify pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use buildnotify_core::item::{Artifact, BuildError};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Produces artifacts, or errors, for a notify pipeline.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Next item; `None` ends the stream.
    async fn next_artifact(&self) -> Option<Result<Artifact, BuildError>>;
}

/// Moves everything `source` yields onto the data and error channels.
///
/// Both channels close when the source is exhausted or when the data
/// receiver goes away. Returns how many artifacts were sent.
pub async fn pump<S>(
    source: &S,
    items: mpsc::Sender<Arc<Artifact>>,
    errors: mpsc::Sender<BuildError>,
) -> usize
where
    S: ArtifactSource + ?Sized,
{
    let mut sent = 0;
    while let Some(next) = source.next_artifact().await {
        match next {
            Ok(artifact) => {
                trace!("Pumping {}", artifact.path().display());
                if items.send(Arc::new(artifact)).await.is_err() {
                    debug!("Data channel closed, stopping source");
                    break;
                }
                sent += 1;
            }
            Err(error) => {
                // A closed error channel only means nobody is listening for errors.
                let _ = errors.send(error).await;
            }
        }
    }
    sent
}
