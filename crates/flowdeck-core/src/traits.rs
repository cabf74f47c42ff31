use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::{NodeId, RunRequest, SeriesData};

/// Remote execution backend, one call per node.
///
/// The scheduler depends on this seam rather than on a concrete HTTP client,
/// so run behavior (failure handling, ordering) is testable without a server.
pub trait RunBackend: Send + Sync + 'static {
    /// Execute one node remotely. Any transport error or non-2xx status is an
    /// `Err`; the scheduler marks the node failed and moves on.
    fn run_node(&self, request: &RunRequest) -> BoxFuture<'_, Result<String>>;

    /// Best-effort fetch of a node's secondary result series.
    ///
    /// Returns `None` on any failure or malformed payload; absence of data is
    /// never an error.
    fn fetch_series(&self, node_id: NodeId) -> BoxFuture<'_, Option<SeriesData>>;
}
