use serde::{Deserialize, Serialize};

/// Identifier for a node instance, unique within one canvas.
///
/// Ids are allocated from a per-canvas monotonic counter, so creation order
/// is recoverable by comparing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node's semantic position, independent of pan/zoom.
///
/// World position is the single source of truth for placement; screen
/// positions are always derived through the view transform, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A drawn position in terminal cells. May be negative when panned off-view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Visual state of a node, driven by the scheduler during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    #[default]
    Idle,
    Queued,
    Running,
    Success,
    Error,
}

/// Body of the per-node run call sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub node_id: String,
    pub node_type: String,
    pub node_label: String,
    pub step: usize,
    pub total_steps: usize,
}

/// A two-series numeric result fetched after a data-producing node succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SeriesData {
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Events published by the execution scheduler and consumed by the frontend.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A run pass has started over `total` nodes.
    RunStarted { total: usize },
    /// A node has been placed in the run queue.
    NodeQueued { id: NodeId },
    /// A node's backend call is in flight.
    NodeStarted { id: NodeId, step: usize, total: usize },
    /// A node's backend call completed.
    NodeFinished { id: NodeId, ok: bool },
    /// Secondary result series arrived for a data-producing node.
    SeriesReady { id: NodeId, series: SeriesData },
    /// The full pass is over; all nodes return to idle.
    RunFinished,
}
