use flowdeck_core::types::{NodeId, VisualState, WorldPoint};

use crate::registry::NodeKind;

/// Spinner frames shown while a node is running.
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Per-node progress indicator.
///
/// Only `Running` animates; the frontend tick advances the frame. Entering any
/// other state resets the frame, so a later run restarts the animation from
/// zero. Indicators are plain fields of their node and drop with the canvas.
#[derive(Debug, Clone, Default)]
pub struct Indicator {
    state: VisualState,
    frame: usize,
}

impl Indicator {
    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn set_state(&mut self, state: VisualState) {
        if state != self.state {
            self.frame = 0;
        }
        self.state = state;
    }

    /// Advance the animation by one tick. No-op unless running.
    pub fn tick(&mut self) {
        if self.state == VisualState::Running {
            self.frame = self.frame.wrapping_add(1);
        }
    }

    /// Glyph rendered inside the node box for the current state.
    pub fn glyph(&self) -> &'static str {
        match self.state {
            VisualState::Idle => "·",
            VisualState::Queued => "○",
            VisualState::Running => SPINNER[self.frame % SPINNER.len()],
            VisualState::Success => "✔",
            VisualState::Error => "✘",
        }
    }
}

/// One placed node on a canvas.
///
/// `world` is the authoritative position; screen placement is always derived
/// through the view transform at draw time.
#[derive(Debug, Clone)]
pub struct NodeInstance {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub world: WorldPoint,
    pub indicator: Indicator,
}

impl NodeInstance {
    pub fn new(id: NodeId, kind: NodeKind, label: impl Into<String>, world: WorldPoint) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            world,
            indicator: Indicator::default(),
        }
    }

    pub fn visual_state(&self) -> VisualState {
        self.indicator.state()
    }
}
