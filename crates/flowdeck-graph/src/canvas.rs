use thiserror::Error;
use tracing::debug;

use flowdeck_core::error::Result;
use flowdeck_core::types::{NodeId, ScreenPoint, VisualState, WorldPoint};

use crate::node::NodeInstance;
use crate::order;
use crate::registry::{NodeKind, NodeRegistry};
use crate::view::ViewTransform;

/// A directed edge between two placed nodes.
///
/// Edges are never mutated; the ordered `(from, to)` pair is unique per canvas
/// and `(to, from)` is a distinct, independently checked edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Why a connect attempt was rejected. Expected and recoverable: the edge is
/// simply not created and the user keeps editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("{from} may not feed into {to}")]
    OutgoingTypeNotAllowed { from: NodeKind, to: NodeKind },

    #[error("{to} does not accept input from {from}")]
    IncomingTypeNotAllowed { from: NodeKind, to: NodeKind },

    #[error("{node} already has its maximum of {max} outgoing edges")]
    OutgoingCapacityExceeded { node: NodeId, max: usize },

    #[error("{node} already has its maximum of {max} incoming edges")]
    IncomingCapacityExceeded { node: NodeId, max: usize },

    #[error("no such node: {0}")]
    MissingNode(NodeId),
}

/// Result of a successful (non-rejected) connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected,
    /// The ordered pair already existed; the edge set is unchanged.
    Duplicate,
}

/// What a canvas click did, so the frontend can redraw and report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(NodeId),
    Deselected(NodeId),
    Connected { from: NodeId, to: NodeId },
    DuplicateIgnored { from: NodeId, to: NodeId },
    Rejected { from: NodeId, to: NodeId, reason: ConnectError },
    Ignored,
}

/// One canvas instance: the graph, its selection slot, and its viewport.
///
/// Owned exclusively by one frontend pane; every mutation happens synchronously
/// in response to a single input event, so no locking is needed. Node visual
/// states are only written through `set_visual`/`reset_visuals`, driven by
/// scheduler events.
pub struct Canvas {
    registry: NodeRegistry,
    nodes: Vec<NodeInstance>,
    edges: Vec<Edge>,
    next_id: u64,
    selection: Option<NodeId>,
    pub view: ViewTransform,
}

impl Canvas {
    pub fn new(registry: NodeRegistry, view: ViewTransform) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 0,
            selection: None,
            view,
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[NodeInstance] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeInstance> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    /// Place a new node. Unconditional apart from the kind having a registry
    /// entry; arity rules constrain edges, never placement.
    pub fn add_node(&mut self, kind: NodeKind, world: WorldPoint) -> Result<NodeId> {
        self.registry.lookup(kind)?;

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let ordinal = self.nodes.iter().filter(|n| n.kind == kind).count() + 1;
        let label = format!("{} {}", kind.label(), ordinal);
        self.nodes.push(NodeInstance::new(id, kind, label, world));
        debug!(%id, %kind, "Node added");
        Ok(id)
    }

    pub fn outgoing_count(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.from == id).count()
    }

    pub fn incoming_count(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.to == id).count()
    }

    /// Attempt to connect `from → to` under the registry rules.
    ///
    /// Checks run in order and short-circuit: outgoing type, incoming type,
    /// outgoing capacity, incoming capacity. An already-present pair is an
    /// idempotent no-op, not an error. A successful insert clears the
    /// selection slot.
    pub fn try_connect(
        &mut self,
        from: NodeId,
        to: NodeId,
    ) -> std::result::Result<ConnectOutcome, ConnectError> {
        let from_kind = self.node(from).ok_or(ConnectError::MissingNode(from))?.kind;
        let to_kind = self.node(to).ok_or(ConnectError::MissingNode(to))?.kind;

        // add_node guarantees placed kinds are registered
        let from_spec = self
            .registry
            .lookup(from_kind)
            .map_err(|_| ConnectError::MissingNode(from))?;
        let to_spec = self
            .registry
            .lookup(to_kind)
            .map_err(|_| ConnectError::MissingNode(to))?;

        if !from_spec.allowed_outgoing.contains(&to_kind) {
            return Err(ConnectError::OutgoingTypeNotAllowed {
                from: from_kind,
                to: to_kind,
            });
        }
        if !to_spec.allowed_incoming.contains(&from_kind) {
            return Err(ConnectError::IncomingTypeNotAllowed {
                from: from_kind,
                to: to_kind,
            });
        }
        if self.outgoing_count(from) >= from_spec.max_outgoing {
            return Err(ConnectError::OutgoingCapacityExceeded {
                node: from,
                max: from_spec.max_outgoing,
            });
        }
        if self.incoming_count(to) >= to_spec.max_incoming {
            return Err(ConnectError::IncomingCapacityExceeded {
                node: to,
                max: to_spec.max_incoming,
            });
        }

        if self.edges.iter().any(|e| e.from == from && e.to == to) {
            debug!(%from, %to, "Edge already present, ignoring");
            return Ok(ConnectOutcome::Duplicate);
        }

        self.edges.push(Edge { from, to });
        self.selection = None;
        debug!(%from, %to, "Edge created");
        Ok(ConnectOutcome::Connected)
    }

    /// Drive the pending-connection state machine with one node click.
    ///
    /// Idle + click(A) arms A; clicking A again disarms; clicking B attempts
    /// `try_connect(A, B)` and returns to idle either way.
    pub fn click(&mut self, id: NodeId) -> ClickOutcome {
        if self.node(id).is_none() {
            return ClickOutcome::Ignored;
        }

        match self.selection {
            None => {
                self.selection = Some(id);
                ClickOutcome::Selected(id)
            }
            Some(selected) if selected == id => {
                self.selection = None;
                ClickOutcome::Deselected(id)
            }
            Some(selected) => {
                self.selection = None;
                match self.try_connect(selected, id) {
                    Ok(ConnectOutcome::Connected) => ClickOutcome::Connected {
                        from: selected,
                        to: id,
                    },
                    Ok(ConnectOutcome::Duplicate) => ClickOutcome::DuplicateIgnored {
                        from: selected,
                        to: id,
                    },
                    Err(reason) => {
                        debug!(from = %selected, to = %id, %reason, "Connect rejected");
                        ClickOutcome::Rejected {
                            from: selected,
                            to: id,
                            reason,
                        }
                    }
                }
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Move a node by writing the dragged screen position back through the
    /// inverse transform, keeping world position authoritative.
    pub fn drag_to(&mut self, id: NodeId, origin: ScreenPoint, screen: ScreenPoint) {
        let world = self.view.screen_to_world(origin, screen);
        if let Some(node) = self.node_mut(id) {
            node.world = world;
        }
    }

    /// Topological run order, falling back to creation order on a cycle.
    pub fn run_order(&self) -> Vec<NodeId> {
        order::execution_order(&self.nodes, &self.edges)
    }

    pub fn set_visual(&mut self, id: NodeId, state: VisualState) {
        if let Some(node) = self.node_mut(id) {
            node.indicator.set_state(state);
        }
    }

    /// Return every node to idle after a run pass; stops all animation.
    pub fn reset_visuals(&mut self) {
        for node in &mut self.nodes {
            node.indicator.set_state(VisualState::Idle);
        }
    }

    /// Advance running indicators by one animation tick.
    pub fn tick(&mut self) {
        for node in &mut self.nodes {
            node.indicator.tick();
        }
    }
}
