use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use flowdeck_core::error::{FlowdeckError, Result};

/// Closed set of workflow node kinds.
///
/// The UI only ever offers kinds from this enum, so an unknown kind cannot be
/// introduced at runtime; the registry API stays total anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Build,
    Compute,
    Validate,
    Report,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Build,
        NodeKind::Compute,
        NodeKind::Validate,
        NodeKind::Report,
    ];

    /// Wire name sent to the backend as `nodeType`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            NodeKind::Build => "build",
            NodeKind::Compute => "compute",
            NodeKind::Validate => "validate",
            NodeKind::Report => "report",
        }
    }

    /// Short display label used when naming new nodes.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Build => "Build",
            NodeKind::Compute => "Compute",
            NodeKind::Validate => "Validate",
            NodeKind::Report => "Report",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Immutable connectivity rules for one node kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Human-readable description shown in the palette.
    pub description: String,
    /// Maximum number of incoming edges.
    pub max_incoming: usize,
    /// Maximum number of outgoing edges.
    pub max_outgoing: usize,
    /// Kinds this node may feed into.
    pub allowed_outgoing: Vec<NodeKind>,
    /// Kinds that may feed into this node.
    pub allowed_incoming: Vec<NodeKind>,
    /// Whether a successful run yields a secondary result series worth
    /// fetching for charting.
    #[serde(default)]
    pub produces_series: bool,
}

impl NodeSpec {
    /// Create a spec with no connectivity (a fully isolated kind).
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            max_incoming: 0,
            max_outgoing: 0,
            allowed_outgoing: vec![],
            allowed_incoming: vec![],
            produces_series: false,
        }
    }

    /// Allow up to `max` outgoing edges toward the given kinds.
    pub fn outgoing(mut self, max: usize, kinds: Vec<NodeKind>) -> Self {
        self.max_outgoing = max;
        self.allowed_outgoing = kinds;
        self
    }

    /// Allow up to `max` incoming edges from the given kinds.
    pub fn incoming(mut self, max: usize, kinds: Vec<NodeKind>) -> Self {
        self.max_incoming = max;
        self.allowed_incoming = kinds;
        self
    }

    /// Mark this kind as data-producing.
    pub fn produces_series(mut self) -> Self {
        self.produces_series = true;
        self
    }
}

/// One palette row offered to the UI.
#[derive(Debug, Clone)]
pub struct PaletteEntry {
    pub kind: NodeKind,
    pub description: String,
}

/// Immutable node kind → connectivity rule table, populated once at startup.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    specs: HashMap<NodeKind, NodeSpec>,
}

impl NodeRegistry {
    /// Build a registry from a rule table, validating rule consistency.
    ///
    /// A zero arity with a non-empty allow list (or the reverse) is a
    /// contradiction the table author should hear about at startup, not a
    /// silent dead rule.
    pub fn new(specs: HashMap<NodeKind, NodeSpec>) -> Result<Self> {
        for (kind, spec) in &specs {
            if (spec.max_outgoing == 0) != spec.allowed_outgoing.is_empty() {
                return Err(FlowdeckError::InvalidRegistry(format!(
                    "{kind}: max_outgoing={} but {} allowed outgoing kinds",
                    spec.max_outgoing,
                    spec.allowed_outgoing.len()
                )));
            }
            if (spec.max_incoming == 0) != spec.allowed_incoming.is_empty() {
                return Err(FlowdeckError::InvalidRegistry(format!(
                    "{kind}: max_incoming={} but {} allowed incoming kinds",
                    spec.max_incoming,
                    spec.allowed_incoming.len()
                )));
            }
        }
        Ok(Self { specs })
    }

    /// The built-in rule table.
    pub fn default_palette() -> Self {
        use NodeKind::*;

        let mut specs = HashMap::new();
        specs.insert(
            Build,
            NodeSpec::new("Prepare inputs for downstream computation")
                .outgoing(4, vec![Compute]),
        );
        specs.insert(
            Compute,
            NodeSpec::new("Run a computation step on the backend")
                .incoming(4, vec![Build, Compute])
                .outgoing(4, vec![Compute, Validate, Report])
                .produces_series(),
        );
        specs.insert(
            Validate,
            NodeSpec::new("Check computed results against constraints")
                .incoming(4, vec![Compute])
                .outgoing(1, vec![Report]),
        );
        specs.insert(
            Report,
            NodeSpec::new("Collect final results")
                .incoming(4, vec![Compute, Validate]),
        );

        // Known-consistent table; a test runs it through new() anyway.
        Self { specs }
    }

    /// Look up the spec for a kind.
    pub fn lookup(&self, kind: NodeKind) -> Result<&NodeSpec> {
        self.specs
            .get(&kind)
            .ok_or_else(|| FlowdeckError::UnknownNodeType(kind.to_string()))
    }

    /// The closed `{kind, description}` list for the UI palette, in enum order.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        NodeKind::ALL
            .iter()
            .filter_map(|kind| {
                self.specs.get(kind).map(|spec| PaletteEntry {
                    kind: *kind,
                    description: spec.description.clone(),
                })
            })
            .collect()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::default_palette()
    }
}
