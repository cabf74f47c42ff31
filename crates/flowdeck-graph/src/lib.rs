//! Workflow graph engine: typed nodes, rule-checked edges, run ordering.
//!
//! A canvas holds a directed graph of typed `NodeInstance`s. The `NodeRegistry`
//! declares, per node kind, how many edges a node may carry and which neighbor
//! kinds it accepts; `Canvas::try_connect` enforces those rules at edit time so
//! no invalid graph is ever executable. `execution_order` produces the
//! topological run order (falling back to creation order on a cycle), which the
//! runner crate walks sequentially.

pub mod canvas;
pub mod node;
pub mod order;
pub mod registry;
pub mod view;

pub use canvas::{Canvas, ClickOutcome, ConnectError, ConnectOutcome, Edge};
pub use node::{Indicator, NodeInstance};
pub use order::execution_order;
pub use registry::{NodeKind, NodeRegistry, NodeSpec, PaletteEntry};
pub use view::ViewTransform;
