//! fg-graph: mutable flow-based-programming network graph.
//!
//! Provides:
//! - Entity types (Node, Edge, Initializer, PublicPort, Group) and the Graph
//! - The mutation API, with silent skips for invalid requests
//! - Implicit/explicit transaction tracking
//! - An ordered, synchronous change-event feed
//! - Reset-then-rebuild merging
//!
//! # Example
//!
//! ```
//! use fg_graph::{EventLog, Graph};
//!
//! let mut graph = Graph::new("demo");
//! let log = EventLog::attach(&mut graph);
//! graph.add_node("Read", "ReadFile", None);
//! graph.add_node("Display", "Output", None);
//! graph.add_edge("Read", "out", "Display", "in", None);
//!
//! assert_eq!(graph.edges().len(), 1);
//! assert_eq!(
//!     log.names(),
//!     [
//!         "startTransaction", "addNode", "endTransaction",
//!         "startTransaction", "addNode", "endTransaction",
//!         "startTransaction", "addEdge", "endTransaction",
//!     ]
//! );
//! ```

mod edges;
pub mod event;
pub mod graph;
mod groups;
mod initials;
pub mod merge;
mod nodes;
pub mod notify;
pub mod outcome;
mod ports;
pub mod transaction;

// Re-exports for ergonomics
pub use event::GraphEvent;
pub use graph::{Edge, Endpoint, Graph, GraphOptions, Group, Initializer, Node, PublicPort};
pub use merge::{merge_resolve_theirs, reset_graph};
pub use notify::{EventLog, EventSink, SubscriptionId};
pub use outcome::{Outcome, Skip};
pub use ports::PortDirection;
pub use transaction::{Transaction, TransactionId};
