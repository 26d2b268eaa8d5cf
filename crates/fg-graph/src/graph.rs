//! Core graph data structures.

use fg_core::{IipData, Metadata, MetadataPatch, apply_patch};
use indexmap::IndexMap;
use tracing::trace;

use crate::event::GraphEvent;
use crate::notify::{self, EventSink, SubscriptionId};
use crate::outcome::{Outcome, Skip};
use crate::transaction::Transaction;

/// A processing node: an instance of some component.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Opaque reference to the component implementing the node.
    pub component: String,
    pub metadata: Metadata,
}

/// One end of a connection: a node's port, optionally addressed by index
/// for array-capable ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub port: String,
    pub index: Option<u32>,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: Option<u32>) -> Self {
        self.index = index;
        self
    }

    /// Structural match on `(node, port)`, ignoring the index.
    pub fn is(&self, node: &str, port: &str) -> bool {
        self.node == node && self.port == port
    }
}

/// A directed connection from an outport to an inport.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: Endpoint,
    pub to: Endpoint,
    pub metadata: Metadata,
}

impl Edge {
    /// Whether this edge has the given `(from.node, from.port, to.node, to.port)` key.
    pub fn has_key(&self, from_node: &str, from_port: &str, to_node: &str, to_port: &str) -> bool {
        self.from.is(from_node, from_port) && self.to.is(to_node, to_port)
    }

    /// Whether either end of this edge is the given port.
    pub fn touches_port(&self, node: &str, port: &str) -> bool {
        self.from.is(node, port) || self.to.is(node, port)
    }

    /// Whether either end of this edge is on the given node.
    pub fn touches_node(&self, node: &str) -> bool {
        self.from.node == node || self.to.node == node
    }
}

/// An initial information packet delivered to an inport at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub data: IipData,
    pub to: Endpoint,
    pub metadata: Option<Metadata>,
}

/// A graph-level port aliasing a specific node port.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicPort {
    pub process: String,
    pub port: String,
    pub metadata: Option<Metadata>,
}

/// A named, ordered set of node ids. Names are not unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub nodes: Vec<String>,
    pub metadata: Option<Metadata>,
}

/// Construction options for a [`Graph`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphOptions {
    pub name: String,
    /// When false, port names are lower-cased on every access.
    pub case_sensitive: bool,
}

/// The network graph: nodes, edges, initializers, public ports and groups,
/// plus graph-level properties.
///
/// Every mutation runs inside a transaction (implicit unless one was opened
/// explicitly) and is announced to subscribers through the graph's own
/// [`EventSink`].
#[derive(Debug)]
pub struct Graph {
    pub(crate) name: String,
    pub(crate) case_sensitive: bool,
    pub(crate) properties: Metadata,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) initializers: Vec<Initializer>,
    pub(crate) inports: IndexMap<String, PublicPort>,
    pub(crate) outports: IndexMap<String, PublicPort>,
    pub(crate) groups: Vec<Group>,
    pub(crate) transaction: Transaction,
    pub(crate) sink: EventSink,
}

impl Default for Graph {
    fn default() -> Self {
        Self::with_options(GraphOptions::default())
    }
}

impl Graph {
    /// Create an empty, case-insensitive graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(GraphOptions {
            name: name.into(),
            case_sensitive: false,
        })
    }

    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            name: options.name,
            case_sensitive: options.case_sensitive,
            properties: Metadata::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            initializers: Vec::new(),
            inports: IndexMap::new(),
            outports: IndexMap::new(),
            groups: Vec::new(),
            transaction: Transaction::default(),
            sink: EventSink::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn properties(&self) -> &Metadata {
        &self.properties
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    pub fn inports(&self) -> &IndexMap<String, PublicPort> {
        &self.inports
    }

    pub fn outports(&self) -> &IndexMap<String, PublicPort> {
        &self.outports
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Normalize a port name according to the case-sensitivity flag.
    pub fn port_name(&self, port: &str) -> String {
        if self.case_sensitive {
            port.to_string()
        } else {
            port.to_lowercase()
        }
    }

    /// Get a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get an edge by its `(from.node, from.port, to.node, to.port)` key.
    pub fn edge(&self, from_node: &str, from_port: &str, to_node: &str, to_port: &str) -> Option<&Edge> {
        let from_port = self.port_name(from_port);
        let to_port = self.port_name(to_port);
        self.edges
            .iter()
            .find(|e| e.has_key(from_node, &from_port, to_node, &to_port))
    }

    /// The graph's event sink.
    pub fn sink_mut(&mut self) -> &mut EventSink {
        &mut self.sink
    }

    /// Subscribe an observer to every event emitted by this graph.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        self.sink.subscribe(handler)
    }

    /// Subscribe a handler that may mutate the graph while an event is
    /// being delivered.
    pub fn subscribe_reentrant<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Graph, &GraphEvent) + 'static,
    {
        self.sink.subscribe_reentrant(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sink.unsubscribe(id)
    }

    /// Merge (or, with `None` values, delete) graph properties.
    ///
    /// Always applies, and always emits `changeProperties`.
    pub fn set_properties(&mut self, patch: MetadataPatch) -> Outcome {
        self.begin();
        let before = self.properties.clone();
        apply_patch(&mut self.properties, &patch);
        self.emit(GraphEvent::ChangeProperties {
            properties: self.properties.clone(),
            before,
            delta: patch,
        });
        self.finish()
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        notify::deliver(self, event);
    }

    /// Entry bookkeeping shared by every mutator.
    pub(crate) fn begin(&mut self) {
        if self.transaction.enter_implicit() {
            self.emit(GraphEvent::StartTransaction {
                id: self.transaction.implicit_id(),
                metadata: None,
            });
        }
    }

    /// Exit bookkeeping shared by every mutator.
    pub(crate) fn finish(&mut self) -> Outcome {
        if let Some(id) = self.transaction.exit_implicit() {
            self.emit(GraphEvent::EndTransaction { id, metadata: None });
        }
        Outcome::Applied
    }

    pub(crate) fn skip(&self, reason: Skip) -> Outcome {
        trace!(graph = %self.name, %reason, "mutation skipped");
        Outcome::Skipped(reason)
    }
}
