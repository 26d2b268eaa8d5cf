//! Change events.

use core::fmt;

use fg_core::{Metadata, MetadataPatch};

use crate::graph::{Edge, Group, Initializer, Node, PublicPort};
use crate::transaction::TransactionId;

/// One state change of a [`Graph`](crate::Graph).
///
/// Events carry the new state; `Change*` events also carry the metadata as
/// it was before the change, and the delta that was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    AddNode(Node),
    RemoveNode(Node),
    RenameNode {
        old: String,
        new: String,
    },
    ChangeNode {
        node: Node,
        before: Metadata,
        delta: MetadataPatch,
    },

    AddEdge(Edge),
    RemoveEdge(Edge),
    ChangeEdge {
        edge: Edge,
        before: Metadata,
        delta: MetadataPatch,
    },

    AddInitial(Initializer),
    RemoveInitial(Initializer),

    AddInport {
        name: String,
        port: PublicPort,
    },
    RemoveInport {
        name: String,
        port: PublicPort,
    },
    RenameInport {
        old: String,
        new: String,
    },
    ChangeInport {
        name: String,
        port: PublicPort,
        before: Option<Metadata>,
        delta: MetadataPatch,
    },

    AddOutport {
        name: String,
        port: PublicPort,
    },
    RemoveOutport {
        name: String,
        port: PublicPort,
    },
    RenameOutport {
        old: String,
        new: String,
    },
    ChangeOutport {
        name: String,
        port: PublicPort,
        before: Option<Metadata>,
        delta: MetadataPatch,
    },

    AddGroup(Group),
    RemoveGroup(Group),
    RenameGroup {
        old: String,
        new: String,
    },
    ChangeGroup {
        group: Group,
        before: Option<Metadata>,
        delta: MetadataPatch,
    },

    ChangeProperties {
        properties: Metadata,
        before: Metadata,
        delta: MetadataPatch,
    },

    StartTransaction {
        id: TransactionId,
        metadata: Option<Metadata>,
    },
    EndTransaction {
        id: TransactionId,
        metadata: Option<Metadata>,
    },
}

impl GraphEvent {
    /// Stable event name, as used on the wire by FBP tooling.
    pub fn name(&self) -> &'static str {
        match self {
            GraphEvent::AddNode(_) => "addNode",
            GraphEvent::RemoveNode(_) => "removeNode",
            GraphEvent::RenameNode { .. } => "renameNode",
            GraphEvent::ChangeNode { .. } => "changeNode",
            GraphEvent::AddEdge(_) => "addEdge",
            GraphEvent::RemoveEdge(_) => "removeEdge",
            GraphEvent::ChangeEdge { .. } => "changeEdge",
            GraphEvent::AddInitial(_) => "addInitial",
            GraphEvent::RemoveInitial(_) => "removeInitial",
            GraphEvent::AddInport { .. } => "addInport",
            GraphEvent::RemoveInport { .. } => "removeInport",
            GraphEvent::RenameInport { .. } => "renameInport",
            GraphEvent::ChangeInport { .. } => "changeInport",
            GraphEvent::AddOutport { .. } => "addOutport",
            GraphEvent::RemoveOutport { .. } => "removeOutport",
            GraphEvent::RenameOutport { .. } => "renameOutport",
            GraphEvent::ChangeOutport { .. } => "changeOutport",
            GraphEvent::AddGroup(_) => "addGroup",
            GraphEvent::RemoveGroup(_) => "removeGroup",
            GraphEvent::RenameGroup { .. } => "renameGroup",
            GraphEvent::ChangeGroup { .. } => "changeGroup",
            GraphEvent::ChangeProperties { .. } => "changeProperties",
            GraphEvent::StartTransaction { .. } => "startTransaction",
            GraphEvent::EndTransaction { .. } => "endTransaction",
        }
    }

    pub fn is_transaction_boundary(&self) -> bool {
        matches!(
            self,
            GraphEvent::StartTransaction { .. } | GraphEvent::EndTransaction { .. }
        )
    }
}

fn edge_line(f: &mut fmt::Formatter<'_>, edge: &Edge, arrow: &str) -> fmt::Result {
    write!(
        f,
        "{} {} {} {} {}",
        edge.from.node, edge.from.port, arrow, edge.to.port, edge.to.node
    )
}

/// One-line journal-style rendering, e.g. `Read(ReadFile)` or
/// `Read out -> in Display`.
impl fmt::Display for GraphEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphEvent::AddNode(node) => write!(f, "{}({})", node.id, node.component),
            GraphEvent::RemoveNode(node) => write!(f, "DEL {}({})", node.id, node.component),
            GraphEvent::RenameNode { old, new } => write!(f, "RENAME {} {}", old, new),
            GraphEvent::ChangeNode { node, .. } => write!(f, "META {}", node.id),
            GraphEvent::AddEdge(edge) => edge_line(f, edge, "->"),
            GraphEvent::RemoveEdge(edge) => edge_line(f, edge, "-X>"),
            GraphEvent::ChangeEdge { edge, .. } => {
                f.write_str("META ")?;
                edge_line(f, edge, "->")
            }
            GraphEvent::AddInitial(iip) => {
                write!(f, "'{}' -> {} {}", iip.data, iip.to.port, iip.to.node)
            }
            GraphEvent::RemoveInitial(iip) => {
                write!(f, "'{}' -X> {} {}", iip.data, iip.to.port, iip.to.node)
            }
            GraphEvent::AddInport { name, port } => {
                write!(f, "INPORT {} {}.{}", name, port.process, port.port)
            }
            GraphEvent::RemoveInport { name, .. } => write!(f, "DEL INPORT {}", name),
            GraphEvent::RenameInport { old, new } => write!(f, "RENAME INPORT {} {}", old, new),
            GraphEvent::ChangeInport { name, .. } => write!(f, "META INPORT {}", name),
            GraphEvent::AddOutport { name, port } => {
                write!(f, "OUTPORT {} {}.{}", name, port.process, port.port)
            }
            GraphEvent::RemoveOutport { name, .. } => write!(f, "DEL OUTPORT {}", name),
            GraphEvent::RenameOutport { old, new } => {
                write!(f, "RENAME OUTPORT {} {}", old, new)
            }
            GraphEvent::ChangeOutport { name, .. } => write!(f, "META OUTPORT {}", name),
            GraphEvent::AddGroup(group) => {
                write!(f, "GROUP {} [{}]", group.name, group.nodes.join(", "))
            }
            GraphEvent::RemoveGroup(group) => write!(f, "DEL GROUP {}", group.name),
            GraphEvent::RenameGroup { old, new } => write!(f, "RENAME GROUP {} {}", old, new),
            GraphEvent::ChangeGroup { group, .. } => write!(f, "META GROUP {}", group.name),
            GraphEvent::ChangeProperties { .. } => f.write_str("PROPERTIES"),
            GraphEvent::StartTransaction { id, .. } => write!(f, ">>> {}", id),
            GraphEvent::EndTransaction { id, .. } => write!(f, "<<< {}", id),
        }
    }
}
