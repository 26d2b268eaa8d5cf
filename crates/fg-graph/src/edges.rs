//! Edge mutations.

use fg_core::{Metadata, MetadataPatch, apply_patch, clearing_patch};

use crate::event::GraphEvent;
use crate::graph::{Edge, Endpoint, Graph};
use crate::outcome::{Outcome, Skip};

impl Graph {
    /// Connect `out_node.out_port` to `in_node.in_port`.
    ///
    /// Skipped if an edge with the same ports already exists, or if either
    /// node is unknown.
    pub fn add_edge(
        &mut self,
        out_node: &str,
        out_port: &str,
        in_node: &str,
        in_port: &str,
        metadata: Option<Metadata>,
    ) -> Outcome {
        self.add_edge_index(out_node, out_port, None, in_node, in_port, None, metadata)
    }

    /// Connect two ports, addressing array ports by index.
    ///
    /// Duplicate detection ignores the indices: a second edge between the
    /// same two ports is skipped whatever its indices are.
    #[allow(clippy::too_many_arguments)]
    pub fn add_edge_index(
        &mut self,
        out_node: &str,
        out_port: &str,
        out_index: Option<u32>,
        in_node: &str,
        in_port: &str,
        in_index: Option<u32>,
        metadata: Option<Metadata>,
    ) -> Outcome {
        let out_port = self.port_name(out_port);
        let in_port = self.port_name(in_port);

        if self
            .edges
            .iter()
            .any(|e| e.has_key(out_node, &out_port, in_node, &in_port))
        {
            return self.skip(Skip::DuplicateEdge {
                from_node: out_node.to_string(),
                from_port: out_port,
                to_node: in_node.to_string(),
                to_port: in_port,
            });
        }
        for node in [out_node, in_node] {
            if self.node(node).is_none() {
                return self.skip(Skip::UnknownNode { id: node.to_string() });
            }
        }

        self.begin();
        let edge = Edge {
            from: Endpoint::new(out_node, out_port).with_index(out_index),
            to: Endpoint::new(in_node, in_port).with_index(in_index),
            metadata: metadata.unwrap_or_default(),
        };
        self.edges.push(edge.clone());
        self.emit(GraphEvent::AddEdge(edge));
        self.finish()
    }

    /// Remove edges.
    ///
    /// With `other = Some((node2, port2))` removes the edge
    /// `node.port -> node2.port2`. With `None`, removes every edge that has
    /// `node.port` at either end. Each edge's metadata is cleared (emitting
    /// `changeEdge`) before the edges are removed (one `removeEdge` each).
    pub fn remove_edge(&mut self, node: &str, port: &str, other: Option<(&str, &str)>) -> Outcome {
        let port = self.port_name(port);
        let other = other.map(|(n, p)| (n, self.port_name(p)));
        let matches = |e: &Edge| match &other {
            Some((node2, port2)) => e.has_key(node, &port, node2, port2),
            None => e.touches_port(node, &port),
        };

        let keys: Vec<(String, String, String, String)> = self
            .edges
            .iter()
            .filter(|e| matches(e))
            .map(|e| {
                (
                    e.from.node.clone(),
                    e.from.port.clone(),
                    e.to.node.clone(),
                    e.to.port.clone(),
                )
            })
            .collect();
        if keys.is_empty() {
            return self.skip(Skip::UnknownEdge {
                node: node.to_string(),
                port,
            });
        }

        self.begin();
        for (from_node, from_port, to_node, to_port) in &keys {
            let clear = self
                .edge(from_node, from_port, to_node, to_port)
                .map(|e| clearing_patch(&e.metadata))
                .unwrap_or_default();
            self.set_edge_metadata(from_node, from_port, to_node, to_port, clear);
        }

        let (removed, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| {
                keys.iter()
                    .any(|(a, b, c, d)| e.has_key(a, b, c, d))
            });
        self.edges = kept;
        for edge in removed {
            self.emit(GraphEvent::RemoveEdge(edge));
        }
        self.finish()
    }

    /// Apply a metadata patch to the edge `node.port -> node2.port2`.
    pub fn set_edge_metadata(
        &mut self,
        node: &str,
        port: &str,
        node2: &str,
        port2: &str,
        patch: MetadataPatch,
    ) -> Outcome {
        let port = self.port_name(port);
        let port2 = self.port_name(port2);
        let Some(pos) = self
            .edges
            .iter()
            .position(|e| e.has_key(node, &port, node2, &port2))
        else {
            return self.skip(Skip::UnknownEdge {
                node: node.to_string(),
                port,
            });
        };

        self.begin();
        let edge = &mut self.edges[pos];
        let before = edge.metadata.clone();
        apply_patch(&mut edge.metadata, &patch);
        let edge = edge.clone();
        self.emit(GraphEvent::ChangeEdge {
            edge,
            before,
            delta: patch,
        });
        self.finish()
    }
}
