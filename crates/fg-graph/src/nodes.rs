//! Node mutations.

use fg_core::{Metadata, MetadataPatch, apply_patch, clearing_patch};

use crate::event::GraphEvent;
use crate::graph::{Graph, Node};
use crate::outcome::{Outcome, Skip};

impl Graph {
    /// Add a node. Node ids are unique; adding an existing id is skipped.
    ///
    /// ```
    /// use fg_graph::Graph;
    ///
    /// let mut graph = Graph::new("g");
    /// assert!(graph.add_node("Read", "ReadFile", None).is_applied());
    /// assert!(graph.add_node("Read", "Other", None).is_skipped());
    /// ```
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        component: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Outcome {
        let id = id.into();
        if self.node(&id).is_some() {
            return self.skip(Skip::DuplicateNode { id });
        }

        self.begin();
        let node = Node {
            id,
            component: component.into(),
            metadata: metadata.unwrap_or_default(),
        };
        self.nodes.push(node.clone());
        self.emit(GraphEvent::AddNode(node));
        self.finish()
    }

    /// Remove a node and everything attached to it.
    ///
    /// Inside one transaction, in order: edges touching the node, initializers
    /// targeting it, public inports and outports referencing it, its id in
    /// every group, its metadata, and finally the node itself.
    pub fn remove_node(&mut self, id: &str) -> Outcome {
        if self.node(id).is_none() {
            return self.skip(Skip::UnknownNode { id: id.to_string() });
        }

        self.begin();

        let edges: Vec<(String, String, String, String)> = self
            .edges
            .iter()
            .filter(|e| e.touches_node(id))
            .map(|e| {
                (
                    e.from.node.clone(),
                    e.from.port.clone(),
                    e.to.node.clone(),
                    e.to.port.clone(),
                )
            })
            .collect();
        for (from_node, from_port, to_node, to_port) in &edges {
            self.remove_edge(from_node, from_port, Some((to_node.as_str(), to_port.as_str())));
        }

        let mut targets: Vec<String> = Vec::new();
        for iip in self.initializers.iter().filter(|i| i.to.node == id) {
            if !targets.contains(&iip.to.port) {
                targets.push(iip.to.port.clone());
            }
        }
        for port in &targets {
            self.remove_initial(id, Some(port.as_str()));
        }

        let inports: Vec<String> = self
            .inports
            .iter()
            .filter(|(_, p)| p.process == id)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &inports {
            self.remove_inport(name);
        }

        let outports: Vec<String> = self
            .outports
            .iter()
            .filter(|(_, p)| p.process == id)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &outports {
            self.remove_outport(name);
        }

        for group in &mut self.groups {
            group.nodes.retain(|n| n != id);
        }

        if let Some(node) = self.node(id) {
            let clear = clearing_patch(&node.metadata);
            self.set_node_metadata(id, clear);
        }

        if let Some(pos) = self.nodes.iter().position(|n| n.id == id) {
            let node = self.nodes.remove(pos);
            self.emit(GraphEvent::RemoveNode(node));
        }

        self.finish()
    }

    /// Rename a node, rewriting every edge endpoint, initializer target,
    /// public port and group membership that references it.
    pub fn rename_node(&mut self, old_id: &str, new_id: impl Into<String>) -> Outcome {
        let new_id = new_id.into();
        if self.node(old_id).is_none() {
            return self.skip(Skip::UnknownNode {
                id: old_id.to_string(),
            });
        }
        if old_id == new_id {
            return self.skip(Skip::SameName { name: new_id });
        }
        if self.node(&new_id).is_some() {
            return self.skip(Skip::DuplicateNode { id: new_id });
        }

        self.begin();

        for node in self.nodes.iter_mut().filter(|n| n.id == old_id) {
            node.id = new_id.clone();
        }

        for edge in &mut self.edges {
            if edge.from.node == old_id {
                edge.from.node = new_id.clone();
            }
            if edge.to.node == old_id {
                edge.to.node = new_id.clone();
            }
        }

        for iip in self.initializers.iter_mut().filter(|i| i.to.node == old_id) {
            iip.to.node = new_id.clone();
        }

        for port in self
            .inports
            .values_mut()
            .chain(self.outports.values_mut())
            .filter(|p| p.process == old_id)
        {
            port.process = new_id.clone();
        }

        for group in &mut self.groups {
            for member in group.nodes.iter_mut().filter(|n| n.as_str() == old_id) {
                *member = new_id.clone();
            }
        }

        self.emit(GraphEvent::RenameNode {
            old: old_id.to_string(),
            new: new_id,
        });
        self.finish()
    }

    /// Apply a metadata patch to a node.
    pub fn set_node_metadata(&mut self, id: &str, patch: MetadataPatch) -> Outcome {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return self.skip(Skip::UnknownNode { id: id.to_string() });
        };

        self.begin();
        let node = &mut self.nodes[pos];
        let before = node.metadata.clone();
        apply_patch(&mut node.metadata, &patch);
        let node = node.clone();
        self.emit(GraphEvent::ChangeNode {
            node,
            before,
            delta: patch,
        });
        self.finish()
    }
}
