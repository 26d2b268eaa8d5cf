//! Public (exported) port mutations.
//!
//! Inports and outports behave identically apart from the map they live in
//! and the events they raise, so both sides share one implementation keyed
//! by [`PortDirection`].

use fg_core::{Metadata, MetadataPatch, apply_patch, clearing_patch};
use indexmap::IndexMap;

use crate::event::GraphEvent;
use crate::graph::{Graph, PublicPort};
use crate::outcome::{Outcome, Skip};

/// Which public port map an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    In,
    Out,
}

impl PortDirection {
    fn unknown(self, name: String) -> Skip {
        match self {
            PortDirection::In => Skip::UnknownInport { name },
            PortDirection::Out => Skip::UnknownOutport { name },
        }
    }

    fn added(self, name: String, port: PublicPort) -> GraphEvent {
        match self {
            PortDirection::In => GraphEvent::AddInport { name, port },
            PortDirection::Out => GraphEvent::AddOutport { name, port },
        }
    }

    fn removed(self, name: String, port: PublicPort) -> GraphEvent {
        match self {
            PortDirection::In => GraphEvent::RemoveInport { name, port },
            PortDirection::Out => GraphEvent::RemoveOutport { name, port },
        }
    }

    fn renamed(self, old: String, new: String) -> GraphEvent {
        match self {
            PortDirection::In => GraphEvent::RenameInport { old, new },
            PortDirection::Out => GraphEvent::RenameOutport { old, new },
        }
    }

    fn changed(
        self,
        name: String,
        port: PublicPort,
        before: Option<Metadata>,
        delta: MetadataPatch,
    ) -> GraphEvent {
        match self {
            PortDirection::In => GraphEvent::ChangeInport {
                name,
                port,
                before,
                delta,
            },
            PortDirection::Out => GraphEvent::ChangeOutport {
                name,
                port,
                before,
                delta,
            },
        }
    }
}

impl Graph {
    fn public_ports(&self, dir: PortDirection) -> &IndexMap<String, PublicPort> {
        match dir {
            PortDirection::In => &self.inports,
            PortDirection::Out => &self.outports,
        }
    }

    fn public_ports_mut(&mut self, dir: PortDirection) -> &mut IndexMap<String, PublicPort> {
        match dir {
            PortDirection::In => &mut self.inports,
            PortDirection::Out => &mut self.outports,
        }
    }

    /// Expose `node.port` as a public port called `name`.
    ///
    /// An existing public port of the same name is replaced in place.
    pub fn add_public_port(
        &mut self,
        dir: PortDirection,
        name: &str,
        node: &str,
        port: &str,
        metadata: Option<Metadata>,
    ) -> Outcome {
        if self.node(node).is_none() {
            return self.skip(Skip::UnknownNode {
                id: node.to_string(),
            });
        }

        let name = self.port_name(name);
        let entry = PublicPort {
            process: node.to_string(),
            port: self.port_name(port),
            metadata,
        };
        self.begin();
        self.public_ports_mut(dir).insert(name.clone(), entry.clone());
        self.emit(dir.added(name, entry));
        self.finish()
    }

    /// Remove a public port, clearing its metadata first.
    pub fn remove_public_port(&mut self, dir: PortDirection, name: &str) -> Outcome {
        let name = self.port_name(name);
        let Some(existing) = self.public_ports(dir).get(&name) else {
            return self.skip(dir.unknown(name));
        };
        let clear = existing
            .metadata
            .as_ref()
            .map(clearing_patch)
            .unwrap_or_default();

        self.begin();
        self.set_public_port_metadata(dir, &name, clear);
        if let Some(port) = self.public_ports_mut(dir).shift_remove(&name) {
            self.emit(dir.removed(name, port));
        }
        self.finish()
    }

    /// Rename a public port. The renamed entry moves to the end of the map.
    pub fn rename_public_port(&mut self, dir: PortDirection, old_name: &str, new_name: &str) -> Outcome {
        let old_name = self.port_name(old_name);
        let new_name = self.port_name(new_name);
        if !self.public_ports(dir).contains_key(&old_name) {
            return self.skip(dir.unknown(old_name));
        }
        if old_name == new_name {
            return self.skip(Skip::SameName { name: new_name });
        }

        self.begin();
        let ports = self.public_ports_mut(dir);
        if let Some(port) = ports.shift_remove(&old_name) {
            ports.insert(new_name.clone(), port);
        }
        self.emit(dir.renamed(old_name, new_name));
        self.finish()
    }

    /// Apply a metadata patch to a public port.
    pub fn set_public_port_metadata(&mut self, dir: PortDirection, name: &str, patch: MetadataPatch) -> Outcome {
        let name = self.port_name(name);
        if !self.public_ports(dir).contains_key(&name) {
            return self.skip(dir.unknown(name));
        }

        self.begin();
        let changed = self.public_ports_mut(dir).get_mut(&name).map(|entry| {
            let before = entry.metadata.clone();
            apply_patch(entry.metadata.get_or_insert_with(Metadata::new), &patch);
            (entry.clone(), before)
        });
        if let Some((entry, before)) = changed {
            self.emit(dir.changed(name, entry, before, patch));
        }
        self.finish()
    }

    pub fn add_inport(&mut self, name: &str, node: &str, port: &str, metadata: Option<Metadata>) -> Outcome {
        self.add_public_port(PortDirection::In, name, node, port, metadata)
    }

    pub fn remove_inport(&mut self, name: &str) -> Outcome {
        self.remove_public_port(PortDirection::In, name)
    }

    pub fn rename_inport(&mut self, old_name: &str, new_name: &str) -> Outcome {
        self.rename_public_port(PortDirection::In, old_name, new_name)
    }

    pub fn set_inport_metadata(&mut self, name: &str, patch: MetadataPatch) -> Outcome {
        self.set_public_port_metadata(PortDirection::In, name, patch)
    }

    pub fn add_outport(&mut self, name: &str, node: &str, port: &str, metadata: Option<Metadata>) -> Outcome {
        self.add_public_port(PortDirection::Out, name, node, port, metadata)
    }

    pub fn remove_outport(&mut self, name: &str) -> Outcome {
        self.remove_public_port(PortDirection::Out, name)
    }

    pub fn rename_outport(&mut self, old_name: &str, new_name: &str) -> Outcome {
        self.rename_public_port(PortDirection::Out, old_name, new_name)
    }

    pub fn set_outport_metadata(&mut self, name: &str, patch: MetadataPatch) -> Outcome {
        self.set_public_port_metadata(PortDirection::Out, name, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EventLog;
    use fg_core::MetaValue;

    fn graph() -> Graph {
        let mut graph = Graph::new("g");
        graph.add_node("N", "Comp", None);
        graph
    }

    #[test]
    fn case_insensitive_names_address_the_same_port() {
        let mut graph = graph();
        graph.add_inport("Foo", "N", "In", None);
        assert_eq!(graph.inports()["foo"].port, "in");
        assert!(graph.remove_inport("FOO").is_applied());
        assert!(graph.inports().is_empty());
    }

    #[test]
    fn case_sensitive_graph_keeps_names() {
        let mut graph = Graph::with_options(crate::GraphOptions {
            name: "g".into(),
            case_sensitive: true,
        });
        graph.add_node("N", "Comp", None);
        graph.add_outport("Foo", "N", "Out", None);
        assert!(graph.remove_outport("FOO").is_skipped());
        assert!(graph.outports().contains_key("Foo"));
    }

    #[test]
    fn port_for_unknown_node_is_skipped() {
        let mut graph = graph();
        let log = EventLog::attach(&mut graph);
        assert!(graph.add_inport("in", "Ghost", "in", None).is_skipped());
        assert!(log.is_empty());
    }

    #[test]
    fn rename_moves_entry_to_end() {
        let mut graph = graph();
        graph.add_inport("a", "N", "x", None);
        graph.add_inport("b", "N", "y", None);
        let log = EventLog::attach(&mut graph);
        assert!(graph.rename_inport("A", "c").is_applied());
        let names: Vec<&str> = graph.inports().keys().map(String::as_str).collect();
        assert_eq!(names, ["b", "c"]);
        assert_eq!(log.changes(), ["renameInport"]);

        assert!(graph.rename_inport("b", "B").is_skipped());
        assert!(graph.rename_inport("zzz", "q").is_skipped());
    }

    #[test]
    fn rename_outport() {
        let mut graph = graph();
        graph.add_outport("out", "N", "out", None);
        assert!(graph.rename_outport("out", "result").is_applied());
        assert!(graph.outports().contains_key("result"));
    }

    #[test]
    fn metadata_materializes_on_first_touch() {
        let mut graph = graph();
        graph.add_inport("in", "N", "in", None);
        assert!(graph.inports()["in"].metadata.is_none());

        let log = EventLog::attach(&mut graph);
        graph.set_inport_metadata(
            "in",
            MetadataPatch::from([("x".to_string(), Some(MetaValue::from(5_i64)))]),
        );
        let meta = graph.inports()["in"].metadata.as_ref().unwrap();
        assert_eq!(meta["x"], MetaValue::from(5_i64));
        match &log.events()[1] {
            GraphEvent::ChangeInport { name, before, .. } => {
                assert_eq!(name, "in");
                assert!(before.is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn remove_clears_metadata_then_removes() {
        let mut graph = graph();
        let meta = Metadata::from([("x".to_string(), MetaValue::from(1_i64))]);
        graph.add_outport("out", "N", "out", Some(meta));
        let log = EventLog::attach(&mut graph);
        graph.remove_outport("out");
        assert_eq!(log.changes(), ["changeOutport", "removeOutport"]);
        match &log.events()[2] {
            GraphEvent::RemoveOutport { port, .. } => {
                assert_eq!(port.metadata.as_ref().map(|m| m.len()), Some(0));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn add_existing_name_replaces_in_place() {
        let mut graph = graph();
        graph.add_node("M", "Comp", None);
        graph.add_inport("a", "N", "x", None);
        graph.add_inport("b", "N", "y", None);
        graph.add_inport("a", "M", "z", None);
        let names: Vec<&str> = graph.inports().keys().map(String::as_str).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(graph.inports()["a"].process, "M");
    }
}
