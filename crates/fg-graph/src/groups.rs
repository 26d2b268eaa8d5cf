//! Group mutations.
//!
//! Group names are not unique. Rename, remove and metadata updates address
//! every group carrying the name and raise one event per group touched.

use fg_core::{Metadata, MetadataPatch, apply_patch, clearing_patch};

use crate::event::GraphEvent;
use crate::graph::{Graph, Group};
use crate::outcome::{Outcome, Skip};

impl Graph {
    /// Append a group. Node ids are not checked against the graph.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        nodes: Vec<String>,
        metadata: Option<Metadata>,
    ) -> Outcome {
        self.begin();
        let group = Group {
            name: name.into(),
            nodes,
            metadata,
        };
        self.groups.push(group.clone());
        self.emit(GraphEvent::AddGroup(group));
        self.finish()
    }

    pub fn rename_group(&mut self, old_name: &str, new_name: &str) -> Outcome {
        if !self.groups.iter().any(|g| g.name == old_name) {
            return self.skip(Skip::UnknownGroup {
                name: old_name.to_string(),
            });
        }
        if old_name == new_name {
            return self.skip(Skip::SameName {
                name: new_name.to_string(),
            });
        }

        self.begin();
        let count = self.groups.iter().filter(|g| g.name == old_name).count();
        for group in self.groups.iter_mut().filter(|g| g.name == old_name) {
            group.name = new_name.to_string();
        }
        for _ in 0..count {
            self.emit(GraphEvent::RenameGroup {
                old: old_name.to_string(),
                new: new_name.to_string(),
            });
        }
        self.finish()
    }

    /// Remove every group called `name`, clearing each one's metadata first.
    ///
    /// Subscribers may reshape the group list while the clear is delivered;
    /// a group is only removed if it is still at the cleared position.
    pub fn remove_group(&mut self, name: &str) -> Outcome {
        if !self.groups.iter().any(|g| g.name == name) {
            return self.skip(Skip::UnknownGroup {
                name: name.to_string(),
            });
        }

        self.begin();
        while let Some(pos) = self.groups.iter().position(|g| g.name == name) {
            let clear = self.groups[pos]
                .metadata
                .as_ref()
                .map(clearing_patch)
                .unwrap_or_default();
            self.change_group_at(pos, clear);
            if self.groups.get(pos).is_some_and(|g| g.name == name) {
                let group = self.groups.remove(pos);
                self.emit(GraphEvent::RemoveGroup(group));
            }
        }
        self.finish()
    }

    /// Apply a metadata patch to every group called `name`.
    pub fn set_group_metadata(&mut self, name: &str, patch: MetadataPatch) -> Outcome {
        if !self.groups.iter().any(|g| g.name == name) {
            return self.skip(Skip::UnknownGroup {
                name: name.to_string(),
            });
        }

        self.begin();
        // Positions are re-scanned after each event; subscribers may have
        // added or removed groups in the meantime.
        let mut from = 0;
        while let Some(offset) = self
            .groups
            .get(from..)
            .and_then(|rest| rest.iter().position(|g| g.name == name))
        {
            let pos = from + offset;
            self.change_group_at(pos, patch.clone());
            from = pos + 1;
        }
        self.finish()
    }

    fn change_group_at(&mut self, pos: usize, patch: MetadataPatch) {
        let Some(group) = self.groups.get_mut(pos) else {
            return;
        };
        let before = group.metadata.clone();
        apply_patch(group.metadata.get_or_insert_with(Metadata::new), &patch);
        let group = group.clone();
        self.emit(GraphEvent::ChangeGroup {
            group,
            before,
            delta: patch,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EventLog;
    use fg_core::MetaValue;

    fn meta(key: &str, value: &str) -> Metadata {
        Metadata::from([(key.to_string(), MetaValue::from(value))])
    }

    fn graph() -> Graph {
        let mut graph = Graph::new("g");
        graph.add_group("first", vec!["A".into(), "B".into()], Some(meta("label", "1")));
        graph.add_group("second", vec!["C".into()], None);
        graph.add_group("first", vec!["D".into()], None);
        graph
    }

    #[test]
    fn add_group_does_not_check_members() {
        let graph = graph();
        assert_eq!(graph.groups().len(), 3);
        assert_eq!(graph.groups()[0].nodes, ["A", "B"]);
    }

    #[test]
    fn rename_touches_every_group_with_the_name() {
        let mut graph = graph();
        let log = EventLog::attach(&mut graph);
        assert!(graph.rename_group("first", "renamed").is_applied());
        let names: Vec<&str> = graph.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["renamed", "second", "renamed"]);
        assert_eq!(log.changes(), ["renameGroup", "renameGroup"]);
    }

    #[test]
    fn rename_skips() {
        let mut graph = graph();
        let log = EventLog::attach(&mut graph);
        assert!(graph.rename_group("missing", "x").is_skipped());
        assert!(graph.rename_group("second", "second").is_skipped());
        assert!(log.is_empty());
    }

    #[test]
    fn remove_clears_metadata_then_removes() {
        let mut graph = graph();
        let log = EventLog::attach(&mut graph);
        assert!(graph.remove_group("first").is_applied());
        assert_eq!(graph.groups().len(), 1);
        assert_eq!(
            log.changes(),
            ["changeGroup", "removeGroup", "changeGroup", "removeGroup"]
        );
        match &log.events()[1] {
            GraphEvent::ChangeGroup { group, before, .. } => {
                assert_eq!(before.as_ref(), Some(&meta("label", "1")));
                assert_eq!(group.metadata.as_ref().map(|m| m.len()), Some(0));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(graph.remove_group("first").is_skipped());
    }

    #[test]
    fn metadata_applies_to_all_namesakes() {
        let mut graph = graph();
        let patch = MetadataPatch::from([("label".to_string(), Some(MetaValue::from("x")))]);
        assert!(graph.set_group_metadata("first", patch).is_applied());
        assert_eq!(graph.groups()[0].metadata, Some(meta("label", "x")));
        assert_eq!(graph.groups()[2].metadata, Some(meta("label", "x")));
        assert_eq!(graph.groups()[1].metadata, None);
        assert!(graph.set_group_metadata("nope", MetadataPatch::new()).is_skipped());
    }

    #[test]
    fn metadata_survives_groups_removed_mid_delivery() {
        let mut graph = Graph::new("g");
        graph.add_group("a", vec![], None);
        graph.add_group("b", vec![], None);
        graph.add_group("a", vec![], None);
        graph.subscribe_reentrant(|graph, event| {
            if let GraphEvent::ChangeGroup { .. } = event {
                graph.remove_group("b");
            }
        });

        let patch = MetadataPatch::from([("x".to_string(), Some(MetaValue::from(1_i64)))]);
        assert!(graph.set_group_metadata("a", patch).is_applied());
        let names: Vec<&str> = graph.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["a", "a"]);
        assert!(graph.groups().iter().all(|g| g.metadata.as_ref().is_some_and(|m| m.contains_key("x"))));
    }

    #[test]
    fn remove_keeps_other_groups_when_subscriber_removes_first() {
        let mut graph = Graph::new("g");
        graph.add_group("a", vec![], None);
        graph.add_group("b", vec![], None);
        graph.subscribe_reentrant(|graph, event| {
            if let GraphEvent::ChangeGroup { group, .. } = event {
                if group.name == "a" {
                    graph.remove_group("a");
                }
            }
        });

        assert!(graph.remove_group("a").is_applied());
        let names: Vec<&str> = graph.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["b"]);
        assert!(!graph.transaction().is_open());
    }
}
