//! Reset-then-rebuild merging.
//!
//! The merge is deliberately naive: the destination is emptied entity by
//! entity and then rebuilt from the source, so every step shows up in the
//! event feed. Neither function opens a transaction of its own; wrap the
//! call in `start_transaction`/`end_transaction` to group the events.

use fg_core::{assigning_patch, clearing_patch};
use tracing::debug;

use crate::graph::Graph;

/// Remove everything from `graph`.
///
/// Order: groups (last first), outports, inports, properties, initializers
/// (last first), edges (last first), nodes (last first). Dependents go
/// before the nodes they reference so no removal is implied by a cascade.
pub fn reset_graph(graph: &mut Graph) {
    let groups: Vec<String> = graph.groups.iter().rev().map(|g| g.name.clone()).collect();
    for name in &groups {
        graph.remove_group(name);
    }

    let outports: Vec<String> = graph.outports.keys().cloned().collect();
    for name in &outports {
        graph.remove_outport(name);
    }
    let inports: Vec<String> = graph.inports.keys().cloned().collect();
    for name in &inports {
        graph.remove_inport(name);
    }

    let clear = clearing_patch(&graph.properties);
    graph.set_properties(clear);

    let targets: Vec<(String, String)> = graph
        .initializers
        .iter()
        .rev()
        .map(|i| (i.to.node.clone(), i.to.port.clone()))
        .collect();
    for (node, port) in &targets {
        graph.remove_initial(node, Some(port));
    }

    let edges: Vec<(String, String, String, String)> = graph
        .edges
        .iter()
        .rev()
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
        graph.remove_edge(from_node, from_port, Some((to_node.as_str(), to_port.as_str())));
    }

    let nodes: Vec<String> = graph.nodes.iter().rev().map(|n| n.id.clone()).collect();
    for id in &nodes {
        graph.remove_node(id);
    }
}

/// Make `base` mirror `theirs` by resetting it and replaying `theirs` into it.
///
/// Rebuild order: properties, nodes, edges, initializers, inports, outports,
/// groups. Indices and metadata are carried over as-is.
pub fn merge_resolve_theirs(base: &mut Graph, theirs: &Graph) {
    debug!(base = %base.name, theirs = %theirs.name, "merging, theirs wins");
    reset_graph(base);

    base.set_properties(assigning_patch(&theirs.properties));

    for node in &theirs.nodes {
        base.add_node(node.id.clone(), node.component.clone(), Some(node.metadata.clone()));
    }

    for edge in &theirs.edges {
        base.add_edge_index(
            &edge.from.node,
            &edge.from.port,
            edge.from.index,
            &edge.to.node,
            &edge.to.port,
            edge.to.index,
            Some(edge.metadata.clone()),
        );
    }

    for iip in &theirs.initializers {
        base.add_initial_index(
            iip.data.clone(),
            &iip.to.node,
            &iip.to.port,
            iip.to.index,
            iip.metadata.clone(),
        );
    }

    for (name, port) in &theirs.inports {
        base.add_inport(name, &port.process, &port.port, port.metadata.clone());
    }
    for (name, port) in &theirs.outports {
        base.add_outport(name, &port.process, &port.port, port.metadata.clone());
    }

    for group in &theirs.groups {
        base.add_group(group.name.clone(), group.nodes.clone(), group.metadata.clone());
    }
}
