//! One-way visual exports: Graphviz DOT and yUML.

use std::fmt::Write;

use fg_graph::Graph;

fn clean_id(id: &str) -> String {
    id.chars().filter(|c| !c.is_whitespace()).collect()
}

fn clean_port(port: &str) -> String {
    port.replace('.', "")
}

/// Render the graph as a Graphviz digraph.
///
/// Node ids lose their whitespace and port labels lose their dots. Each
/// initializer becomes a plaintext `dataN` node; opaque payloads are
/// labelled `Function`.
pub fn to_dot(graph: &Graph) -> String {
    let mut dot = String::from("digraph {\n");

    for node in graph.nodes() {
        let _ = writeln!(dot, "    {} [label={} shape=box]", clean_id(&node.id), node.id);
    }

    for (i, iip) in graph.initializers().iter().enumerate() {
        let _ = writeln!(dot, "    data{} [label=\"'{}'\" shape=plaintext]", i, iip.data);
        let _ = writeln!(
            dot,
            "    data{} -> {}[headlabel={} labelfontcolor=blue labelfontsize=8.0]",
            i,
            clean_id(&iip.to.node),
            clean_port(&iip.to.port)
        );
    }

    for edge in graph.edges() {
        let _ = writeln!(
            dot,
            "    {} -> {}[taillabel={} headlabel={} labelfontcolor=blue labelfontsize=8.0]",
            clean_id(&edge.from.node),
            clean_id(&edge.to.node),
            clean_port(&edge.from.port),
            clean_port(&edge.to.port)
        );
    }

    dot.push('}');
    dot
}

/// Render the graph as a comma-separated yUML activity diagram.
pub fn to_yuml(graph: &Graph) -> String {
    let initials = graph
        .initializers()
        .iter()
        .map(|iip| format!("(start)[{}]->({})", iip.to.port, iip.to.node));
    let edges = graph
        .edges()
        .iter()
        .map(|edge| format!("({})[{}]->({})", edge.from.node, edge.from.port, edge.to.node));
    initials.chain(edges).collect::<Vec<_>>().join(",")
}
