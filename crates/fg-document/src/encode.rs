//! Graph to document encoding.

use fg_core::MetaValue;
use fg_graph::Graph;
use serde::Serialize;

use crate::DocumentResult;
use crate::schema::{ConnectionDef, EndpointDef, GraphDocument, GroupDef, PortDef, ProcessDef};

/// Canonical document form of `graph`.
///
/// Edges come before initializers in `connections`. Process metadata is
/// always written; group and edge metadata only when non-empty.
/// Initializer metadata is not part of the document.
pub fn to_document(graph: &Graph) -> GraphDocument {
    let mut properties = fg_core::Metadata::new();
    if !graph.name().is_empty() {
        properties.insert("name".to_string(), MetaValue::from(graph.name()));
    }
    for (key, value) in graph.properties() {
        properties.insert(key.clone(), value.clone());
    }

    let port_def = |port: &fg_graph::PublicPort| PortDef {
        process: port.process.clone(),
        port: port.port.clone(),
        metadata: port.metadata.clone(),
    };

    let groups = graph
        .groups()
        .iter()
        .map(|group| GroupDef {
            name: group.name.clone(),
            nodes: group.nodes.clone(),
            metadata: group.metadata.clone().filter(|m| !m.is_empty()),
        })
        .collect();

    let processes = graph
        .nodes()
        .iter()
        .map(|node| {
            let def = ProcessDef {
                component: node.component.clone(),
                metadata: Some(node.metadata.clone()),
            };
            (node.id.clone(), def)
        })
        .collect();

    let edges = graph.edges().iter().map(|edge| ConnectionDef {
        src: Some(EndpointDef::new(
            edge.from.node.clone(),
            edge.from.port.clone(),
            edge.from.index,
        )),
        data: None,
        tgt: EndpointDef::new(edge.to.node.clone(), edge.to.port.clone(), edge.to.index),
        metadata: Some(edge.metadata.clone()).filter(|m| !m.is_empty()),
    });
    let initials = graph.initializers().iter().map(|iip| ConnectionDef {
        src: None,
        data: Some(iip.data.to_json()),
        tgt: EndpointDef::new(iip.to.node.clone(), iip.to.port.clone(), iip.to.index),
        metadata: None,
    });

    GraphDocument {
        case_sensitive: graph.case_sensitive(),
        properties,
        inports: graph
            .inports()
            .iter()
            .map(|(name, port)| (name.clone(), port_def(port)))
            .collect(),
        outports: graph
            .outports()
            .iter()
            .map(|(name, port)| (name.clone(), port_def(port)))
            .collect(),
        groups,
        processes,
        connections: edges.chain(initials).collect(),
    }
}

/// Compact JSON text of the canonical document.
pub fn to_json(graph: &Graph) -> DocumentResult<String> {
    Ok(serde_json::to_string(&to_document(graph))?)
}

/// Pretty JSON text of the canonical document, indented by four spaces.
pub fn to_json_pretty(graph: &Graph) -> DocumentResult<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    to_document(graph).serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| crate::DocumentError::Malformed {
        what: e.to_string(),
    })
}

/// Structural equality: both graphs encode to the same canonical text.
///
/// Collection order and metadata key order are significant.
pub fn equivalent(a: &Graph, b: &Graph) -> bool {
    match (to_json(a), to_json(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_core::{Metadata, MetadataPatch};
    use serde_json::json;

    fn sample() -> Graph {
        let mut graph = Graph::new("sample");
        graph.set_properties(MetadataPatch::from([(
            "env".to_string(),
            Some(MetaValue::from("dev")),
        )]));
        graph.add_node("Read", "ReadFile", None);
        graph.add_node("Display", "Output", None);
        graph.add_initial("f.txt".into(), "Read", "source", None);
        graph.add_edge_index("Read", "out", None, "Display", "in", Some(1), None);
        graph.add_group("io", vec!["Read".into()], Some(Metadata::new()));
        graph
    }

    #[test]
    fn document_layout() {
        let value = serde_json::to_value(to_document(&sample())).unwrap();
        assert_eq!(
            value,
            json!({
                "caseSensitive": false,
                "properties": { "name": "sample", "env": "dev" },
                "inports": {},
                "outports": {},
                "groups": [{ "name": "io", "nodes": ["Read"] }],
                "processes": {
                    "Read": { "component": "ReadFile", "metadata": {} },
                    "Display": { "component": "Output", "metadata": {} }
                },
                "connections": [
                    {
                        "src": { "process": "Read", "port": "out" },
                        "tgt": { "process": "Display", "port": "in", "index": 1 }
                    },
                    {
                        "data": "f.txt",
                        "tgt": { "process": "Read", "port": "source" }
                    }
                ]
            })
        );
    }

    #[test]
    fn unnamed_graph_has_no_name_property() {
        let graph = Graph::new("");
        assert!(to_document(&graph).properties.is_empty());
    }

    #[test]
    fn opaque_data_encodes_as_null() {
        let mut graph = Graph::new("g");
        graph.add_node("A", "Comp", None);
        graph.add_initial(fg_core::IipData::opaque(42_u8), "A", "in", None);
        assert_eq!(to_document(&graph).connections[0].data, Some(serde_json::Value::Null));
    }

    #[test]
    fn pretty_output_uses_four_spaces() {
        let text = to_json_pretty(&Graph::new("g")).unwrap();
        assert!(text.contains("\n    \"caseSensitive\": false"));
    }

    #[test]
    fn equivalence_is_order_sensitive() {
        let mut a = Graph::new("g");
        a.add_node("A", "Comp", None);
        a.add_node("B", "Comp", None);
        let mut b = Graph::new("g");
        b.add_node("B", "Comp", None);
        b.add_node("A", "Comp", None);
        assert!(!equivalent(&a, &b));
        assert!(equivalent(&a, &a));
    }
}
