//! Document to graph decoding.

use fg_core::{IipData, MetaValue, Metadata, assigning_patch};
use fg_graph::{Graph, GraphOptions};
use tracing::debug;

use crate::schema::{ConnectionDef, GraphDocument};
use crate::{DocumentError, DocumentResult};

/// Transaction id wrapping a document load.
pub const LOAD_TRANSACTION: &str = "loadJSON";

/// The graph name carried by a document. Only a string `name` property
/// names the graph; any other value stays an ordinary property.
fn document_name(doc: &GraphDocument) -> Option<&str> {
    doc.properties.get("name").and_then(MetaValue::as_str)
}

/// Construction options encoded in a document: the `name` property and the
/// case-sensitivity flag.
pub fn graph_options(doc: &GraphDocument) -> GraphOptions {
    GraphOptions {
        name: document_name(doc).unwrap_or_default().to_string(),
        case_sensitive: doc.case_sensitive,
    }
}

/// Build a new graph from a document.
pub fn decode(doc: &GraphDocument) -> DocumentResult<Graph> {
    let mut graph = Graph::with_options(graph_options(doc));
    replay(doc, &mut graph, None)?;
    Ok(graph)
}

/// Parse JSON text and build a graph from it.
pub fn decode_str(text: &str) -> DocumentResult<Graph> {
    let doc: GraphDocument = serde_json::from_str(text)?;
    decode(&doc)
}

/// Replay a document into `graph` inside one `loadJSON` transaction.
///
/// Order: properties (without `name`), processes, connections, inports,
/// outports, groups. Entries the graph rejects (an edge to an unknown
/// process, say) are skipped like any other invalid mutation.
pub fn replay(doc: &GraphDocument, graph: &mut Graph, metadata: Option<Metadata>) -> DocumentResult<()> {
    for (i, conn) in doc.connections.iter().enumerate() {
        check_connection(i, conn)?;
    }

    graph.start_transaction(LOAD_TRANSACTION, metadata)?;

    let mut properties = doc.properties.clone();
    if document_name(doc).is_some() {
        properties.shift_remove("name");
    }
    graph.set_properties(assigning_patch(&properties));

    for (id, process) in &doc.processes {
        graph.add_node(
            id.clone(),
            process.component.clone(),
            Some(process.metadata.clone().unwrap_or_default()),
        );
    }

    for conn in &doc.connections {
        replay_connection(graph, conn);
    }

    for (name, port) in &doc.inports {
        graph.add_inport(name, &port.process, &port.port, port.metadata.clone());
    }
    for (name, port) in &doc.outports {
        graph.add_outport(name, &port.process, &port.port, port.metadata.clone());
    }

    for group in &doc.groups {
        graph.add_group(
            group.name.clone(),
            group.nodes.clone(),
            Some(group.metadata.clone().unwrap_or_default()),
        );
    }

    graph.end_transaction(None)?;
    debug!(
        graph = %graph.name(),
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        initializers = graph.initializers().len(),
        "document loaded"
    );
    Ok(())
}

fn check_connection(i: usize, conn: &ConnectionDef) -> DocumentResult<()> {
    if conn.data.is_none() && conn.src.is_none() {
        return Err(DocumentError::Malformed {
            what: format!(
                "connection {} to {}.{} has neither data nor src",
                i, conn.tgt.process, conn.tgt.port
            ),
        });
    }
    Ok(())
}

fn replay_connection(graph: &mut Graph, conn: &ConnectionDef) {
    let metadata = conn.metadata.clone().unwrap_or_default();
    let tgt = &conn.tgt;

    if let Some(data) = &conn.data {
        graph.add_initial_index(
            IipData::Literal(data.clone()),
            &tgt.process,
            &tgt.port,
            tgt.numeric_index(),
            Some(metadata),
        );
        return;
    }

    if let Some(src) = &conn.src {
        graph.add_edge_index(
            &src.process,
            &src.port,
            src.numeric_index(),
            &tgt.process,
            &tgt.port,
            tgt.numeric_index(),
            Some(metadata),
        );
    }
}
