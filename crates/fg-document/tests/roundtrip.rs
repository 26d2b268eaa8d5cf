use fg_core::{IipData, MetaValue, Metadata, MetadataPatch};
use fg_document::{
    decode, decode_str, equivalent, load_json, load_path, load_yaml, save_json, save_yaml,
    to_document, to_json, to_json_pretty,
};
use fg_graph::{EventLog, Graph, GraphEvent, merge_resolve_theirs};

fn meta(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), MetaValue::from(*v)))
        .collect()
}

fn sample() -> Graph {
    let mut graph = Graph::new("roundtrip");
    graph.set_properties(MetadataPatch::from([
        ("environment".to_string(), Some(MetaValue::from("test"))),
        ("version".to_string(), Some(MetaValue::from(3_i64))),
    ]));
    graph.add_node("Read", "ReadFile", Some(meta(&[("x", "10"), ("y", "20")])));
    graph.add_node("Split", "SplitStr", None);
    graph.add_node("Display", "Output", None);
    graph.add_edge("Read", "out", "Split", "in", Some(meta(&[("route", "5")])));
    graph.add_edge_index("Split", "out", Some(0), "Display", "in", Some(1), None);
    graph.add_initial("somefile.txt".into(), "Read", "source", None);
    graph.add_initial_index(IipData::from(serde_json::json!({"sep": ","})), "Split", "opts", Some(2), None);
    graph.add_inport("FILE", "Read", "source", Some(meta(&[("a", "b")])));
    graph.add_outport("OUT", "Display", "out", None);
    graph.add_group("readers", vec!["Read".into()], Some(meta(&[("description", "io")])));
    graph.add_group("plain", vec!["Split".into(), "Display".into()], None);
    graph
}

#[test]
fn json_text_roundtrip() {
    let graph = sample();
    let text = to_json(&graph).unwrap();
    let decoded = decode_str(&text).unwrap();
    assert!(equivalent(&graph, &decoded));
    assert_eq!(to_json(&decoded).unwrap(), text);
}

#[test]
fn encode_is_idempotent_through_decode() {
    let doc = to_document(&sample());
    let again = to_document(&decode(&doc).unwrap());
    assert_eq!(doc, again);
}

#[test]
fn json_file_roundtrip_appends_extension() {
    let graph = sample();
    let base = std::env::temp_dir().join("fg_document_roundtrip_graph");

    let written = save_json(&base, &graph).unwrap();
    assert_eq!(written.extension().and_then(|e| e.to_str()), Some("json"));

    let loaded = load_json(&written).unwrap();
    assert!(equivalent(&graph, &loaded));
    let loaded = load_path(&written).unwrap();
    assert!(equivalent(&graph, &loaded));
    let _ = std::fs::remove_file(&written);
}

#[test]
fn yaml_file_roundtrip() {
    let graph = sample();
    let path = std::env::temp_dir().join("fg_document_roundtrip_graph.yaml");
    save_yaml(&path, &graph).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert!(equivalent(&graph, &loaded));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn unknown_extension_is_rejected() {
    let path = std::env::temp_dir().join("fg_document_graph.fbp");
    assert!(matches!(
        load_path(&path),
        Err(fg_document::DocumentError::UnsupportedFormat { .. })
    ));
}

#[test]
fn pretty_and_compact_agree() {
    let graph = sample();
    let pretty: serde_json::Value = serde_json::from_str(&to_json_pretty(&graph).unwrap()).unwrap();
    let compact: serde_json::Value = serde_json::from_str(&to_json(&graph).unwrap()).unwrap();
    assert_eq!(pretty, compact);
}

#[test]
fn merge_makes_base_equivalent_to_theirs() {
    let theirs = sample();
    let mut base = Graph::new("roundtrip");
    base.add_node("Old", "Legacy", None);
    base.add_node("Read", "ReadFile", None);
    base.add_edge("Old", "out", "Read", "in", None);

    base.start_transaction("merge", None).unwrap();
    merge_resolve_theirs(&mut base, &theirs);
    base.end_transaction(None).unwrap();

    assert!(equivalent(&base, &theirs));
}

#[test]
fn merge_scenario_event_order() {
    let mut base = decode_str(r#"{"processes":{"A":{"component":"C"}}}"#).unwrap();
    let theirs = decode_str(
        r#"{"processes":{"A":{"component":"C"},"B":{"component":"C"}},
            "connections":[{"src":{"process":"A","port":"out"},"tgt":{"process":"B","port":"in"}}]}"#,
    )
    .unwrap();

    let log = EventLog::attach(&mut base);
    base.start_transaction("merge", None).unwrap();
    merge_resolve_theirs(&mut base, &theirs);
    base.end_transaction(None).unwrap();

    let structural: Vec<String> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            GraphEvent::AddNode(_) | GraphEvent::RemoveNode(_) | GraphEvent::AddEdge(_) => {
                Some(e.to_string())
            }
            _ => None,
        })
        .collect();
    assert_eq!(structural, ["DEL A(C)", "A(C)", "B(C)", "A out -> in B"]);
}

#[test]
fn nested_key_order_survives_reencoding() {
    let text = r#"{"processes":{"A":{"component":"C","metadata":{"pos":{"y":1,"x":2}}}},
        "connections":[{"data":{"zeta":1,"alpha":2},"tgt":{"process":"A","port":"in"}}]}"#;
    let out = to_json(&decode_str(text).unwrap()).unwrap();
    assert!(out.contains(r#"{"y":1,"x":2}"#), "{}", out);
    assert!(out.contains(r#"{"zeta":1,"alpha":2}"#), "{}", out);
}

#[test]
fn non_string_name_property_roundtrips() {
    let mut graph = Graph::new("");
    graph.set_properties(MetadataPatch::from([(
        "name".to_string(),
        Some(MetaValue::from(5_i64)),
    )]));
    let decoded = decode_str(&to_json(&graph).unwrap()).unwrap();
    assert!(equivalent(&graph, &decoded));
    assert_eq!(decoded.properties()["name"], MetaValue::from(5_i64));
}

#[test]
fn null_sections_load_as_empty_graph() {
    let graph = decode_str(r#"{"properties":null,"processes":null,"connections":null}"#).unwrap();
    assert!(graph.nodes().is_empty());
    assert!(graph.properties().is_empty());
    assert!(equivalent(&graph, &Graph::new("")));
}
