//! fg-document: canonical graph document format, file helpers and exports.

pub mod decode;
pub mod encode;
pub mod export;
pub mod schema;

use std::path::{Path, PathBuf};

use fg_core::FgError;
use fg_graph::Graph;
use tracing::debug;

pub use decode::{LOAD_TRANSACTION, decode, decode_str, graph_options, replay};
pub use encode::{equivalent, to_document, to_json, to_json_pretty};
pub use export::{to_dot, to_yuml};
pub use schema::*;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Malformed document: {what}")]
    Malformed { what: String },

    #[error("Unsupported document format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Graph error: {0}")]
    Graph(#[from] FgError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialization format of a document file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> DocumentResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            _ => Err(DocumentError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read a document without building a graph from it.
pub fn read_document(path: &Path) -> DocumentResult<GraphDocument> {
    let content = std::fs::read_to_string(path)?;
    let doc = match Format::from_path(path)? {
        Format::Json => serde_json::from_str(&content)?,
        Format::Yaml => serde_yaml::from_str(&content)?,
    };
    debug!(path = %path.display(), "document read");
    Ok(doc)
}

pub fn load_json(path: &Path) -> DocumentResult<Graph> {
    let content = std::fs::read_to_string(path)?;
    let doc: GraphDocument = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "loading json graph");
    decode(&doc)
}

/// Write the graph as pretty JSON, appending `.json` to the path if it does
/// not already end with it. Returns the path written.
pub fn save_json(path: &Path, graph: &Graph) -> DocumentResult<PathBuf> {
    let path = if path.extension().is_some_and(|e| e == "json") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    };
    let content = to_json_pretty(graph)?;
    std::fs::write(&path, content)?;
    debug!(path = %path.display(), "saved json graph");
    Ok(path)
}

pub fn load_yaml(path: &Path) -> DocumentResult<Graph> {
    let content = std::fs::read_to_string(path)?;
    let doc: GraphDocument = serde_yaml::from_str(&content)?;
    debug!(path = %path.display(), "loading yaml graph");
    decode(&doc)
}

pub fn save_yaml(path: &Path, graph: &Graph) -> DocumentResult<()> {
    let content = serde_yaml::to_string(&to_document(graph))?;
    std::fs::write(path, content)?;
    debug!(path = %path.display(), "saved yaml graph");
    Ok(())
}

/// Load a graph from a `.json`, `.yaml` or `.yml` file.
pub fn load_path(path: &Path) -> DocumentResult<Graph> {
    match Format::from_path(path)? {
        Format::Json => load_json(path),
        Format::Yaml => load_yaml(path),
    }
}
