//! Mutation outcomes.
//!
//! Mutators never fail on bad input: a request that cannot apply (unknown
//! node, duplicate edge, no-op rename...) leaves the graph untouched, emits
//! nothing, and reports why through [`Outcome::Skipped`].

/// Result of a mutator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(Skip),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    /// The skip reason, if the request did not apply.
    pub fn skip_reason(&self) -> Option<&Skip> {
        match self {
            Outcome::Applied => None,
            Outcome::Skipped(reason) => Some(reason),
        }
    }
}

/// Why a mutation was absorbed without effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// A referenced node does not exist.
    UnknownNode { id: String },

    /// A node with this id already exists.
    DuplicateNode { id: String },

    /// No edge matched the given key.
    UnknownEdge { node: String, port: String },

    /// An edge with the same `(from, to)` ports already exists.
    DuplicateEdge {
        from_node: String,
        from_port: String,
        to_node: String,
        to_port: String,
    },

    /// No initializer targets the given node/port.
    UnknownInitial { node: String, port: Option<String> },

    /// No public inport with this name.
    UnknownInport { name: String },

    /// No public outport with this name.
    UnknownOutport { name: String },

    /// No group with this name.
    UnknownGroup { name: String },

    /// Old and new names are the same.
    SameName { name: String },
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skip::UnknownNode { id } => write!(f, "node {} does not exist", id),
            Skip::DuplicateNode { id } => write!(f, "node {} already exists", id),
            Skip::UnknownEdge { node, port } => {
                write!(f, "no edge matches {}.{}", node, port)
            }
            Skip::DuplicateEdge {
                from_node,
                from_port,
                to_node,
                to_port,
            } => write!(
                f,
                "edge {}.{} -> {}.{} already exists",
                from_node, from_port, to_node, to_port
            ),
            Skip::UnknownInitial { node, port } => match port {
                Some(port) => write!(f, "no initializer targets {}.{}", node, port),
                None => write!(f, "no initializer targets {}", node),
            },
            Skip::UnknownInport { name } => write!(f, "inport {} does not exist", name),
            Skip::UnknownOutport { name } => write!(f, "outport {} does not exist", name),
            Skip::UnknownGroup { name } => write!(f, "group {} does not exist", name),
            Skip::SameName { name } => write!(f, "rename of {} to itself", name),
        }
    }
}
