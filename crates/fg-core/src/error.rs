use thiserror::Error;

pub type FgResult<T> = Result<T, FgError>;

/// Transaction protocol violations.
///
/// These indicate a programming error in the calling layer and are always
/// surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FgError {
    #[error("Nested transactions not supported: {requested} requested while {open} is open")]
    NestedTransaction { open: String, requested: String },

    #[error("Attempted to end non-existing transaction")]
    NoOpenTransaction,
}
