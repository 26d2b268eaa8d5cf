//! Transaction tracking.
//!
//! A transaction is either opened explicitly by the caller, or implicitly by
//! the first mutator to run while none is open. Implicit transactions nest by
//! depth so that a cascade (e.g. removing a node and everything attached to
//! it) closes exactly once, when the outermost mutator returns.

use core::fmt;

use fg_core::{FgError, FgResult, Metadata};
use tracing::debug;

use crate::event::GraphEvent;
use crate::graph::Graph;

/// Identifier of an open transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionId {
    /// Opened automatically by a mutator.
    Implicit,
    /// Opened by the caller with `start_transaction`.
    Explicit(String),
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionId::Implicit => f.write_str("implicit"),
            TransactionId::Explicit(id) => f.write_str(id),
        }
    }
}

/// Transaction state: closed (`id = None, depth = 0`) or open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    id: Option<TransactionId>,
    depth: u32,
}

impl Transaction {
    pub fn is_open(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<&TransactionId> {
        self.id.as_ref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn implicit_id(&self) -> TransactionId {
        TransactionId::Implicit
    }

    fn open(&mut self, id: TransactionId) -> FgResult<()> {
        if let Some(open) = &self.id {
            return Err(FgError::NestedTransaction {
                open: open.to_string(),
                requested: id.to_string(),
            });
        }
        self.id = Some(id);
        self.depth = 1;
        Ok(())
    }

    fn close(&mut self) -> FgResult<TransactionId> {
        let id = self.id.take().ok_or(FgError::NoOpenTransaction)?;
        self.depth = 0;
        Ok(id)
    }

    /// Mutator entry. Returns true when a new implicit transaction was opened.
    pub(crate) fn enter_implicit(&mut self) -> bool {
        match self.id {
            None => {
                self.id = Some(TransactionId::Implicit);
                self.depth = 1;
                true
            }
            Some(TransactionId::Implicit) => {
                self.depth += 1;
                false
            }
            Some(TransactionId::Explicit(_)) => false,
        }
    }

    /// Mutator exit. Returns the id of the transaction closed, if this exit
    /// brought the implicit depth back to zero.
    pub(crate) fn exit_implicit(&mut self) -> Option<TransactionId> {
        if self.id != Some(TransactionId::Implicit) {
            return None;
        }
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.id = None;
            Some(TransactionId::Implicit)
        } else {
            None
        }
    }
}

impl Graph {
    /// Open an explicit transaction.
    ///
    /// Fails if any transaction (explicit or implicit) is already open.
    pub fn start_transaction(&mut self, id: impl Into<String>, metadata: Option<Metadata>) -> FgResult<()> {
        let id = TransactionId::Explicit(id.into());
        self.transaction.open(id.clone())?;
        debug!(graph = %self.name, transaction = %id, "transaction started");
        self.emit(GraphEvent::StartTransaction { id, metadata });
        Ok(())
    }

    /// Close the open transaction.
    ///
    /// Fails if no transaction is open.
    pub fn end_transaction(&mut self, metadata: Option<Metadata>) -> FgResult<()> {
        let id = self.transaction.close()?;
        debug!(graph = %self.name, transaction = %id, "transaction ended");
        self.emit(GraphEvent::EndTransaction { id, metadata });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_nesting_closes_once() {
        let mut tx = Transaction::default();
        assert!(tx.enter_implicit());
        assert!(!tx.enter_implicit());
        assert_eq!(tx.depth(), 2);
        assert_eq!(tx.exit_implicit(), None);
        assert_eq!(tx.exit_implicit(), Some(TransactionId::Implicit));
        assert!(!tx.is_open());
        assert_eq!(tx.depth(), 0);
    }

    #[test]
    fn explicit_transaction_ignores_mutator_bookkeeping() {
        let mut tx = Transaction::default();
        tx.open(TransactionId::Explicit("load".into())).unwrap();
        assert!(!tx.enter_implicit());
        assert_eq!(tx.exit_implicit(), None);
        assert_eq!(tx.depth(), 1);
        assert_eq!(tx.close().unwrap(), TransactionId::Explicit("load".into()));
    }

    #[test]
    fn double_start_is_rejected() {
        let mut graph = Graph::new("g");
        graph.start_transaction("a", None).unwrap();
        let err = graph.start_transaction("b", None).unwrap_err();
        assert!(matches!(err, FgError::NestedTransaction { .. }));
        graph.end_transaction(None).unwrap();
    }

    #[test]
    fn end_without_start_is_rejected() {
        let mut graph = Graph::new("g");
        assert_eq!(graph.end_transaction(None), Err(FgError::NoOpenTransaction));
    }

    #[test]
    fn implicit_id_cannot_be_spoofed() {
        let mut graph = Graph::new("g");
        graph.start_transaction("implicit", None).unwrap();
        graph.add_node("A", "Comp", None);
        assert!(graph.transaction().is_open());
        assert_eq!(graph.transaction().depth(), 1);
        graph.end_transaction(None).unwrap();
        assert!(!graph.transaction().is_open());
    }
}
