// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger collaborators.
//!
//! A [`Transaction`] needs two things from the document it was loaded from:
//! resolving invoice ids ([`Ledger::invoice_by_id`]) and telling an invoice
//! which transactions were posted for it ([`Invoice::add_transaction`]).
//!
//! [`Book`] is the in-memory implementation. It keeps invoices in a
//! [`DashMap`] and every loaded transaction id in a [`TransactionRegistry`].
//! Invoices refer back to transactions by id only, so neither side owns the
//! other.
//!
//! # Example
//!
//! ```
//! use ledger_reader_rs::{Book, CommodityRef, InvoiceRecord, Slot, SlotTree, TransactionNode};
//!
//! let book = Book::new();
//! let invoice = book.insert_invoice(InvoiceRecord::new("inv-1"));
//!
//! let node = TransactionNode {
//!     id: "t1".into(),
//!     num: None,
//!     description: "Invoice inv-1".into(),
//!     currency: CommodityRef::currency("EUR"),
//!     date_posted: "2001-09-18 00:00:00 +0200".into(),
//!     date_entered: "2001-09-18 00:00:00 +0200".into(),
//!     slots: Some(SlotTree::from_slots(vec![Slot::frame(
//!         "gncInvoice",
//!         vec![Slot::scalar("invoice-guid", "guid", "inv-1")],
//!     )])),
//!     splits: vec![],
//! };
//! let transaction = book.load_transaction(node).unwrap();
//!
//! assert_eq!(invoice.transaction_ids(), vec![transaction.id().clone()]);
//! ```
//!
//! [`Transaction`]: crate::Transaction

use crate::base::{InvoiceId, TransactionId};
use crate::node::{Document, InvoiceNode, TransactionNode};
use crate::registry::TransactionRegistry;
use crate::transaction::Transaction;
use crate::TransactionError;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// An invoice as seen from a transaction.
pub trait Invoice {
    fn id(&self) -> &InvoiceId;

    /// Records that `transaction` was posted for this invoice.
    fn add_transaction(&self, transaction: &TransactionId);
}

/// The document a transaction was loaded from.
pub trait Ledger {
    type Invoice: Invoice + ?Sized;

    /// Resolves an invoice id, `None` when the document has no such invoice.
    fn invoice_by_id(&self, id: &InvoiceId) -> Option<Arc<Self::Invoice>>;
}

/// In-memory invoice with its transaction back-references.
#[derive(Debug)]
pub struct InvoiceRecord {
    id: InvoiceId,
    number: Option<String>,
    /// Linked transaction ids in link order, without duplicates.
    transactions: Mutex<Vec<TransactionId>>,
}

impl InvoiceRecord {
    pub fn new(id: impl Into<InvoiceId>) -> Self {
        Self {
            id: id.into(),
            number: None,
            transactions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.transactions.lock().clone()
    }
}

impl From<InvoiceNode> for InvoiceRecord {
    fn from(node: InvoiceNode) -> Self {
        Self {
            id: node.id,
            number: node.number,
            transactions: Mutex::new(Vec::new()),
        }
    }
}

impl Invoice for InvoiceRecord {
    fn id(&self) -> &InvoiceId {
        &self.id
    }

    fn add_transaction(&self, transaction: &TransactionId) {
        let mut transactions = self.transactions.lock();
        if !transactions.contains(transaction) {
            transactions.push(transaction.clone());
        }
    }
}

/// In-memory ledger: invoice index plus the registry of loaded transactions.
///
/// # Invariants
///
/// - Transaction ids are unique across the book.
/// - Invoice back-references are only ever added, never removed.
#[derive(Debug, Default)]
pub struct Book {
    /// Invoices indexed by id.
    invoices: DashMap<InvoiceId, Arc<InvoiceRecord>>,
    /// Every transaction loaded through this book.
    transactions: TransactionRegistry,
}

impl Book {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an invoice, returning the stored record.
    ///
    /// If an invoice with the same id already exists it is kept and returned
    /// instead, so existing back-references are never lost.
    pub fn insert_invoice(&self, invoice: InvoiceRecord) -> Arc<InvoiceRecord> {
        let id = invoice.id.clone();
        Arc::clone(
            self.invoices
                .entry(id)
                .or_insert_with(|| Arc::new(invoice))
                .value(),
        )
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<Arc<InvoiceRecord>> {
        self.invoices.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    /// Registers and builds a transaction from its node.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MissingId`] - The node has an empty id.
    /// - [`TransactionError::DuplicateTransaction`] - The id was loaded before.
    pub fn load_transaction(&self, node: TransactionNode) -> Result<Transaction<'_, Self>, TransactionError> {
        if node.id.as_str().is_empty() {
            return Err(TransactionError::MissingId);
        }
        let position = self.transactions.register(&node.id)?;
        debug!(transaction = %node.id, position, "registered transaction");
        Transaction::new(node, self)
    }

    /// Loads every invoice, then every transaction, of a parsed document.
    ///
    /// Invoices go first so that transactions can link to them. All
    /// transaction ids are checked before anything is inserted, so a rejected
    /// document leaves the book unchanged.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MissingId`] - A transaction node has an empty id.
    /// - [`TransactionError::DuplicateTransaction`] - An id repeats within the
    ///   document or was loaded before.
    pub fn load_document(&self, document: Document) -> Result<Vec<Transaction<'_, Self>>, TransactionError> {
        self.check_new_ids(&document.transactions)?;
        for invoice in document.invoices {
            self.insert_invoice(invoice.into());
        }
        document
            .transactions
            .into_iter()
            .map(|node| self.load_transaction(node))
            .collect()
    }

    fn check_new_ids(&self, nodes: &[TransactionNode]) -> Result<(), TransactionError> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in nodes {
            if node.id.as_str().is_empty() {
                return Err(TransactionError::MissingId);
            }
            if self.transactions.contains(&node.id) || !seen.insert(&node.id) {
                return Err(TransactionError::DuplicateTransaction(node.id.clone()));
            }
        }
        Ok(())
    }

    /// Ids of all loaded transactions, in load order.
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        self.transactions.ids()
    }

    pub fn transaction_registry(&self) -> &TransactionRegistry {
        &self.transactions
    }
}

impl Ledger for Book {
    type Invoice = InvoiceRecord;

    fn invoice_by_id(&self, id: &InvoiceId) -> Option<Arc<InvoiceRecord>> {
        self.invoice(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_invoice_keeps_existing_record() {
        let book = Book::new();
        let first = book.insert_invoice(InvoiceRecord::new("inv-1").with_number("0001"));
        first.add_transaction(&TransactionId::new("t1"));

        let second = book.insert_invoice(InvoiceRecord::new("inv-1").with_number("0002"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.number(), Some("0001"));
        assert_eq!(second.transaction_ids(), vec![TransactionId::new("t1")]);
        assert_eq!(book.invoice_count(), 1);
    }

    #[test]
    fn add_transaction_is_idempotent() {
        let invoice = InvoiceRecord::new("inv-1");
        invoice.add_transaction(&TransactionId::new("t1"));
        invoice.add_transaction(&TransactionId::new("t2"));
        invoice.add_transaction(&TransactionId::new("t1"));
        assert_eq!(
            invoice.transaction_ids(),
            vec![TransactionId::new("t1"), TransactionId::new("t2")]
        );
    }

    fn document(transaction_ids: &[&str]) -> Document {
        let node = |id: &str| TransactionNode {
            id: id.into(),
            num: None,
            description: String::new(),
            currency: crate::CommodityRef::currency("EUR"),
            date_posted: "2020-01-01 00:00:00 +0000".into(),
            date_entered: "2020-01-01 00:00:00 +0000".into(),
            slots: Some(crate::SlotTree::from_slots(vec![crate::Slot::frame(
                "gncInvoice",
                vec![crate::Slot::scalar("invoice-guid", "guid", "inv-1")],
            )])),
            splits: vec![],
        };
        Document {
            invoices: vec![InvoiceNode {
                id: InvoiceId::new("inv-1"),
                number: None,
            }],
            transactions: transaction_ids.iter().map(|id| node(*id)).collect(),
        }
    }

    #[test]
    fn rejected_document_leaves_book_untouched() {
        let book = Book::new();
        let result = book.load_document(document(&["t1", "t2", "t1"]));

        assert_eq!(
            result.err(),
            Some(TransactionError::DuplicateTransaction(TransactionId::new("t1")))
        );
        assert!(book.transaction_registry().is_empty());
        assert_eq!(book.invoice_count(), 0);
    }

    #[test]
    fn document_clashing_with_loaded_transaction_is_rejected_whole() {
        let book = Book::new();
        book.load_document(document(&["t1"])).unwrap();

        let result = book.load_document(document(&["t2", "t1"]));

        assert_eq!(
            result.err(),
            Some(TransactionError::DuplicateTransaction(TransactionId::new("t1")))
        );
        assert_eq!(book.transaction_ids(), vec![TransactionId::new("t1")]);
        let invoice = book.invoice(&InvoiceId::new("inv-1")).unwrap();
        assert_eq!(invoice.transaction_ids(), vec![TransactionId::new("t1")]);
    }

    #[test]
    fn document_with_empty_id_is_rejected_whole() {
        let book = Book::new();
        let result = book.load_document(document(&["t1", ""]));

        assert_eq!(result.err(), Some(TransactionError::MissingId));
        assert!(book.transaction_ids().is_empty());
    }

    #[test]
    fn invoice_by_id_misses_unknown_ids() {
        let book = Book::new();
        book.insert_invoice(InvoiceRecord::new("inv-1"));
        assert!(book.invoice_by_id(&InvoiceId::new("inv-1")).is_some());
        assert!(book.invoice_by_id(&InvoiceId::new("inv-2")).is_none());
    }

    #[test]
    fn invoice_record_from_node() {
        let record = InvoiceRecord::from(InvoiceNode {
            id: InvoiceId::new("inv-9"),
            number: Some("42".into()),
        });
        assert_eq!(record.id().as_str(), "inv-9");
        assert_eq!(record.number(), Some("42"));
        assert!(record.transaction_ids().is_empty());
    }
}
