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

//! Ledger collaborator integration tests: invoice linkage and loading.

use ledger_reader_rs::{
    Book, CommodityRef, Document, Invoice, InvoiceId, InvoiceNode, InvoiceRecord, Ledger, Slot,
    SlotTree, Transaction, TransactionError, TransactionId, TransactionNode,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

fn make_node(id: &str, invoice_guids: &[&str]) -> TransactionNode {
    let slots = invoice_guids
        .iter()
        .map(|guid| Slot::frame("gncInvoice", vec![Slot::scalar("invoice-guid", "guid", *guid)]))
        .collect();
    TransactionNode {
        id: id.into(),
        num: None,
        description: String::new(),
        currency: CommodityRef::currency("USD"),
        date_posted: "2024-05-01 00:00:00 -0400".into(),
        date_entered: "2024-05-01 08:00:00 -0400".into(),
        slots: Some(SlotTree::from_slots(slots)),
        splits: vec![],
    }
}

// === Book ===

#[test]
fn load_links_transaction_to_each_resolved_invoice() {
    let book = Book::new();
    let first = book.insert_invoice(InvoiceRecord::new("inv-1"));
    let second = book.insert_invoice(InvoiceRecord::new("inv-2"));

    book.load_transaction(make_node("t1", &["inv-1", "inv-2"]))
        .unwrap();
    book.load_transaction(make_node("t2", &["inv-2"])).unwrap();

    assert_eq!(first.transaction_ids(), vec![TransactionId::new("t1")]);
    assert_eq!(
        second.transaction_ids(),
        vec![TransactionId::new("t1"), TransactionId::new("t2")]
    );
}

#[test]
fn unresolved_invoice_is_skipped_and_the_rest_still_link() {
    let book = Book::new();
    let known = book.insert_invoice(InvoiceRecord::new("known"));

    let transaction = book
        .load_transaction(make_node("t1", &["ghost", "known"]))
        .unwrap();

    let resolved: Vec<_> = transaction
        .invoices()
        .iter()
        .map(|invoice| invoice.id().clone())
        .collect();
    assert_eq!(resolved, vec![InvoiceId::new("known")]);
    assert_eq!(known.transaction_ids(), vec![TransactionId::new("t1")]);
}

#[test]
fn duplicate_transaction_id_is_rejected() {
    let book = Book::new();
    book.load_transaction(make_node("t1", &[])).unwrap();

    let result = book.load_transaction(make_node("t1", &[]));
    assert_eq!(
        result.unwrap_err(),
        TransactionError::DuplicateTransaction(TransactionId::new("t1"))
    );
    assert_eq!(book.transaction_ids(), vec![TransactionId::new("t1")]);
}

#[test]
fn empty_transaction_id_is_rejected_before_registration() {
    let book = Book::new();
    let result = book.load_transaction(make_node("", &[]));
    assert_eq!(result.unwrap_err(), TransactionError::MissingId);
    assert!(book.transaction_registry().is_empty());
}

#[test]
fn load_document_inserts_invoices_first() {
    let book = Book::new();
    let document = Document {
        invoices: vec![InvoiceNode {
            id: InvoiceId::new("inv-1"),
            number: Some("2024-001".into()),
        }],
        transactions: vec![make_node("t1", &["inv-1"]), make_node("t2", &[])],
    };

    let transactions = book.load_document(document).unwrap();

    assert_eq!(transactions.len(), 2);
    let invoice = book.invoice(&InvoiceId::new("inv-1")).unwrap();
    assert_eq!(invoice.number(), Some("2024-001"));
    assert_eq!(invoice.transaction_ids(), vec![TransactionId::new("t1")]);
    assert_eq!(
        book.transaction_ids(),
        vec![TransactionId::new("t1"), TransactionId::new("t2")]
    );
}

// === Custom ledgers ===

#[derive(Debug)]
struct CountingInvoice {
    id: InvoiceId,
    links: Mutex<Vec<TransactionId>>,
}

impl Invoice for CountingInvoice {
    fn id(&self) -> &InvoiceId {
        &self.id
    }

    fn add_transaction(&self, transaction: &TransactionId) {
        self.links.lock().push(transaction.clone());
    }
}

#[derive(Debug, Default)]
struct MapLedger {
    invoices: HashMap<InvoiceId, Arc<CountingInvoice>>,
}

impl Ledger for MapLedger {
    type Invoice = CountingInvoice;

    fn invoice_by_id(&self, id: &InvoiceId) -> Option<Arc<CountingInvoice>> {
        self.invoices.get(id).cloned()
    }
}

#[test]
fn any_ledger_implementation_receives_registrations() {
    let invoice = Arc::new(CountingInvoice {
        id: InvoiceId::new("inv-1"),
        links: Mutex::new(Vec::new()),
    });
    let mut ledger = MapLedger::default();
    ledger.invoices.insert(invoice.id.clone(), Arc::clone(&invoice));

    // Referenced twice: registration happens once per resolved reference.
    let transaction = Transaction::new(make_node("t1", &["inv-1", "inv-1"]), &ledger).unwrap();

    assert_eq!(transaction.invoices().len(), 2);
    assert_eq!(
        *invoice.links.lock(),
        vec![TransactionId::new("t1"), TransactionId::new("t1")]
    );
}
