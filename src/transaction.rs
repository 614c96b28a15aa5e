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

//! Transaction read-model.
//!
//! A [`Transaction`] wraps one [`TransactionNode`] of a loaded document and
//! answers balance, date, split and invoice queries about it.
//!
//! Derived values are filled in lazily and then kept:
//! - the split list, materialized once from the node;
//! - `date-posted` and `date-entered`, each parsed on first access.
//!
//! The caches are `OnceCell`s, so a `Transaction` is `!Sync`. Force them on
//! one thread before handing a transaction to another.
//!
//! # Ordering
//!
//! [`Transaction::compare`] puts the most recently posted transaction first.
//! Comparisons never fail: a transaction whose dates cannot be parsed compares
//! equal to anything.

use crate::base::{InvoiceId, SplitId, TransactionId};
use crate::decimal::FixedPointDecimal;
use crate::error::TransactionError;
use crate::ledger::{Book, Invoice, Ledger};
use crate::node::{CommodityRef, TransactionNode};
use crate::slot::SlotTree;
use crate::split::Split;
use crate::timestamp::{DateField, TIMESTAMP_FORMAT, Timestamp, TimestampCache};
use std::cell::OnceCell;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, warn};

static EMPTY_SLOTS: SlotTree = SlotTree::new();

/// A ledger transaction: a set of splits that should sum to zero.
pub struct Transaction<'a, L: Ledger + ?Sized = Book> {
    node: TransactionNode,
    ledger: &'a L,
    splits: OnceCell<Vec<Split>>,
    date_posted: TimestampCache,
    date_entered: TimestampCache,
}

impl<'a, L: Ledger + ?Sized> Transaction<'a, L> {
    /// Builds the read-model for `node` and links it to its invoices.
    ///
    /// A node without slots gets an empty slot tree attached. Every invoice
    /// referenced from the slots and known to `ledger` is told about this
    /// transaction; unknown invoice ids are logged and skipped.
    ///
    /// This does not register the id anywhere, so duplicates go unnoticed.
    /// With a [`Book`], load through [`Book::load_transaction`] instead.
    ///
    /// # Errors
    ///
    /// [`TransactionError::MissingId`] if the node has an empty id.
    pub fn new(mut node: TransactionNode, ledger: &'a L) -> Result<Self, TransactionError> {
        if node.id.as_str().is_empty() {
            return Err(TransactionError::MissingId);
        }
        node.slots.get_or_insert_with(SlotTree::new);

        let transaction = Self {
            node,
            ledger,
            splits: OnceCell::new(),
            date_posted: TimestampCache::new(),
            date_entered: TimestampCache::new(),
        };
        for invoice in transaction.invoices() {
            debug!(transaction = %transaction.id(), invoice = %invoice.id(), "linking transaction to invoice");
            invoice.add_transaction(transaction.id());
        }
        Ok(transaction)
    }

    pub fn id(&self) -> &TransactionId {
        &self.node.id
    }

    pub fn description(&self) -> &str {
        &self.node.description
    }

    /// Free-form transaction number, if the document has one.
    pub fn transaction_number(&self) -> Option<&str> {
        self.node.num.as_deref()
    }

    pub fn currency(&self) -> &CommodityRef {
        &self.node.currency
    }

    /// E.g. `ISO4217` for currencies.
    pub fn currency_namespace(&self) -> &str {
        &self.node.currency.space
    }

    pub fn currency_id(&self) -> &str {
        &self.node.currency.id
    }

    /// The ledger this transaction was loaded from.
    pub fn ledger(&self) -> &'a L {
        self.ledger
    }

    /// The source node, with an empty slot tree attached if it had none.
    pub fn node(&self) -> &TransactionNode {
        &self.node
    }

    pub fn slots(&self) -> &SlotTree {
        self.node.slots.as_ref().unwrap_or(&EMPTY_SLOTS)
    }

    // === Splits ===

    /// Splits in document order.
    ///
    /// Materialized on first call; later calls return the same list.
    pub fn splits(&self) -> &[Split] {
        self.splits.get_or_init(|| {
            self.node
                .splits
                .iter()
                .map(|node| Split::new(node, &self.node.id))
                .collect()
        })
    }

    pub fn split_count(&self) -> usize {
        self.splits().len()
    }

    pub fn split_by_id(&self, id: &SplitId) -> Option<&Split> {
        self.splits().iter().find(|split| split.id() == id)
    }

    /// # Errors
    ///
    /// [`TransactionError::NotEnoughSplits`] if the transaction has no splits.
    pub fn first_split(&self) -> Result<&Split, TransactionError> {
        self.split_at(0)
    }

    /// # Errors
    ///
    /// [`TransactionError::NotEnoughSplits`] if the transaction has fewer than two splits.
    pub fn second_split(&self) -> Result<&Split, TransactionError> {
        self.split_at(1)
    }

    fn split_at(&self, index: usize) -> Result<&Split, TransactionError> {
        let splits = self.splits();
        splits.get(index).ok_or_else(|| TransactionError::NotEnoughSplits {
            transaction: self.id().clone(),
            required: index + 1,
            found: splits.len(),
        })
    }

    // === Balance ===

    /// Exact sum of all split values, in the transaction's currency.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InexactBalance`] if a partial sum overflows or
    /// would have to be rounded.
    pub fn balance(&self) -> Result<FixedPointDecimal, TransactionError> {
        self.splits()
            .iter()
            .try_fold(FixedPointDecimal::ZERO, |total, split| total.checked_add(split.value()))
            .ok_or_else(|| TransactionError::InexactBalance(self.id().clone()))
    }

    /// # Errors
    ///
    /// See [`Transaction::balance`].
    pub fn is_balanced(&self) -> Result<bool, TransactionError> {
        Ok(self.balance()?.is_zero())
    }

    /// The balance multiplied by exactly `-1`.
    ///
    /// # Errors
    ///
    /// See [`Transaction::balance`].
    pub fn negated_balance(&self) -> Result<FixedPointDecimal, TransactionError> {
        self.balance()?
            .checked_mul(FixedPointDecimal::MINUS_ONE)
            .ok_or_else(|| TransactionError::InexactBalance(self.id().clone()))
    }

    // === Invoices ===

    /// Ids of the invoices this transaction was posted for.
    ///
    /// Read from the slot tree on every call.
    pub fn invoice_ids(&self) -> Vec<InvoiceId> {
        self.slots()
            .find_invoice_references()
            .into_iter()
            .map(InvoiceId::from)
            .collect()
    }

    /// The invoices this transaction was posted for, as resolved by the ledger.
    ///
    /// Ids the ledger does not know are logged and left out.
    pub fn invoices(&self) -> Vec<Arc<L::Invoice>> {
        let ids = self.invoice_ids();
        let mut invoices = Vec::with_capacity(ids.len());
        for id in ids {
            match self.ledger.invoice_by_id(&id) {
                Some(invoice) => invoices.push(invoice),
                None => warn!(
                    transaction = %self.id(),
                    description = self.description(),
                    invoice = %id,
                    "no invoice with this id"
                ),
            }
        }
        invoices
    }

    // === Dates ===

    /// When the transaction happened. Parsed on first access.
    ///
    /// # Errors
    ///
    /// [`TransactionError::UnparsableDate`] if the stored string is malformed.
    pub fn date_posted(&self) -> Result<Timestamp, TransactionError> {
        self.date_posted
            .get_or_parse(&self.node.date_posted, DateField::Posted, &self.node.id)
    }

    /// When the transaction was recorded. Parsed on first access.
    ///
    /// # Errors
    ///
    /// [`TransactionError::UnparsableDate`] if the stored string is malformed.
    pub fn date_entered(&self) -> Result<Timestamp, TransactionError> {
        self.date_entered
            .get_or_parse(&self.node.date_entered, DateField::Entered, &self.node.id)
    }

    /// Posted date as `YYYY-MM-DD`, in the offset it was recorded with.
    pub fn date_posted_formatted(&self) -> Result<String, TransactionError> {
        Ok(self.date_posted()?.format("%Y-%m-%d").to_string())
    }

    // === Ordering ===

    /// Orders by posted date, then entered date, latest first.
    ///
    /// Dates are compared `other` to `self`, so sorting with this comparator
    /// yields descending order. If a date cannot be parsed the two
    /// transactions compare [`Ordering::Equal`]; the failure is only logged.
    pub fn compare(&self, other: &Self) -> Ordering {
        compare_dates(other, self).unwrap_or_else(|error| {
            debug!(%error, "treating transactions as equal");
            Ordering::Equal
        })
    }

    /// Like [`compare`](Self::compare) but oldest first.
    pub fn compare_chronological(&self, other: &Self) -> Ordering {
        compare_dates(self, other).unwrap_or_else(|error| {
            debug!(%error, "treating transactions as equal");
            Ordering::Equal
        })
    }

    /// `(posted, entered)`, or `None` if either date is malformed.
    fn sort_key(&self) -> Option<(Timestamp, Timestamp)> {
        Some((self.date_posted().ok()?, self.date_entered().ok()?))
    }
}

/// Compares `a` to `b` by posted date, then entered date.
///
/// The entered dates are only read when the posted dates tie.
fn compare_dates<L: Ledger + ?Sized>(
    a: &Transaction<'_, L>,
    b: &Transaction<'_, L>,
) -> Result<Ordering, TransactionError> {
    let posted = a.date_posted()?.cmp(&b.date_posted()?);
    if posted != Ordering::Equal {
        return Ok(posted);
    }
    Ok(a.date_entered()?.cmp(&b.date_entered()?))
}

/// Sorts latest first, the order [`Transaction::compare`] produces.
///
/// Stable. Transactions with malformed dates are moved to the end instead
/// of comparing equal, which keeps the sort a total order.
pub fn sort_newest_first<L: Ledger + ?Sized>(transactions: &mut [Transaction<'_, L>]) {
    transactions.sort_by_key(|transaction| Reverse(transaction.sort_key()));
}

/// Sorts oldest first. Transactions with malformed dates go last.
pub fn sort_oldest_first<L: Ledger + ?Sized>(transactions: &mut [Transaction<'_, L>]) {
    transactions.sort_by_key(|transaction| {
        let key = transaction.sort_key();
        (key.is_none(), key)
    });
}

impl<L: Ledger + ?Sized> PartialEq for Transaction<'_, L> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<L: Ledger + ?Sized> Eq for Transaction<'_, L> {}

impl<L: Ledger + ?Sized> Hash for Transaction<'_, L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<L: Ledger + ?Sized> fmt::Debug for Transaction<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", self.id())
            .field("description", &self.description())
            .field("currency", self.currency())
            .field("splits", &self.splits.get().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl<L: Ledger + ?Sized> fmt::Display for Transaction<'_, L> {
    /// Never fails on bad data: a malformed entered date renders as `ERROR '...'`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Transaction: id: {} description: {} #splits: {} dateEntered: ",
            self.id(),
            self.description(),
            self.split_count()
        )?;
        match self.date_entered() {
            Ok(entered) => write!(f, "{}", entered.format(TIMESTAMP_FORMAT))?,
            Err(error) => {
                debug!(%error, "rendering transaction without entered date");
                write!(f, "ERROR '{error}'")?;
            }
        }
        f.write_str("]")
    }
}
