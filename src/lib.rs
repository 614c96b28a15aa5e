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

//! # Ledger Reader
//!
//! This library rebuilds double-entry transactions from an already-parsed
//! ledger document and answers balance, date, ordering and invoice queries
//! about them.
//!
//! ## Core Components
//!
//! - [`Transaction`]: Read-model over one transaction node, with lazily cached splits and dates
//! - [`FixedPointDecimal`]: Exact decimal used for every amount
//! - [`SlotTree`]: Schema-free key/value metadata attached to a transaction
//! - [`Book`]: In-memory [`Ledger`] resolving invoices and tracking loaded transactions
//! - [`TransactionError`]: Error types for malformed data and contract violations
//!
//! ## Example
//!
//! ```
//! use ledger_reader_rs::{Book, CommodityRef, SplitNode, TransactionNode};
//!
//! let book = Book::new();
//! let node = TransactionNode {
//!     id: "t1".into(),
//!     num: None,
//!     description: "Groceries".into(),
//!     currency: CommodityRef::currency("EUR"),
//!     date_posted: "2001-09-18 00:00:00 +0200".into(),
//!     date_entered: "2001-09-18 12:30:00 +0200".into(),
//!     slots: None,
//!     splits: vec![
//!         SplitNode {
//!             id: "s1".into(),
//!             value: "4250/100".parse().unwrap(),
//!             quantity: None,
//!             account: "expenses:food".into(),
//!             memo: None,
//!         },
//!         SplitNode {
//!             id: "s2".into(),
//!             value: "-4250/100".parse().unwrap(),
//!             quantity: None,
//!             account: "assets:checking".into(),
//!             memo: None,
//!         },
//!     ],
//! };
//!
//! let transaction = book.load_transaction(node).unwrap();
//! assert!(transaction.is_balanced().unwrap());
//! assert_eq!(transaction.first_split().unwrap().value().to_string(), "42.50");
//! ```
//!
//! ## Thread Safety
//!
//! [`Book`] may be shared across threads. A [`Transaction`] fills its caches
//! on first access without locking and is therefore `!Sync`.

mod base;
pub mod decimal;
pub mod error;
pub mod ledger;
pub mod node;
mod registry;
pub mod slot;
mod split;
pub mod timestamp;
mod transaction;

pub use base::{AccountId, InvoiceId, SplitId, TransactionId};
pub use decimal::FixedPointDecimal;
pub use error::{DecimalError, TransactionError};
pub use ledger::{Book, Invoice, InvoiceRecord, Ledger};
pub use node::{CommodityRef, Document, InvoiceNode, TransactionNode};
pub use registry::TransactionRegistry;
pub use slot::{Slot, SlotTree, SlotValue};
pub use split::{Split, SplitNode};
pub use timestamp::{Timestamp, parse_timestamp};
pub use transaction::{Transaction, sort_newest_first, sort_oldest_first};
