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

//! Parsed document nodes.
//!
//! These are the shapes handed over by the document parser. They are plain
//! data: all interpretation (date parsing, balance, invoice linkage) lives in
//! [`Transaction`](crate::Transaction).

use crate::base::{InvoiceId, TransactionId};
use crate::slot::SlotTree;
use crate::split::SplitNode;
use serde::{Deserialize, Serialize};

/// Reference to the commodity a transaction is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommodityRef {
    /// Namespace, e.g. `ISO4217` for currencies or `FUND` for funds.
    pub space: String,
    /// Symbol within the namespace, e.g. `EUR`.
    pub id: String,
}

impl CommodityRef {
    /// Namespace used by ISO 4217 currencies.
    pub const CURRENCY_NAMESPACE: &'static str = "ISO4217";

    pub fn new(space: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            id: id.into(),
        }
    }

    pub fn currency(code: impl Into<String>) -> Self {
        Self::new(Self::CURRENCY_NAMESPACE, code)
    }

    pub fn is_currency(&self) -> bool {
        self.space == Self::CURRENCY_NAMESPACE
    }
}

/// A transaction as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionNode {
    pub id: TransactionId,
    /// Free-form transaction number (cheque number etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<String>,
    #[serde(default)]
    pub description: String,
    pub currency: CommodityRef,
    /// `yyyy-MM-dd HH:mm:ss Z`
    pub date_posted: String,
    /// `yyyy-MM-dd HH:mm:ss Z`
    pub date_entered: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<SlotTree>,
    #[serde(default)]
    pub splits: Vec<SplitNode>,
}

/// An invoice as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNode {
    pub id: InvoiceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

/// The subset of a parsed ledger document this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub invoices: Vec<InvoiceNode>,
    #[serde(default)]
    pub transactions: Vec<TransactionNode>,
}
