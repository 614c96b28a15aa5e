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

//! Transaction splits.
//!
//! A split is one debit/credit leg of a transaction. Its `value` is expressed
//! in the transaction's currency; `quantity` is in the commodity of the
//! account it posts to and only differs for cross-commodity transfers.

use crate::base::{AccountId, SplitId, TransactionId};
use crate::decimal::FixedPointDecimal;
use serde::{Deserialize, Serialize};

/// A split as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SplitNode {
    pub id: SplitId,
    pub value: FixedPointDecimal,
    /// Defaults to `value` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FixedPointDecimal>,
    pub account: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// One leg of a [`Transaction`](crate::Transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    id: SplitId,
    transaction: TransactionId,
    account: AccountId,
    value: FixedPointDecimal,
    quantity: FixedPointDecimal,
    memo: Option<String>,
}

impl Split {
    /// Builds the split for `node`, owned by the transaction `owner`.
    pub fn new(node: &SplitNode, owner: &TransactionId) -> Self {
        Self {
            id: node.id.clone(),
            transaction: owner.clone(),
            account: node.account.clone(),
            value: node.value,
            quantity: node.quantity.unwrap_or(node.value),
            memo: node.memo.clone(),
        }
    }

    pub fn id(&self) -> &SplitId {
        &self.id
    }

    /// Id of the owning transaction.
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account
    }

    /// Amount in the transaction's currency.
    pub fn value(&self) -> FixedPointDecimal {
        self.value
    }

    /// Amount in the account's commodity.
    pub fn quantity(&self) -> FixedPointDecimal {
        self.quantity
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}
