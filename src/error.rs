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

//! Error types for reading transactions and decimal values.

use crate::base::TransactionId;
use crate::timestamp::DateField;
use thiserror::Error;

/// Transaction read-model errors.
///
/// All of these are data-integrity or contract violations: they identify the
/// offending transaction and are not meant to be recovered from locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Transaction node carries no id
    #[error("transaction node has an empty id")]
    MissingId,

    /// Transaction id was already registered with the ledger
    #[error("duplicate transaction id '{0}'")]
    DuplicateTransaction(TransactionId),

    /// Timestamp string does not match `yyyy-MM-dd HH:mm:ss Z`
    #[error("unparsable date '{raw}' in {field} of transaction with id='{transaction}'")]
    UnparsableDate {
        field: DateField,
        raw: String,
        transaction: TransactionId,
        #[source]
        source: chrono::ParseError,
    },

    /// Split values whose sum overflows or needs more than 28 significant digits
    #[error("balance of transaction with id='{0}' cannot be represented exactly")]
    InexactBalance(TransactionId),

    /// Positional split access below the available split count
    #[error("transaction with id='{transaction}' has {found} split(s), at least {required} required")]
    NotEnoughSplits {
        transaction: TransactionId,
        required: usize,
        found: usize,
    },
}

/// Errors constructing a [`FixedPointDecimal`](crate::FixedPointDecimal) from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// Not a decimal number or `num/denom` fraction
    #[error("invalid decimal literal '{0}'")]
    Invalid(String),

    /// Fraction with a zero denominator
    #[error("zero denominator in '{0}'")]
    ZeroDenominator(String),

    /// Fraction whose quotient cannot be held exactly
    #[error("fraction '{0}' is not exactly representable")]
    Inexact(String),
}
