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

//! Document timestamps.
//!
//! Dates are stored as `yyyy-MM-dd HH:mm:ss Z`, for example
//! `2001-09-18 00:00:00 +0200`. The explicit offset is kept: two timestamps
//! naming the same instant in different zones compare equal but render
//! differently.

use crate::base::TransactionId;
use crate::error::TransactionError;
use chrono::{DateTime, FixedOffset};
use std::cell::OnceCell;
use std::fmt;

/// `chrono` pattern for document timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A timestamp with the UTC offset it was written with.
pub type Timestamp = DateTime<FixedOffset>;

/// Which of a transaction's two dates is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Posted,
    Entered,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posted => f.write_str("date-posted"),
            Self::Entered => f.write_str("date-entered"),
        }
    }
}

/// Parses a document timestamp.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
}

/// Parse-once cell for a single timestamp field.
///
/// The first successful parse is kept for the life of the cell. Failures are
/// not cached, so every access to a broken field reports the same error.
///
/// Not thread-safe: the cell is `!Sync`, so concurrent first access is
/// rejected at compile time.
#[derive(Debug, Default)]
pub struct TimestampCache {
    cell: OnceCell<Timestamp>,
}

impl TimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value, if a parse already succeeded.
    pub fn get(&self) -> Option<Timestamp> {
        self.cell.get().copied()
    }

    /// Returns the cached timestamp, parsing `raw` on first access.
    ///
    /// # Errors
    ///
    /// [`TransactionError::UnparsableDate`] naming `raw`, `field` and `transaction`.
    pub fn get_or_parse(
        &self,
        raw: &str,
        field: DateField,
        transaction: &TransactionId,
    ) -> Result<Timestamp, TransactionError> {
        if let Some(parsed) = self.cell.get() {
            return Ok(*parsed);
        }
        let parsed = parse_timestamp(raw).map_err(|source| TransactionError::UnparsableDate {
            field,
            raw: raw.to_owned(),
            transaction: transaction.clone(),
            source,
        })?;
        Ok(*self.cell.get_or_init(|| parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_date_time_and_offset() {
        let parsed = parse_timestamp("2001-09-18 00:00:00 +0200").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2001, 9, 18));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (0, 0, 0));
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn negative_offsets_are_kept() {
        let parsed = parse_timestamp("2020-02-29 23:59:59 -0530").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn missing_offset_is_rejected() {
        assert!(parse_timestamp("2001-09-18 00:00:00").is_err());
        assert!(parse_timestamp("not-a-date").is_err());
    }

    #[test]
    fn trailing_padding_is_rejected() {
        assert!(parse_timestamp("2001-09-18 00:00:00 +0200 ").is_err());
        assert!(parse_timestamp("2001-09-18 00:00:00 +0200\n").is_err());
    }

    #[test]
    fn cache_parses_once_and_keeps_value() {
        let cache = TimestampCache::new();
        let id = TransactionId::new("t1");
        assert_eq!(cache.get(), None);

        let first = cache
            .get_or_parse("2001-09-18 00:00:00 +0200", DateField::Posted, &id)
            .unwrap();
        // Raw value is ignored once filled.
        let second = cache.get_or_parse("garbage", DateField::Posted, &id).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.get(), Some(first));
    }

    #[test]
    fn failure_reports_raw_value_and_is_not_cached() {
        let cache = TimestampCache::new();
        let id = TransactionId::new("t1");

        let error = cache
            .get_or_parse("not-a-date", DateField::Entered, &id)
            .unwrap_err();
        assert!(error.to_string().contains("'not-a-date'"));
        assert!(error.to_string().contains("id='t1'"));
        assert_eq!(cache.get(), None);

        let retry = cache.get_or_parse("not-a-date", DateField::Entered, &id);
        assert_eq!(retry, Err(error));
    }
}
