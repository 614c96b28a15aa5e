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

//! Transaction registry with deduplication.
//!
//! Assigns every loaded transaction a stable position in load order. Invoices
//! refer to transactions through these ids instead of holding the
//! transactions themselves.

use crate::TransactionError;
use crate::base::TransactionId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;

/// Registry of loaded transaction ids.
///
/// Combines a [`DashMap`] for O(1) duplicate checking with an ordered list
/// preserving load order.
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    /// Transaction id to load position.
    positions: DashMap<TransactionId, usize>,

    /// Ids in load order.
    order: Mutex<Vec<TransactionId>>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transaction id and returns its load position.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::DuplicateTransaction`] if the id is
    /// already registered.
    pub fn register(&self, id: &TransactionId) -> Result<usize, TransactionError> {
        // Entry API holds the shard lock across check-and-insert.
        match self.positions.entry(id.clone()) {
            Entry::Occupied(_) => Err(TransactionError::DuplicateTransaction(id.clone())),
            Entry::Vacant(entry) => {
                let mut order = self.order.lock();
                let position = order.len();
                order.push(id.clone());
                entry.insert(position);
                Ok(position)
            }
        }
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn position(&self, id: &TransactionId) -> Option<usize> {
        self.positions.get(id).map(|position| *position)
    }

    pub fn len(&self) -> usize {
        self.order.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all ids in load order.
    pub fn ids(&self) -> Vec<TransactionId> {
        self.order.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_positions_in_load_order() {
        let registry = TransactionRegistry::new();
        assert_eq!(registry.register(&TransactionId::new("b")), Ok(0));
        assert_eq!(registry.register(&TransactionId::new("a")), Ok(1));
        assert_eq!(registry.position(&TransactionId::new("a")), Some(1));
        assert_eq!(
            registry.ids(),
            vec![TransactionId::new("b"), TransactionId::new("a")]
        );
    }

    #[test]
    fn rejects_duplicates() {
        let registry = TransactionRegistry::new();
        let id = TransactionId::new("t1");
        registry.register(&id).unwrap();
        assert_eq!(
            registry.register(&id),
            Err(TransactionError::DuplicateTransaction(id.clone()))
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
    }

    #[test]
    fn starts_empty() {
        let registry = TransactionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.position(&TransactionId::new("x")), None);
    }
}
