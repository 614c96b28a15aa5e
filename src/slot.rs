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

//! Schema-free key/value metadata ("slots").
//!
//! Any entity in a ledger document may carry a tree of slots. A slot value is
//! either a typed scalar or a frame of nested slots, and the kind of every
//! value is declared on its own, independently of the parent.
//!
//! Readers only ever pick out the shapes they understand. Anything else,
//! including slots that reuse a known key with an unexpected shape, is
//! ignored rather than rejected.
//!
//! # Example
//!
//! ```
//! use ledger_reader_rs::{Slot, SlotTree};
//!
//! let tree = SlotTree::from_slots(vec![Slot::frame(
//!     "gncInvoice",
//!     vec![Slot::scalar("invoice-guid", "guid", "abc-123")],
//! )]);
//! assert_eq!(tree.find_invoice_references(), vec!["abc-123".to_string()]);
//! ```

use serde::{Deserialize, Serialize};

/// Key of the frame linking a transaction to the invoice it was posted for.
pub const INVOICE_SLOT_KEY: &str = "gncInvoice";

/// Key of the invoice id inside an [`INVOICE_SLOT_KEY`] frame.
pub const INVOICE_GUID_KEY: &str = "invoice-guid";

/// Scalar kind carrying an entity GUID.
pub const GUID_KIND: &str = "guid";

/// A single keyed entry of a slot tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Not unique among siblings.
    pub key: String,
    pub value: SlotValue,
}

/// Value of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotValue {
    /// Leaf value; `kind` is the declared type (`"string"`, `"guid"`, `"numeric"`, ...).
    Scalar { kind: String, content: String },
    /// Ordered nested slots.
    Frame(Vec<Slot>),
}

impl Slot {
    pub fn scalar(key: impl Into<String>, kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: SlotValue::Scalar {
                kind: kind.into(),
                content: content.into(),
            },
        }
    }

    pub fn frame(key: impl Into<String>, children: Vec<Slot>) -> Self {
        Self {
            key: key.into(),
            value: SlotValue::Frame(children),
        }
    }
}

impl SlotValue {
    /// `(kind, content)` for scalars.
    pub fn as_scalar(&self) -> Option<(&str, &str)> {
        match self {
            Self::Scalar { kind, content } => Some((kind, content)),
            Self::Frame(_) => None,
        }
    }

    pub fn as_frame(&self) -> Option<&[Slot]> {
        match self {
            Self::Frame(children) => Some(children),
            Self::Scalar { .. } => None,
        }
    }
}

/// Ordered top-level slots of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotTree {
    slots: Vec<Slot>,
}

impl SlotTree {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn push(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// First top-level slot with `key`.
    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.key == key)
    }

    /// Follows a `/`-separated key path through nested frames.
    ///
    /// Each segment takes the first sibling with that key. Returns `None` as
    /// soon as a segment is missing or an intermediate value is not a frame.
    pub fn lookup(&self, path: &str) -> Option<&SlotValue> {
        let mut segments = path.split('/');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current
                .value
                .as_frame()?
                .iter()
                .find(|slot| slot.key == segment)?;
        }
        Some(&current.value)
    }

    /// Invoice ids recorded in top-level `gncInvoice` frames, in document
    /// order. Duplicates are kept.
    ///
    /// A frame only counts when its first child is an `invoice-guid` scalar of
    /// kind `guid`. Every other shape is skipped without a diagnostic.
    pub fn find_invoice_references(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|slot| slot.key == INVOICE_SLOT_KEY)
            .filter_map(invoice_guid)
            .map(str::to_owned)
            .collect()
    }
}

fn invoice_guid(slot: &Slot) -> Option<&str> {
    let first = slot.value.as_frame()?.first()?;
    if first.key != INVOICE_GUID_KEY {
        return None;
    }
    match first.value.as_scalar()? {
        (GUID_KIND, content) => Some(content),
        _ => None,
    }
}

impl<'a> IntoIterator for &'a SlotTree {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
