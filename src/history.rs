// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Perimeter-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Perimeter and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undo/redo history for the geometry of one edit session.

use crate::model::Geometry;

/// Linear snapshot stack with a cursor at the materialized geometry.
///
/// Always holds at least the seed entry, so `current()` is total.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeHistory {
    entries: Vec<Geometry>,
    cursor: usize,
    limit: Option<usize>,
}

impl ShapeHistory {
    pub fn new(seed: Geometry) -> Self {
        Self {
            entries: vec![seed],
            cursor: 0,
            limit: None,
        }
    }

    /// Caps the number of retained entries; the oldest are dropped first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|limit| limit.max(1));
        self.enforce_limit();
        self
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> &Geometry {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Discards the redo branch, appends, and moves the cursor to the new entry.
    pub fn push(&mut self, geometry: Geometry) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(geometry);
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();
    }

    /// Geometry `undo` would move to, without moving.
    pub fn peek_undo(&self) -> Option<&Geometry> {
        if !self.can_undo() {
            return None;
        }
        self.entries.get(self.cursor - 1)
    }

    /// Geometry `redo` would move to, without moving.
    pub fn peek_redo(&self) -> Option<&Geometry> {
        if !self.can_redo() {
            return None;
        }
        self.entries.get(self.cursor + 1)
    }

    pub fn undo(&mut self) -> Option<&Geometry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&Geometry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.entries.len() <= limit {
            return;
        }
        let overflow = self.entries.len() - limit;
        self.entries.drain(..overflow);
        self.cursor = self.cursor.saturating_sub(overflow);
    }
}
