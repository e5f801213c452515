// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-export working state.

use std::hash::Hash;

use egads_lite_topology::{BrepArena, ObjectClass, ObjectKey, SiblingList};

use crate::attrs::write_attributes;
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::kernel::GeometryKernel;
use crate::stream::ByteStream;

/// Everything one export call works with: the read-only source model, the
/// injected kernel and the output stream. Dedup maps are created per body
/// and passed alongside.
pub(crate) struct ExportContext<'a, K> {
    pub arena: &'a BrepArena,
    pub kernel: &'a K,
    pub stream: ByteStream,
}

impl<'a, K: GeometryKernel> ExportContext<'a, K> {
    pub fn new(arena: &'a BrepArena, kernel: &'a K, config: &ExportConfig) -> Result<Self> {
        Ok(Self {
            arena,
            kernel,
            stream: ByteStream::new(config)?,
        })
    }

    /// Writes the attribute table attached to `key`.
    pub fn write_object_attributes(&mut self, key: impl Into<ObjectKey>) -> Result<()> {
        let arena = self.arena;
        write_attributes(&mut self.stream, arena.attributes(key))
    }
}

/// Resolves the 1-based position of `key` in a body's sibling list.
pub(crate) fn sibling<T>(list: &SiblingList<T>, key: T, class: ObjectClass) -> Result<usize>
where
    T: Copy + Eq + Hash + Into<ObjectKey>,
{
    list.index_of(key).ok_or_else(|| Error::SiblingNotFound {
        class,
        key: key.into(),
    })
}
