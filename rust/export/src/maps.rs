// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-body geometry deduplication maps.
//!
//! Lookup checks identity first through a hash map, then falls back to the
//! kernel's equivalence predicate. A key matched by equivalence is recorded
//! as an alias so later lookups of the same key stay O(1).

use rustc_hash::FxHashMap;

use egads_lite_topology::{BrepArena, GeomKey, ObjectClass};

use crate::error::{Error, Result};
use crate::kernel::GeometryKernel;

/// One deduplication map holding geometry of a single class.
#[derive(Debug, Clone)]
pub struct GeometryMap {
    class: ObjectClass,
    items: Vec<GeomKey>,
    /// Key (including equivalence aliases) to 1-based index.
    identity: FxHashMap<GeomKey, usize>,
}

impl GeometryMap {
    pub fn new(class: ObjectClass) -> Self {
        Self {
            class,
            items: Vec::new(),
            identity: FxHashMap::default(),
        }
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    /// Registered objects in emission order.
    pub fn items(&self) -> &[GeomKey] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find<K: GeometryKernel>(
        &self,
        arena: &BrepArena,
        kernel: &K,
        key: GeomKey,
    ) -> Result<Option<usize>> {
        if let Some(&index) = self.identity.get(&key) {
            return Ok(Some(index));
        }
        for (i, &item) in self.items.iter().enumerate() {
            if kernel.is_same(arena, item, key)? {
                return Ok(Some(i + 1));
            }
        }
        Ok(None)
    }

    /// Returns the 1-based index of `key` or of an equivalent object.
    pub fn index_of<K: GeometryKernel>(
        &self,
        arena: &BrepArena,
        kernel: &K,
        key: GeomKey,
    ) -> Result<usize> {
        self.find(arena, kernel, key)?
            .ok_or(Error::GeometryNotFound {
                class: self.class,
                key,
            })
    }

    /// Adds `key` unless it or an equivalent object is present.
    ///
    /// Returns the 1-based index and whether a new entry was appended.
    pub fn register<K: GeometryKernel>(
        &mut self,
        arena: &BrepArena,
        kernel: &K,
        key: GeomKey,
    ) -> Result<(usize, bool)> {
        if let Some(index) = self.find(arena, kernel, key)? {
            self.identity.insert(key, index);
            return Ok((index, false));
        }
        self.items.push(key);
        let index = self.items.len();
        self.identity.insert(key, index);
        Ok((index, true))
    }
}

/// The three maps of one body export.
#[derive(Debug, Clone)]
pub struct GeometryMaps {
    pub pcurves: GeometryMap,
    pub curves: GeometryMap,
    pub surfaces: GeometryMap,
}

impl Default for GeometryMaps {
    fn default() -> Self {
        Self {
            pcurves: GeometryMap::new(ObjectClass::PCurve),
            curves: GeometryMap::new(ObjectClass::Curve),
            surfaces: GeometryMap::new(ObjectClass::Surface),
        }
    }
}

impl GeometryMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the map for a geometry class.
    pub fn for_class(&self, class: ObjectClass, mtype: i32) -> Result<&GeometryMap> {
        match class {
            ObjectClass::PCurve => Ok(&self.pcurves),
            ObjectClass::Curve => Ok(&self.curves),
            ObjectClass::Surface => Ok(&self.surfaces),
            other => Err(not_geometry(other, mtype)),
        }
    }

    pub fn for_class_mut(&mut self, class: ObjectClass, mtype: i32) -> Result<&mut GeometryMap> {
        match class {
            ObjectClass::PCurve => Ok(&mut self.pcurves),
            ObjectClass::Curve => Ok(&mut self.curves),
            ObjectClass::Surface => Ok(&mut self.surfaces),
            other => Err(not_geometry(other, mtype)),
        }
    }

    /// Counts in stream order: pcurves, curves, surfaces.
    pub fn counts(&self) -> [usize; 3] {
        [self.pcurves.len(), self.curves.len(), self.surfaces.len()]
    }
}

fn not_geometry(class: ObjectClass, mtype: i32) -> Error {
    Error::GeometryFormat {
        class,
        mtype,
        reason: "not a geometry class".into(),
    }
}
