// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry kernel capability consumed by the exporter.
//!
//! Geometric equivalence and periodic flattening belong to the geometry
//! kernel, not to the export engine, so both are injected through this
//! trait. [`NativeKernel`] delegates to the source model's own routines.

use egads_lite_topology::{BrepArena, GeomKey, GeometryData};

use crate::config::DEFAULT_EQUIVALENCE_TOLERANCE;

/// Geometry operations the exporter needs from a kernel.
pub trait GeometryKernel {
    /// Returns `true` when `a` and `b` describe the same geometry.
    fn is_same(
        &self,
        arena: &BrepArena,
        a: GeomKey,
        b: GeomKey,
    ) -> egads_lite_topology::Result<bool>;

    /// Returns an open, non-periodic equivalent of a periodic spline.
    ///
    /// The result is a temporary owned by the caller.
    fn flatten(&self, arena: &BrepArena, key: GeomKey)
        -> egads_lite_topology::Result<GeometryData>;
}

/// Kernel backed by the topology crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeKernel {
    pub tolerance: f64,
}

impl NativeKernel {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for NativeKernel {
    fn default() -> Self {
        Self::new(DEFAULT_EQUIVALENCE_TOLERANCE)
    }
}

impl GeometryKernel for NativeKernel {
    fn is_same(
        &self,
        arena: &BrepArena,
        a: GeomKey,
        b: GeomKey,
    ) -> egads_lite_topology::Result<bool> {
        arena.is_same_geometry(a, b, self.tolerance)
    }

    fn flatten(
        &self,
        arena: &BrepArena,
        key: GeomKey,
    ) -> egads_lite_topology::Result<GeometryData> {
        arena.flatten_geometry(key)
    }
}

impl<T: GeometryKernel + ?Sized> GeometryKernel for &T {
    fn is_same(
        &self,
        arena: &BrepArena,
        a: GeomKey,
        b: GeomKey,
    ) -> egads_lite_topology::Result<bool> {
        (**self).is_same(arena, a, b)
    }

    fn flatten(
        &self,
        arena: &BrepArena,
        key: GeomKey,
    ) -> egads_lite_topology::Result<GeometryData> {
        (**self).flatten(arena, key)
    }
}
