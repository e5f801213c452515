// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry record writer.
//!
//! Record layout: `mtype`, basis reference, `nInt`, `nReal`, the integer
//! vector and the real vector. Periodic splines are replaced by a flattened
//! temporary from the kernel before anything is written.

use std::borrow::Cow;

use egads_lite_topology::geometry::{FLAG_FLATTENED, FLAG_PERIODIC, FLAG_V_PERIODIC};
use egads_lite_topology::{GeomKey, GeometryData, ObjectClass};
use tracing::debug;

use crate::context::ExportContext;
use crate::error::{Error, Result};
use crate::kernel::GeometryKernel;
use crate::maps::GeometryMaps;

fn format_error(geom: &GeometryData, reason: impl ToString) -> Error {
    Error::GeometryFormat {
        class: geom.class,
        mtype: geom.mtype,
        reason: reason.to_string(),
    }
}

impl<'a, K: GeometryKernel> ExportContext<'a, K> {
    /// Returns the data to emit for `key`: the stored object, or an owned
    /// flattened copy when it is periodic.
    fn emitted_geometry(&self, key: GeomKey) -> Result<Cow<'a, GeometryData>> {
        let arena: &'a _ = self.arena;
        let geom = arena.geometry(key)?;
        if !geom.is_periodic() {
            return Ok(Cow::Borrowed(geom));
        }

        let mut flat = self.kernel.flatten(arena, key)?;
        if let Some(flags) = flat.ints.first_mut() {
            *flags = (*flags & !(FLAG_PERIODIC | FLAG_V_PERIODIC)) | FLAG_FLATTENED;
        }
        debug!(
            class = %geom.class,
            ints = flat.ints.len(),
            reals = flat.reals.len(),
            "flattened periodic spline"
        );
        Ok(Cow::Owned(flat))
    }

    /// Signed basis reference: 0 without basis, `+i` within the object's
    /// own class, `-i` for a surface built on a curve.
    fn basis_reference(&self, maps: &GeometryMaps, geom: &GeometryData) -> Result<i32> {
        let Some(basis) = geom.basis else {
            return Ok(0);
        };
        let basis_geom = self.arena.geometry(basis)?;
        let index = maps
            .for_class(basis_geom.class, basis_geom.mtype)?
            .index_of(self.arena, self.kernel, basis)?;
        let index = i32::try_from(index).map_err(|_| Error::Overflow(index))?;
        if geom.class == ObjectClass::Surface && basis_geom.class == ObjectClass::Curve {
            Ok(-index)
        } else {
            Ok(index)
        }
    }

    /// Writes one geometry record.
    pub(crate) fn write_geometry(&mut self, maps: &GeometryMaps, key: GeomKey) -> Result<()> {
        let data = self.emitted_geometry(key)?;
        data.layout().map_err(|e| format_error(&data, e))?;
        let reference = self.basis_reference(maps, &data)?;

        // a flattened temporary is released when `data` drops, on every path
        let stream = &mut self.stream;
        stream.write_i32(data.mtype)?;
        stream.write_i32(reference)?;
        stream.write_count(data.ints.len())?;
        stream.write_count(data.reals.len())?;
        stream.write_i32s(&data.ints)?;
        stream.write_f64s(&data.reals)?;
        Ok(())
    }
}
