// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tessellation record writer.

use egads_lite_topology::{BodyType, TessKey};

use crate::context::ExportContext;
use crate::error::Result;
use crate::kernel::GeometryKernel;

impl<K: GeometryKernel> ExportContext<'_, K> {
    /// Writes a tessellation record.
    ///
    /// Edge and face counts come from the bound body, not from the stored
    /// tessellation, so they always agree with the body record. Missing or
    /// empty entries are written as zero-length records to keep positions.
    pub(crate) fn write_tessellation(&mut self, key: TessKey) -> Result<()> {
        let arena = self.arena;
        let tess = arena.tessellation(key)?;
        let topo = arena.body_topology(tess.body)?;
        let nedge = topo.edges.len();
        let nface = match arena.body(tess.body)?.mtype {
            BodyType::WireBody => 0,
            _ => topo.faces.len(),
        };

        self.stream.write_count(nedge)?;
        self.stream.write_count(nface)?;

        for index in 1..=nedge {
            match tess.edge_tessellation(index) {
                Some(edge) if !edge.points.is_empty() => {
                    self.stream.write_count(edge.points.len())?;
                    for p in &edge.points {
                        self.stream.write_f64s(p)?;
                    }
                    self.stream.write_f64s(&edge.params)?;
                }
                _ => self.stream.write_i32(0)?,
            }
        }

        for index in 1..=nface {
            let face = tess.face_tessellation(index);
            let (np, nt) = face.map_or((0, 0), |f| (f.points.len(), f.triangles.len()));
            self.stream.write_count(np)?;
            self.stream.write_count(nt)?;
            let Some(face) = face.filter(|_| np > 0 && nt > 0) else {
                continue;
            };
            for p in &face.points {
                self.stream.write_f64s(p)?;
            }
            for uv in &face.uvs {
                self.stream.write_f64s(uv)?;
            }
            for tri in &face.triangles {
                self.stream.write_i32s(tri)?;
            }
        }

        self.write_object_attributes(key)
    }
}
