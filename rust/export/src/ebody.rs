// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Effective-body record writer.
//!
//! References into the source body (edges, nodes, faces) are positions in
//! the source body's enumeration. References between effective objects
//! are 1-based positions in the effective body's own lists.

use egads_lite_topology::{
    BodyTopology, BodyType, EBodyKey, EFace, ELoop, EdgeKey, EdgeType, ObjectClass, UvRemap,
};
use tracing::debug;

use crate::attrs::write_attributes;
use crate::context::{sibling, ExportContext};
use crate::error::{Error, Result};
use crate::kernel::GeometryKernel;
use crate::maps::GeometryMaps;
use crate::populate::populate;

fn effective_index(what: &'static str, index: usize, len: usize) -> Result<usize> {
    if index == 0 || index > len {
        return Err(Error::EffectiveIndex { what, index, len });
    }
    Ok(index)
}

impl<K: GeometryKernel> ExportContext<'_, K> {
    /// Writes an effective-body record. The body must be finalized.
    pub(crate) fn write_ebody(&mut self, key: EBodyKey) -> Result<()> {
        let arena = self.arena;
        let eb = arena.ebody(key)?;
        if !eb.is_done() {
            return Err(Error::NotFinalized(key));
        }
        let topo = arena.body_topology(eb.body)?;
        let maps = populate(arena, self.kernel, &topo)?;
        debug!(
            body_type = %eb.mtype,
            eedges = eb.eedges.len(),
            eloops = eb.eloops.len(),
            efaces = eb.efaces.len(),
            eshells = eb.eshells.len(),
            "writing effective body"
        );

        self.stream.write_i32(eb.mtype as i32)?;
        self.write_object_attributes(key)?;
        self.stream.write_count(eb.eedges.len())?;
        self.stream.write_count(eb.eloops.len())?;
        self.stream.write_count(eb.efaces.len())?;
        self.stream.write_count(eb.eshells.len())?;
        self.stream.write_count(eb.segments.len())?;
        self.stream.write_f64(eb.angle)?;
        if eb.mtype == BodyType::SolidBody {
            self.stream.write_i32s(&eb.senses)?;
        }

        for seg in &eb.segments {
            let edge = sibling(&topo.edges, seg.edge, ObjectClass::Edge)?;
            let curve = self.edge_curve_index(&maps, seg.edge)?;
            self.stream.write_count(edge)?;
            self.stream.write_count(curve)?;
            self.stream.write_count(seg.ts.len())?;
            self.stream.write_f64s(&seg.dstart)?;
            self.stream.write_f64s(&seg.dend)?;
            self.stream.write_f64s(&seg.ts)?;
        }

        for ee in &eb.eedges {
            self.stream.write_i32(ee.mtype as i32)?;
            self.stream.write_count(ee.segments.len())?;
            for &nk in &ee.nodes {
                self.stream
                    .write_count(sibling(&topo.nodes, nk, ObjectClass::Node)?)?;
            }
            self.stream.write_f64s(&ee.trange)?;
            for seg in &ee.segments {
                let start = match seg.start_node {
                    Some(nk) => sibling(&topo.nodes, nk, ObjectClass::Node)?,
                    None => 0,
                };
                self.stream
                    .write_count(sibling(&topo.edges, seg.edge, ObjectClass::Edge)?)?;
                self.stream.write_i32(seg.sense)?;
                self.stream.write_count(start)?;
                self.stream.write_f64(seg.tstart)?;
                self.stream.write_f64(seg.tend)?;
            }
        }

        for el in &eb.eloops {
            self.write_eloop(&topo, el, eb.eedges.len())?;
        }
        for (i, ef) in eb.efaces.iter().enumerate() {
            self.write_eface(&topo, ef, i + 1, eb.eloops.len())?;
        }

        for es in &eb.eshells {
            self.stream.write_i32(es.mtype as i32)?;
            self.stream.write_count(es.faces.len())?;
            for &f in &es.faces {
                self.stream
                    .write_count(effective_index("eface", f, eb.efaces.len())?)?;
            }
            write_attributes(&mut self.stream, Some(&es.attributes))?;
        }
        Ok(())
    }

    fn edge_curve_index(&self, maps: &GeometryMaps, ek: EdgeKey) -> Result<usize> {
        let edge = self.arena.edge(ek)?;
        match (edge.mtype, edge.curve) {
            (EdgeType::Degenerate, _) | (_, None) => Ok(0),
            (_, Some(curve)) => maps.curves.index_of(self.arena, self.kernel, curve),
        }
    }

    fn write_eloop(&mut self, topo: &BodyTopology, el: &ELoop, needge: usize) -> Result<()> {
        self.stream.write_i32(el.mtype as i32)?;
        if !el.hosted {
            return self.stream.write_i32(0);
        }
        self.stream.write_i32(1)?;
        self.stream.write_count(el.edges.len())?;
        self.stream.write_count(el.raw.len())?;
        self.stream.write_f64(el.area)?;
        for &(index, _) in &el.edges {
            self.stream
                .write_count(effective_index("eedge", index, needge)?)?;
        }
        for &(_, sense) in &el.edges {
            self.stream.write_i32(sense)?;
        }
        for raw in &el.raw {
            self.stream
                .write_count(sibling(&topo.edges, raw.edge, ObjectClass::Edge)?)?;
            self.stream.write_i32(raw.sense)?;
            self.stream.write_count(raw.indices.len())?;
            self.stream.write_i32s(&raw.indices)?;
        }
        Ok(())
    }

    fn write_eface(
        &mut self,
        topo: &BodyTopology,
        ef: &EFace,
        index: usize,
        neloop: usize,
    ) -> Result<()> {
        self.stream.write_i32(ef.sense as i32)?;
        self.stream.write_count(ef.patches.len())?;
        self.stream.write_count(ef.loops.len())?;
        self.stream.write_i32(ef.last)?;
        if ef.patches.len() > 1 {
            let map = ef.uvmap.as_ref().ok_or(Error::MissingUvMap(index))?;
            self.write_uvmap(map)?;
        } else {
            self.stream.write_f64s(&ef.range)?;
        }

        for &(l, _) in &ef.loops {
            self.stream
                .write_count(effective_index("eloop", l, neloop)?)?;
        }
        for &(_, sense) in &ef.loops {
            self.stream.write_i32(sense)?;
        }

        for patch in &ef.patches {
            let face = match patch.face {
                Some(fk) => sibling(&topo.faces, fk, ObjectClass::Face)?,
                None => {
                    return Err(Error::EffectiveIndex {
                        what: "patch face",
                        index: 0,
                        len: topo.faces.len(),
                    })
                }
            };
            self.stream.write_count(face)?;
            self.stream.write_i32(patch.start)?;
            self.stream.write_count(patch.uvs.len())?;
            self.stream.write_count(patch.deflection.len())?;
            self.stream.write_count(patch.triangles.len())?;
            for tri in &patch.triangles {
                self.stream.write_i32s(tri)?;
            }
            for uv in &patch.uvs {
                self.stream.write_f64s(uv)?;
            }
            for p in &patch.deflection {
                self.stream.write_f64s(p)?;
            }
        }
        Ok(())
    }

    /// Writes the uv remapping table of a merged effective face.
    fn write_uvmap(&mut self, map: &UvRemap) -> Result<()> {
        let stream = &mut self.stream;
        stream.write_i32(map.search_index)?;
        stream.write_i32(map.ref_bface)?;
        stream.write_count(map.bfaces.len())?;
        stream.write_count(map.nodes.len())?;
        stream.write_i32(i32::from(map.search.is_some()))?;
        stream.write_i32(i32::from(map.translation.is_some()))?;
        for bf in &map.bfaces {
            stream.write_i32(bf.kind)?;
        }
        for bf in &map.bfaces {
            stream.write_i32s(&bf.verts)?;
            stream.write_i32s(&bf.neighbors)?;
        }
        for uv in &map.nodes {
            stream.write_f64s(uv)?;
        }
        if let Some(search) = &map.search {
            stream.write_i32s(search)?;
        }
        if let Some(translation) = &map.translation {
            stream.write_i32s(translation)?;
        }
        Ok(())
    }
}
