// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology writer.
//!
//! A body record is its kind tag, eight counts, the geometry records of the
//! populated maps and then one record per node, edge, loop, face and shell
//! in sibling order. Every cross reference is a 1-based position in the
//! body's own enumeration, which the reader rebuilds in the same order.

use egads_lite_topology::{
    BodyKey, BodyTopology, BodyType, EdgeType, FaceKey, LoopKey, ObjectClass, ShellKey,
};
use tracing::debug;

use crate::context::{sibling, ExportContext};
use crate::error::Result;
use crate::kernel::GeometryKernel;
use crate::maps::GeometryMaps;
use crate::populate::populate;

/// Counts written after the body tag, in stream order.
pub(crate) fn body_counts(mtype: BodyType, maps: &GeometryMaps, topo: &BodyTopology) -> [usize; 8] {
    let [npcurve, ncurve, nsurface] = maps.counts();
    let (nsurface, nface, nshell) = match mtype {
        BodyType::WireBody => (0, 0, 0),
        BodyType::FaceBody => (nsurface, topo.faces.len(), 0),
        BodyType::SheetBody | BodyType::SolidBody => {
            (nsurface, topo.faces.len(), topo.shells.len())
        }
    };
    [
        npcurve,
        ncurve,
        nsurface,
        topo.nodes.len(),
        topo.edges.len(),
        topo.loops.len(),
        nface,
        nshell,
    ]
}

impl<K: GeometryKernel> ExportContext<'_, K> {
    /// Writes one complete body record.
    pub(crate) fn write_body(&mut self, body: BodyKey) -> Result<()> {
        let arena = self.arena;
        let data = arena.body(body)?;
        let topo = arena.body_topology(body)?;
        let maps = populate(arena, self.kernel, &topo)?;
        let counts = body_counts(data.mtype, &maps, &topo);

        debug!(
            body_type = %data.mtype,
            pcurves = counts[0],
            curves = counts[1],
            surfaces = counts[2],
            nodes = counts[3],
            edges = counts[4],
            loops = counts[5],
            faces = counts[6],
            shells = counts[7],
            "writing body"
        );

        self.stream.write_i32(data.mtype as i32)?;
        for &count in &counts {
            self.stream.write_count(count)?;
        }

        for &key in maps.pcurves.items() {
            self.write_geometry(&maps, key)?;
        }
        for &key in maps.curves.items() {
            self.write_geometry(&maps, key)?;
        }
        for &key in &maps.surfaces.items()[..counts[2]] {
            self.write_geometry(&maps, key)?;
        }

        for nk in topo.nodes.iter() {
            let node = arena.node(nk)?;
            self.stream.write_f64s(&node.point)?;
            self.stream.write_f64(node.tolerance)?;
            self.write_object_attributes(nk)?;
        }

        for ek in topo.edges.iter() {
            let edge = arena.edge(ek)?;
            let curve = match (edge.mtype, edge.curve) {
                (EdgeType::Degenerate, _) | (_, None) => 0,
                (_, Some(curve)) => maps.curves.index_of(arena, self.kernel, curve)?,
            };
            self.stream.write_i32(edge.mtype as i32)?;
            self.stream.write_count(curve)?;
            for &nk in &edge.nodes {
                self.stream
                    .write_count(sibling(&topo.nodes, nk, ObjectClass::Node)?)?;
            }
            self.stream.write_f64s(&edge.trange)?;
            self.stream.write_box(&edge.bbox)?;
            self.stream.write_f64(edge.tolerance)?;
            self.write_object_attributes(ek)?;
        }

        for lk in topo.loops.iter() {
            self.write_loop(&maps, &topo, lk)?;
        }
        for fk in topo.faces.iter().take(counts[6]) {
            self.write_face(&maps, &topo, fk)?;
        }
        for sk in topo.shells.iter().take(counts[7]) {
            self.write_shell(&topo, sk)?;
        }

        if data.mtype == BodyType::SolidBody {
            self.stream.write_i32s(&data.senses)?;
        }
        self.stream.write_box(&data.bbox)?;
        self.write_object_attributes(body)
    }

    fn write_loop(&mut self, maps: &GeometryMaps, topo: &BodyTopology, lk: LoopKey) -> Result<()> {
        let arena = self.arena;
        let lp = arena.loop_(lk)?;
        let surface = match lp.surface {
            Some(s) => maps.surfaces.index_of(arena, self.kernel, s)?,
            None => 0,
        };

        self.stream.write_i32(lp.mtype as i32)?;
        self.stream.write_count(lp.edges.len())?;
        self.stream.write_count(surface)?;
        self.stream.write_box(&lp.bbox)?;
        self.stream.write_i32s(&lp.senses)?;
        for &ek in &lp.edges {
            self.stream
                .write_count(sibling(&topo.edges, ek, ObjectClass::Edge)?)?;
        }
        if lp.surface.is_some() {
            for &pc in &lp.pcurves {
                let index = maps.pcurves.index_of(arena, self.kernel, pc)?;
                self.stream.write_count(index)?;
            }
        }
        self.write_object_attributes(lk)
    }

    fn write_face(&mut self, maps: &GeometryMaps, topo: &BodyTopology, fk: FaceKey) -> Result<()> {
        let arena = self.arena;
        let face = arena.face(fk)?;
        let surface = maps.surfaces.index_of(arena, self.kernel, face.surface)?;

        self.stream.write_i32(face.mtype as i32)?;
        self.stream.write_count(face.loops.len())?;
        self.stream.write_count(surface)?;
        self.stream.write_f64s(&face.uvbox)?;
        self.stream.write_box(&face.bbox)?;
        self.stream.write_f64(face.tolerance)?;
        self.stream.write_i32s(&face.senses)?;
        for &lk in &face.loops {
            self.stream
                .write_count(sibling(&topo.loops, lk, ObjectClass::Loop)?)?;
        }
        self.write_object_attributes(fk)
    }

    fn write_shell(&mut self, topo: &BodyTopology, sk: ShellKey) -> Result<()> {
        let shell = self.arena.shell(sk)?;

        self.stream.write_i32(shell.mtype as i32)?;
        self.stream.write_count(shell.faces.len())?;
        self.stream.write_box(&shell.bbox)?;
        for &fk in &shell.faces {
            self.stream
                .write_count(sibling(&topo.faces, fk, ObjectClass::Face)?)?;
        }
        self.write_object_attributes(sk)
    }
}
