// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Effective bodies: composite topology layered over one source body.
//!
//! An effective body groups source edges into effective edges (EEdges),
//! source faces into effective faces (EFaces) and so on. Source objects are
//! referenced by key and resolved to sibling indices of the source body at
//! export time. Effective objects reference each other by 1-based position
//! in their owning vectors.
//!
//! An effective body must be finalized with [`BrepArena::finish_ebody`]
//! before it can be exported.

use serde::{Deserialize, Serialize};

use crate::arena::BrepArena;
use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::traversal::BodyTopology;

/// Discretization of a source edge, shared by the EEdges that use it.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegment {
    pub edge: EdgeKey,
    /// Derivative at the first parameter.
    pub dstart: [f64; 3],
    /// Derivative at the last parameter.
    pub dend: [f64; 3],
    pub ts: Vec<f64>,
}

/// One source edge span within an EEdge.
#[derive(Debug, Clone, PartialEq)]
pub struct EEdgeSeg {
    pub edge: EdgeKey,
    pub sense: i32,
    /// Overrides the start node implied by `edge` and `sense`.
    pub start_node: Option<NodeKey>,
    pub tstart: f64,
    pub tend: f64,
}

/// An effective edge: an ordered chain of source edge spans.
#[derive(Debug, Clone, PartialEq)]
pub struct EEdge {
    pub mtype: EdgeType,
    pub segments: Vec<EEdgeSeg>,
    pub nodes: [NodeKey; 2],
    pub trange: [f64; 2],
}

/// A source edge entry used to parametrize an ELoop, with indices into the
/// edge's discretization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    pub edge: EdgeKey,
    pub sense: i32,
    pub indices: Vec<i32>,
}

/// An effective loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ELoop {
    pub mtype: Closure,
    /// `(eedge index, sense)`, 1-based into [`EBodyData::eedges`].
    pub edges: Vec<(usize, i32)>,
    pub raw: Vec<RawEdge>,
    pub area: f64,
    /// Set by finalization when some EFace uses this loop.
    pub hosted: bool,
}

/// A source face contribution to an EFace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub face: Option<FaceKey>,
    pub start: i32,
    pub uvs: Vec<[f64; 2]>,
    pub deflection: Vec<[f64; 3]>,
    pub triangles: Vec<[i32; 3]>,
}

/// One triangle of the UV remapping mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UvBFace {
    pub kind: i32,
    /// 1-based into [`UvRemap::nodes`].
    pub verts: [i32; 3],
    /// 1-based neighbor triangles, 0 on the boundary.
    pub neighbors: [i32; 3],
}

/// Reparametrization table that maps merged patch uvs onto one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvRemap {
    pub search_index: i32,
    pub ref_bface: i32,
    pub bfaces: Vec<UvBFace>,
    pub nodes: Vec<[f64; 2]>,
    pub search: Option<Vec<i32>>,
    pub translation: Option<Vec<i32>>,
}

/// An effective face.
#[derive(Debug, Clone, PartialEq)]
pub struct EFace {
    pub sense: FaceSense,
    pub patches: Vec<Patch>,
    /// `(eloop index, sense)`, 1-based into [`EBodyData::eloops`].
    pub loops: Vec<(usize, i32)>,
    pub last: i32,
    /// Parametric range used when there is a single patch.
    pub range: [f64; 4],
    /// Required when more than one patch is merged.
    pub uvmap: Option<UvRemap>,
}

/// An effective shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EShell {
    pub mtype: Closure,
    /// 1-based into [`EBodyData::efaces`].
    pub faces: Vec<usize>,
    pub attributes: Attributes,
}

/// Data stored for an effective body.
#[derive(Debug, Clone)]
pub struct EBodyData {
    pub body: BodyKey,
    pub mtype: BodyType,
    /// Merge tolerance angle in degrees.
    pub angle: f64,
    pub segments: Vec<EdgeSegment>,
    pub eedges: Vec<EEdge>,
    pub eloops: Vec<ELoop>,
    pub efaces: Vec<EFace>,
    pub eshells: Vec<EShell>,
    /// Per-EShell senses; solids only.
    pub senses: Vec<i32>,
    pub(crate) done: bool,
}

impl EBodyData {
    /// Starts an empty effective body over `body`.
    pub fn new(body: BodyKey, mtype: BodyType, angle: f64) -> Self {
        Self {
            body,
            mtype,
            angle,
            segments: Vec::new(),
            eedges: Vec::new(),
            eloops: Vec::new(),
            efaces: Vec::new(),
            eshells: Vec::new(),
            senses: Vec::new(),
            done: false,
        }
    }

    /// Returns `true` once [`BrepArena::finish_ebody`] has succeeded.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidEBody(msg.into())
}

fn check_index(what: &str, index: usize, len: usize) -> Result<()> {
    if index == 0 || index > len {
        return Err(invalid(format!("{what} index {index} outside 1..={len}")));
    }
    Ok(())
}

fn check_sense(sense: i32) -> Result<()> {
    if sense != 1 && sense != -1 {
        return Err(Error::InvalidSense(sense));
    }
    Ok(())
}

fn check_edge(topo: &BodyTopology, edge: EdgeKey) -> Result<()> {
    topo.edges
        .index_of(edge)
        .map(|_| ())
        .ok_or_else(|| invalid(format!("edge {edge:?} is not in the source body")))
}

fn check_node(topo: &BodyTopology, node: NodeKey) -> Result<()> {
    topo.nodes
        .index_of(node)
        .map(|_| ())
        .ok_or_else(|| invalid(format!("node {node:?} is not in the source body")))
}

fn check_uvmap(map: &UvRemap) -> Result<()> {
    let nb = map.bfaces.len();
    let nn = map.nodes.len();
    for bf in &map.bfaces {
        for &v in &bf.verts {
            check_index("uv node", usize::try_from(v).unwrap_or(0), nn)?;
        }
        if let Some(&n) = bf.neighbors.iter().find(|&&n| n < 0 || n as usize > nb) {
            return Err(invalid(format!("uv neighbor {n} outside 0..={nb}")));
        }
    }
    for (what, table) in [("search", &map.search), ("translation", &map.translation)] {
        if let Some(t) = table {
            if t.len() != nb {
                return Err(invalid(format!(
                    "{what} table has {} entries for {nb} triangles",
                    t.len()
                )));
            }
        }
    }
    Ok(())
}

impl EBodyData {
    fn validate(&self, topo: &BodyTopology) -> Result<()> {
        for seg in &self.segments {
            check_edge(topo, seg.edge)?;
        }

        for ee in &self.eedges {
            if ee.segments.is_empty() {
                return Err(invalid("effective edge without segments"));
            }
            for &n in &ee.nodes {
                check_node(topo, n)?;
            }
            for seg in &ee.segments {
                check_edge(topo, seg.edge)?;
                check_sense(seg.sense)?;
                if let Some(n) = seg.start_node {
                    check_node(topo, n)?;
                }
            }
        }

        for el in &self.eloops {
            for &(i, sense) in &el.edges {
                check_index("eedge", i, self.eedges.len())?;
                check_sense(sense)?;
            }
            for raw in &el.raw {
                check_edge(topo, raw.edge)?;
                check_sense(raw.sense)?;
            }
        }

        for ef in &self.efaces {
            if ef.patches.is_empty() {
                return Err(invalid("effective face without patches"));
            }
            for patch in &ef.patches {
                let face = patch
                    .face
                    .ok_or_else(|| invalid("patch without a source face"))?;
                if topo.faces.index_of(face).is_none() {
                    return Err(invalid(format!("face {face:?} is not in the source body")));
                }
                for &v in patch.triangles.iter().flatten() {
                    check_index("patch uv", usize::try_from(v).unwrap_or(0), patch.uvs.len())?;
                }
            }
            match &ef.uvmap {
                Some(map) => check_uvmap(map)?,
                None if ef.patches.len() > 1 => {
                    return Err(invalid("merged effective face needs a uv map"))
                }
                None => {}
            }
            for &(i, sense) in &ef.loops {
                check_index("eloop", i, self.eloops.len())?;
                check_sense(sense)?;
            }
        }

        for es in &self.eshells {
            for &i in &es.faces {
                check_index("eface", i, self.efaces.len())?;
            }
        }

        if self.mtype == BodyType::SolidBody {
            if self.senses.len() != self.eshells.len() {
                return Err(invalid(format!(
                    "{} shell senses for {} effective shells",
                    self.senses.len(),
                    self.eshells.len()
                )));
            }
            for &s in &self.senses {
                check_sense(s)?;
            }
        }
        Ok(())
    }
}

impl BrepArena {
    /// Stores an effective body. It is not exportable until finalized.
    pub fn add_ebody(&mut self, mut data: EBodyData) -> Result<EBodyKey> {
        self.body(data.body)?;
        data.done = false;
        Ok(self.ebodies.insert(data))
    }

    /// Mutable access for incremental building. Any change clears the
    /// finalized state.
    pub fn ebody_mut(&mut self, key: EBodyKey) -> Result<&mut EBodyData> {
        let data = self.ebodies.get_mut(key).ok_or(Error::EBodyNotFound(key))?;
        data.done = false;
        Ok(data)
    }

    /// Validates every reference of an effective body, marks the loops
    /// used by faces as hosted and sets the finalized flag.
    pub fn finish_ebody(&mut self, key: EBodyKey) -> Result<()> {
        let body = self.ebody(key)?.body;
        let topo = self.body_topology(body)?;
        self.ebody(key)?.validate(&topo)?;

        let data = self.ebodies.get_mut(key).ok_or(Error::EBodyNotFound(key))?;
        let mut hosted = vec![false; data.eloops.len()];
        for ef in &data.efaces {
            for &(i, _) in &ef.loops {
                hosted[i - 1] = true;
            }
        }
        for (el, h) in data.eloops.iter_mut().zip(hosted) {
            el.hosted = h;
        }
        data.done = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryData;

    /// A single triangle face body; returns (body, face, edges, nodes).
    fn triangle(arena: &mut BrepArena) -> (BodyKey, FaceKey, Vec<EdgeKey>, Vec<NodeKey>) {
        let pts = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let nodes: Vec<_> = pts.iter().map(|&p| arena.add_node(p)).collect();
        let plane = arena
            .add_geometry(GeometryData::plane([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]))
            .unwrap();
        let mut edges = Vec::new();
        let mut pcurves = Vec::new();
        for i in 0..3 {
            let (a, b) = (pts[i], pts[(i + 1) % 3]);
            let dir = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let c = arena
                .add_geometry(GeometryData::line(ObjectClass::Curve, &a, &dir).unwrap())
                .unwrap();
            let pc = arena
                .add_geometry(GeometryData::line(ObjectClass::PCurve, &a[..2], &dir[..2]).unwrap())
                .unwrap();
            edges.push(arena.add_edge(c, &[nodes[i], nodes[(i + 1) % 3]], [0.0, 1.0]).unwrap());
            pcurves.push(pc);
        }
        let signed: Vec<_> = edges.iter().map(|&e| (e, 1)).collect();
        let lp = arena.add_loop(Some(plane), &signed, &pcurves).unwrap();
        let face = arena
            .add_face(plane, FaceSense::Forward, &[(lp, 1)], [0.0, 1.0, 0.0, 1.0])
            .unwrap();
        let body = arena.add_face_body(&[face]).unwrap();
        (body, face, edges, nodes)
    }

    fn simple_ebody(body: BodyKey, face: FaceKey, edges: &[EdgeKey], nodes: &[NodeKey]) -> EBodyData {
        let mut data = EBodyData::new(body, BodyType::SheetBody, 10.0);
        for (i, &e) in edges.iter().enumerate() {
            data.eedges.push(EEdge {
                mtype: EdgeType::TwoNode,
                segments: vec![EEdgeSeg {
                    edge: e,
                    sense: 1,
                    start_node: None,
                    tstart: 0.0,
                    tend: 1.0,
                }],
                nodes: [nodes[i], nodes[(i + 1) % 3]],
                trange: [0.0, 1.0],
            });
        }
        data.eloops.push(ELoop {
            mtype: Closure::Closed,
            edges: vec![(1, 1), (2, 1), (3, 1)],
            raw: Vec::new(),
            area: 0.5,
            hosted: false,
        });
        data.eloops.push(ELoop {
            mtype: Closure::Open,
            edges: vec![(1, 1)],
            raw: Vec::new(),
            area: 0.0,
            hosted: false,
        });
        data.efaces.push(EFace {
            sense: FaceSense::Forward,
            patches: vec![Patch {
                face: Some(face),
                ..Patch::default()
            }],
            loops: vec![(1, 1)],
            last: 0,
            range: [0.0, 1.0, 0.0, 1.0],
            uvmap: None,
        });
        data.eshells.push(EShell {
            mtype: Closure::Open,
            faces: vec![1],
            attributes: Attributes::new(),
        });
        data
    }

    #[test]
    fn finish_marks_done_and_hosted_loops() {
        let mut arena = BrepArena::new();
        let (body, face, edges, nodes) = triangle(&mut arena);
        let key = arena.add_ebody(simple_ebody(body, face, &edges, &nodes)).unwrap();
        assert!(!arena.ebody(key).unwrap().is_done());

        arena.finish_ebody(key).unwrap();
        let data = arena.ebody(key).unwrap();
        assert!(data.is_done());
        assert!(data.eloops[0].hosted);
        assert!(!data.eloops[1].hosted);

        arena.ebody_mut(key).unwrap().angle = 5.0;
        assert!(!arena.ebody(key).unwrap().is_done());
    }

    #[test]
    fn merged_face_requires_uvmap() {
        let mut arena = BrepArena::new();
        let (body, face, edges, nodes) = triangle(&mut arena);
        let mut data = simple_ebody(body, face, &edges, &nodes);
        data.efaces[0].patches.push(Patch {
            face: Some(face),
            ..Patch::default()
        });
        let key = arena.add_ebody(data).unwrap();
        assert!(matches!(arena.finish_ebody(key), Err(Error::InvalidEBody(_))));

        arena.ebody_mut(key).unwrap().efaces[0].uvmap = Some(UvRemap {
            search_index: 1,
            ref_bface: 1,
            bfaces: vec![UvBFace {
                kind: 0,
                verts: [1, 2, 3],
                neighbors: [0, 0, 0],
            }],
            nodes: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            search: Some(vec![1]),
            translation: None,
        });
        assert!(arena.finish_ebody(key).is_ok());
    }

    #[test]
    fn foreign_edges_and_bad_indices_rejected() {
        let mut arena = BrepArena::new();
        let (body, face, edges, nodes) = triangle(&mut arena);
        let (_, _, other_edges, _) = triangle(&mut arena);

        let mut data = simple_ebody(body, face, &edges, &nodes);
        data.eedges[0].segments[0].edge = other_edges[0];
        let key = arena.add_ebody(data).unwrap();
        assert!(arena.finish_ebody(key).is_err());

        let mut data = simple_ebody(body, face, &edges, &nodes);
        data.eloops[0].edges.push((9, 1));
        let key = arena.add_ebody(data).unwrap();
        assert!(arena.finish_ebody(key).is_err());
    }

    #[test]
    fn solid_needs_shell_senses() {
        let mut arena = BrepArena::new();
        let (body, face, edges, nodes) = triangle(&mut arena);
        let mut data = simple_ebody(body, face, &edges, &nodes);
        data.mtype = BodyType::SolidBody;
        let key = arena.add_ebody(data).unwrap();
        assert!(arena.finish_ebody(key).is_err());

        arena.ebody_mut(key).unwrap().senses = vec![1];
        assert!(arena.finish_ebody(key).is_ok());
    }
}
