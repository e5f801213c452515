// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of a whole arena.
//!
//! Keys are replaced by sequential integer ids per object kind, so a
//! snapshot can be written by one process and loaded by another. Loading
//! goes through the regular construction methods, which re-validates every
//! reference; stored bounding boxes and tolerances are then restored
//! verbatim. Opaque pointer attributes are dropped.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{Key, SlotMap};

use crate::arena::*;
use crate::attributes::Attributes;
use crate::effective::*;
use crate::error::{Error, Result};
use crate::geometry::GeometryData;
use crate::keys::*;
use crate::tessellation::{EdgeTess, FaceTess};

/// Serializable representation of a full arena.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub geometry: Vec<GeometrySnapshot>,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub loops: Vec<LoopSnapshot>,
    pub faces: Vec<FaceSnapshot>,
    pub shells: Vec<ShellSnapshot>,
    pub bodies: Vec<BodySnapshot>,
    #[serde(default)]
    pub tessellations: Vec<TessSnapshot>,
    #[serde(default)]
    pub ebodies: Vec<EBodySnapshot>,
    pub models: Vec<ModelSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub id: usize,
    pub class: ObjectClass,
    pub mtype: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<usize>,
    #[serde(default)]
    pub ints: Vec<i32>,
    pub reals: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub point: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: usize,
    pub mtype: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<usize>,
    pub nodes: [usize; 2],
    pub trange: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoopSnapshot {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<usize>,
    pub edges: Vec<(usize, i32)>,
    #[serde(default)]
    pub pcurves: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub id: usize,
    pub surface: usize,
    pub sense: FaceSense,
    pub loops: Vec<(usize, i32)>,
    pub uvbox: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShellSnapshot {
    pub id: usize,
    pub faces: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

/// Top-level children of a body, by id.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShapeSnapshot {
    Wire(usize),
    Faces(Vec<usize>),
    Sheet(Vec<usize>),
    Solid(Vec<(usize, i32)>),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: usize,
    pub shape: BodyShapeSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TessSnapshot {
    pub id: usize,
    pub body: usize,
    pub edges: Vec<EdgeTess>,
    #[serde(default)]
    pub faces: Vec<FaceTess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    pub edge: usize,
    pub dstart: [f64; 3],
    pub dend: [f64; 3],
    pub ts: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EEdgeSegSnapshot {
    pub edge: usize,
    pub sense: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<usize>,
    pub tstart: f64,
    pub tend: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EEdgeSnapshot {
    pub mtype: EdgeType,
    pub segments: Vec<EEdgeSegSnapshot>,
    pub nodes: [usize; 2],
    pub trange: [f64; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawEdgeSnapshot {
    pub edge: usize,
    pub sense: i32,
    pub indices: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ELoopSnapshot {
    pub mtype: Closure,
    pub edges: Vec<(usize, i32)>,
    #[serde(default)]
    pub raw: Vec<RawEdgeSnapshot>,
    pub area: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatchSnapshot {
    pub face: usize,
    pub start: i32,
    pub uvs: Vec<[f64; 2]>,
    pub deflection: Vec<[f64; 3]>,
    pub triangles: Vec<[i32; 3]>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EFaceSnapshot {
    pub sense: FaceSense,
    pub patches: Vec<PatchSnapshot>,
    pub loops: Vec<(usize, i32)>,
    pub last: i32,
    pub range: [f64; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvmap: Option<UvRemap>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EBodySnapshot {
    pub id: usize,
    pub body: usize,
    pub mtype: BodyType,
    pub angle: f64,
    pub segments: Vec<SegmentSnapshot>,
    pub eedges: Vec<EEdgeSnapshot>,
    pub eloops: Vec<ELoopSnapshot>,
    pub efaces: Vec<EFaceSnapshot>,
    pub eshells: Vec<EShell>,
    #[serde(default)]
    pub senses: Vec<i32>,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

/// A trailing model child by id.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelExtraSnapshot {
    Tessellation(usize),
    Ebody(usize),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub id: usize,
    pub bodies: Vec<usize>,
    #[serde(default)]
    pub extras: Vec<ModelExtraSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

/// Key to sequential id mapping built while writing a snapshot.
struct Ids<K>(FxHashMap<K, usize>);

impl<K: Key + Hash> Ids<K> {
    fn of<V>(map: &SlotMap<K, V>) -> Self {
        Ids(map.keys().enumerate().map(|(i, k)| (k, i)).collect())
    }

    fn get(&self, key: K) -> Result<usize> {
        self.0
            .get(&key)
            .copied()
            .ok_or_else(|| Error::Serialization(format!("dangling reference {key:?}")))
    }
}

/// Resolves an id read from a snapshot.
fn lookup<K: Copy>(keys: &[K], id: usize, what: &str) -> Result<K> {
    keys.get(id)
        .copied()
        .ok_or_else(|| Error::Serialization(format!("unknown {what} id {id}")))
}

fn lookup_all<K: Copy>(keys: &[K], ids: &[usize], what: &str) -> Result<Vec<K>> {
    ids.iter().map(|&i| lookup(keys, i, what)).collect()
}

fn lookup_signed<K: Copy>(keys: &[K], ids: &[(usize, i32)], what: &str) -> Result<Vec<(K, i32)>> {
    ids.iter()
        .map(|&(i, s)| Ok((lookup(keys, i, what)?, s)))
        .collect()
}

fn check_id(expected: usize, found: usize, what: &str) -> Result<()> {
    if expected != found {
        return Err(Error::Serialization(format!(
            "{what} ids must be sequential: expected {expected}, found {found}"
        )));
    }
    Ok(())
}

impl BrepArena {
    /// Serializes the arena to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot()?;
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes an arena from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ArenaSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Attributes of an object with opaque entries removed.
    fn persistent_attributes(&self, key: impl Into<ObjectKey>) -> Option<Attributes> {
        let attrs = self.attributes(key)?;
        let mut out = Attributes::new();
        for attr in attrs.iter().filter(|a| !a.value.is_opaque()) {
            match &attr.name {
                Some(name) => out.set(name.clone(), attr.value.clone()),
                None => out.push_unnamed(attr.value.clone()),
            }
        }
        (!out.is_empty()).then_some(out)
    }

    /// Creates a serializable snapshot of the arena.
    pub fn to_snapshot(&self) -> Result<ArenaSnapshot> {
        let geom_ids = Ids::of(&self.geometry);
        let node_ids = Ids::of(&self.nodes);
        let edge_ids = Ids::of(&self.edges);
        let loop_ids = Ids::of(&self.loops);
        let face_ids = Ids::of(&self.faces);
        let shell_ids = Ids::of(&self.shells);
        let body_ids = Ids::of(&self.bodies);
        let tess_ids = Ids::of(&self.tessellations);
        let ebody_ids = Ids::of(&self.ebodies);

        let mut snap = ArenaSnapshot::default();

        for (i, (k, g)) in self.geometry.iter().enumerate() {
            snap.geometry.push(GeometrySnapshot {
                id: i,
                class: g.class,
                mtype: g.mtype,
                basis: g.basis.map(|b| geom_ids.get(b)).transpose()?,
                ints: g.ints.clone(),
                reals: g.reals.clone(),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, n)) in self.nodes.iter().enumerate() {
            snap.nodes.push(NodeSnapshot {
                id: i,
                point: n.point,
                tolerance: Some(n.tolerance),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, e)) in self.edges.iter().enumerate() {
            snap.edges.push(EdgeSnapshot {
                id: i,
                mtype: e.mtype,
                curve: e.curve.map(|c| geom_ids.get(c)).transpose()?,
                nodes: [node_ids.get(e.nodes[0])?, node_ids.get(e.nodes[1])?],
                trange: e.trange,
                bbox: Some(e.bbox),
                tolerance: Some(e.tolerance),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, l)) in self.loops.iter().enumerate() {
            snap.loops.push(LoopSnapshot {
                id: i,
                surface: l.surface.map(|s| geom_ids.get(s)).transpose()?,
                edges: l
                    .edges
                    .iter()
                    .zip(&l.senses)
                    .map(|(&e, &s)| Ok((edge_ids.get(e)?, s)))
                    .collect::<Result<_>>()?,
                pcurves: l.pcurves.iter().map(|&p| geom_ids.get(p)).collect::<Result<_>>()?,
                bbox: Some(l.bbox),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, f)) in self.faces.iter().enumerate() {
            snap.faces.push(FaceSnapshot {
                id: i,
                surface: geom_ids.get(f.surface)?,
                sense: f.mtype,
                loops: f
                    .loops
                    .iter()
                    .zip(&f.senses)
                    .map(|(&l, &s)| Ok((loop_ids.get(l)?, s)))
                    .collect::<Result<_>>()?,
                uvbox: f.uvbox,
                bbox: Some(f.bbox),
                tolerance: Some(f.tolerance),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, s)) in self.shells.iter().enumerate() {
            snap.shells.push(ShellSnapshot {
                id: i,
                faces: s.faces.iter().map(|&f| face_ids.get(f)).collect::<Result<_>>()?,
                bbox: Some(s.bbox),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, b)) in self.bodies.iter().enumerate() {
            let shape = match &b.shape {
                BodyShape::Wire(l) => BodyShapeSnapshot::Wire(loop_ids.get(*l)?),
                BodyShape::Faces(fs) => BodyShapeSnapshot::Faces(
                    fs.iter().map(|&f| face_ids.get(f)).collect::<Result<_>>()?,
                ),
                BodyShape::Shells(ss) if b.mtype == BodyType::SolidBody => BodyShapeSnapshot::Solid(
                    ss.iter()
                        .zip(&b.senses)
                        .map(|(&s, &sense)| Ok((shell_ids.get(s)?, sense)))
                        .collect::<Result<_>>()?,
                ),
                BodyShape::Shells(ss) => BodyShapeSnapshot::Sheet(
                    ss.iter().map(|&s| shell_ids.get(s)).collect::<Result<_>>()?,
                ),
            };
            snap.bodies.push(BodySnapshot {
                id: i,
                shape,
                bbox: Some(b.bbox),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, t)) in self.tessellations.iter().enumerate() {
            snap.tessellations.push(TessSnapshot {
                id: i,
                body: body_ids.get(t.body)?,
                edges: t.edges.clone(),
                faces: t.faces.clone(),
                attributes: self.persistent_attributes(k),
            });
        }

        for (i, (k, eb)) in self.ebodies.iter().enumerate() {
            snap.ebodies
                .push(self.ebody_snapshot(i, k, eb, &body_ids, &edge_ids, &node_ids, &face_ids)?);
        }

        for (i, (k, m)) in self.models.iter().enumerate() {
            snap.models.push(ModelSnapshot {
                id: i,
                bodies: m.bodies.iter().map(|&b| body_ids.get(b)).collect::<Result<_>>()?,
                extras: m
                    .extras
                    .iter()
                    .map(|x| {
                        Ok(match *x {
                            ModelExtra::Tessellation(t) => {
                                ModelExtraSnapshot::Tessellation(tess_ids.get(t)?)
                            }
                            ModelExtra::EBody(e) => ModelExtraSnapshot::Ebody(ebody_ids.get(e)?),
                        })
                    })
                    .collect::<Result<_>>()?,
                bbox: Some(m.bbox),
                attributes: self.persistent_attributes(k),
            });
        }

        Ok(snap)
    }

    #[allow(clippy::too_many_arguments)]
    fn ebody_snapshot(
        &self,
        id: usize,
        key: EBodyKey,
        eb: &EBodyData,
        body_ids: &Ids<BodyKey>,
        edge_ids: &Ids<EdgeKey>,
        node_ids: &Ids<NodeKey>,
        face_ids: &Ids<FaceKey>,
    ) -> Result<EBodySnapshot> {
        let segments = eb
            .segments
            .iter()
            .map(|s| {
                Ok(SegmentSnapshot {
                    edge: edge_ids.get(s.edge)?,
                    dstart: s.dstart,
                    dend: s.dend,
                    ts: s.ts.clone(),
                })
            })
            .collect::<Result<_>>()?;

        let eedges = eb
            .eedges
            .iter()
            .map(|ee| {
                Ok(EEdgeSnapshot {
                    mtype: ee.mtype,
                    segments: ee
                        .segments
                        .iter()
                        .map(|s| {
                            Ok(EEdgeSegSnapshot {
                                edge: edge_ids.get(s.edge)?,
                                sense: s.sense,
                                start_node: s.start_node.map(|n| node_ids.get(n)).transpose()?,
                                tstart: s.tstart,
                                tend: s.tend,
                            })
                        })
                        .collect::<Result<_>>()?,
                    nodes: [node_ids.get(ee.nodes[0])?, node_ids.get(ee.nodes[1])?],
                    trange: ee.trange,
                })
            })
            .collect::<Result<_>>()?;

        let eloops = eb
            .eloops
            .iter()
            .map(|el| {
                Ok(ELoopSnapshot {
                    mtype: el.mtype,
                    edges: el.edges.clone(),
                    raw: el
                        .raw
                        .iter()
                        .map(|r| {
                            Ok(RawEdgeSnapshot {
                                edge: edge_ids.get(r.edge)?,
                                sense: r.sense,
                                indices: r.indices.clone(),
                            })
                        })
                        .collect::<Result<_>>()?,
                    area: el.area,
                })
            })
            .collect::<Result<_>>()?;

        let efaces = eb
            .efaces
            .iter()
            .map(|ef| {
                Ok(EFaceSnapshot {
                    sense: ef.sense,
                    patches: ef
                        .patches
                        .iter()
                        .map(|p| {
                            let face = p.face.ok_or_else(|| {
                                Error::Serialization("patch without a source face".into())
                            })?;
                            Ok(PatchSnapshot {
                                face: face_ids.get(face)?,
                                start: p.start,
                                uvs: p.uvs.clone(),
                                deflection: p.deflection.clone(),
                                triangles: p.triangles.clone(),
                            })
                        })
                        .collect::<Result<_>>()?,
                    loops: ef.loops.clone(),
                    last: ef.last,
                    range: ef.range,
                    uvmap: ef.uvmap.clone(),
                })
            })
            .collect::<Result<_>>()?;

        Ok(EBodySnapshot {
            id,
            body: body_ids.get(eb.body)?,
            mtype: eb.mtype,
            angle: eb.angle,
            segments,
            eedges,
            eloops,
            efaces,
            eshells: eb.eshells.clone(),
            senses: eb.senses.clone(),
            done: eb.done,
            attributes: self.persistent_attributes(key),
        })
    }

    /// Reconstructs an arena from a snapshot.
    pub fn from_snapshot(snap: &ArenaSnapshot) -> Result<Self> {
        let mut arena = BrepArena::new();

        let mut geom_keys: Vec<GeomKey> = Vec::with_capacity(snap.geometry.len());
        for (i, gs) in snap.geometry.iter().enumerate() {
            check_id(i, gs.id, "geometry")?;
            // A basis must precede the object that uses it.
            let basis = gs
                .basis
                .map(|b| lookup(&geom_keys, b, "geometry"))
                .transpose()?;
            let data = GeometryData::new(gs.class, gs.mtype, basis, gs.ints.clone(), gs.reals.clone());
            let gk = arena.add_geometry(data)?;
            if let Some(attrs) = &gs.attributes {
                arena.set_attributes(gk, attrs.clone());
            }
            geom_keys.push(gk);
        }

        let mut node_keys: Vec<NodeKey> = Vec::with_capacity(snap.nodes.len());
        for (i, ns) in snap.nodes.iter().enumerate() {
            check_id(i, ns.id, "node")?;
            let nk = arena.add_node(ns.point);
            if let Some(tol) = ns.tolerance {
                arena.set_tolerance(nk, tol)?;
            }
            if let Some(attrs) = &ns.attributes {
                arena.set_attributes(nk, attrs.clone());
            }
            node_keys.push(nk);
        }

        let mut edge_keys: Vec<EdgeKey> = Vec::with_capacity(snap.edges.len());
        for (i, es) in snap.edges.iter().enumerate() {
            check_id(i, es.id, "edge")?;
            let nodes = lookup_all(&node_keys, &es.nodes, "node")?;
            let ek = match (es.mtype, es.curve) {
                (EdgeType::Degenerate, _) => arena.add_degenerate_edge(nodes[0], es.trange)?,
                (mtype, Some(c)) => {
                    let curve = lookup(&geom_keys, c, "geometry")?;
                    let used = if mtype == EdgeType::OneNode { &nodes[..1] } else { &nodes[..] };
                    arena.add_edge(curve, used, es.trange)?
                }
                (_, None) => {
                    return Err(Error::Serialization(format!("edge {i} has no curve")));
                }
            };
            if let Some(bbox) = es.bbox {
                arena.set_bounding_box(ek, bbox)?;
            }
            if let Some(tol) = es.tolerance {
                arena.set_tolerance(ek, tol)?;
            }
            if let Some(attrs) = &es.attributes {
                arena.set_attributes(ek, attrs.clone());
            }
            edge_keys.push(ek);
        }

        let mut loop_keys: Vec<LoopKey> = Vec::with_capacity(snap.loops.len());
        for (i, ls) in snap.loops.iter().enumerate() {
            check_id(i, ls.id, "loop")?;
            let surface = ls
                .surface
                .map(|s| lookup(&geom_keys, s, "geometry"))
                .transpose()?;
            let edges = lookup_signed(&edge_keys, &ls.edges, "edge")?;
            let pcurves = lookup_all(&geom_keys, &ls.pcurves, "geometry")?;
            let lk = arena.add_loop(surface, &edges, &pcurves)?;
            if let Some(bbox) = ls.bbox {
                arena.set_bounding_box(lk, bbox)?;
            }
            if let Some(attrs) = &ls.attributes {
                arena.set_attributes(lk, attrs.clone());
            }
            loop_keys.push(lk);
        }

        let mut face_keys: Vec<FaceKey> = Vec::with_capacity(snap.faces.len());
        for (i, fs) in snap.faces.iter().enumerate() {
            check_id(i, fs.id, "face")?;
            let surface = lookup(&geom_keys, fs.surface, "geometry")?;
            let loops = lookup_signed(&loop_keys, &fs.loops, "loop")?;
            let fk = arena.add_face(surface, fs.sense, &loops, fs.uvbox)?;
            if let Some(bbox) = fs.bbox {
                arena.set_bounding_box(fk, bbox)?;
            }
            if let Some(tol) = fs.tolerance {
                arena.set_tolerance(fk, tol)?;
            }
            if let Some(attrs) = &fs.attributes {
                arena.set_attributes(fk, attrs.clone());
            }
            face_keys.push(fk);
        }

        let mut shell_keys: Vec<ShellKey> = Vec::with_capacity(snap.shells.len());
        for (i, ss) in snap.shells.iter().enumerate() {
            check_id(i, ss.id, "shell")?;
            let faces = lookup_all(&face_keys, &ss.faces, "face")?;
            let sk = arena.add_shell(&faces)?;
            if let Some(bbox) = ss.bbox {
                arena.set_bounding_box(sk, bbox)?;
            }
            if let Some(attrs) = &ss.attributes {
                arena.set_attributes(sk, attrs.clone());
            }
            shell_keys.push(sk);
        }

        let mut body_keys: Vec<BodyKey> = Vec::with_capacity(snap.bodies.len());
        for (i, bs) in snap.bodies.iter().enumerate() {
            check_id(i, bs.id, "body")?;
            let bk = match &bs.shape {
                BodyShapeSnapshot::Wire(l) => arena.add_wire_body(lookup(&loop_keys, *l, "loop")?)?,
                BodyShapeSnapshot::Faces(fs) => {
                    arena.add_face_body(&lookup_all(&face_keys, fs, "face")?)?
                }
                BodyShapeSnapshot::Sheet(ss) => {
                    arena.add_sheet_body(&lookup_all(&shell_keys, ss, "shell")?)?
                }
                BodyShapeSnapshot::Solid(ss) => {
                    arena.add_solid_body(&lookup_signed(&shell_keys, ss, "shell")?)?
                }
            };
            if let Some(bbox) = bs.bbox {
                arena.set_bounding_box(bk, bbox)?;
            }
            if let Some(attrs) = &bs.attributes {
                arena.set_attributes(bk, attrs.clone());
            }
            body_keys.push(bk);
        }

        let mut tess_keys: Vec<TessKey> = Vec::with_capacity(snap.tessellations.len());
        for (i, ts) in snap.tessellations.iter().enumerate() {
            check_id(i, ts.id, "tessellation")?;
            let body = lookup(&body_keys, ts.body, "body")?;
            let tk = arena.add_tessellation(body, ts.edges.clone(), ts.faces.clone())?;
            if let Some(attrs) = &ts.attributes {
                arena.set_attributes(tk, attrs.clone());
            }
            tess_keys.push(tk);
        }

        let mut ebody_keys: Vec<EBodyKey> = Vec::with_capacity(snap.ebodies.len());
        for (i, es) in snap.ebodies.iter().enumerate() {
            check_id(i, es.id, "ebody")?;
            let data = ebody_from_snapshot(es, &body_keys, &edge_keys, &node_keys, &face_keys)?;
            let ek = arena.add_ebody(data)?;
            if es.done {
                arena.finish_ebody(ek)?;
            }
            if let Some(attrs) = &es.attributes {
                arena.set_attributes(ek, attrs.clone());
            }
            ebody_keys.push(ek);
        }

        for (i, ms) in snap.models.iter().enumerate() {
            check_id(i, ms.id, "model")?;
            let bodies = lookup_all(&body_keys, &ms.bodies, "body")?;
            let extras = ms
                .extras
                .iter()
                .map(|x| {
                    Ok(match *x {
                        ModelExtraSnapshot::Tessellation(t) => {
                            ModelExtra::Tessellation(lookup(&tess_keys, t, "tessellation")?)
                        }
                        ModelExtraSnapshot::Ebody(e) => {
                            ModelExtra::EBody(lookup(&ebody_keys, e, "ebody")?)
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let mk = arena.add_model(&bodies, &extras)?;
            if let Some(bbox) = ms.bbox {
                arena.set_bounding_box(mk, bbox)?;
            }
            if let Some(attrs) = &ms.attributes {
                arena.set_attributes(mk, attrs.clone());
            }
        }

        Ok(arena)
    }

    /// Returns model keys in creation order, matching snapshot ids.
    pub fn model_keys(&self) -> Vec<ModelKey> {
        self.models.keys().collect()
    }
}

fn ebody_from_snapshot(
    es: &EBodySnapshot,
    body_keys: &[BodyKey],
    edge_keys: &[EdgeKey],
    node_keys: &[NodeKey],
    face_keys: &[FaceKey],
) -> Result<EBodyData> {
    let mut data = EBodyData::new(lookup(body_keys, es.body, "body")?, es.mtype, es.angle);

    for s in &es.segments {
        data.segments.push(EdgeSegment {
            edge: lookup(edge_keys, s.edge, "edge")?,
            dstart: s.dstart,
            dend: s.dend,
            ts: s.ts.clone(),
        });
    }

    for ee in &es.eedges {
        let segments = ee
            .segments
            .iter()
            .map(|s| {
                Ok(EEdgeSeg {
                    edge: lookup(edge_keys, s.edge, "edge")?,
                    sense: s.sense,
                    start_node: s
                        .start_node
                        .map(|n| lookup(node_keys, n, "node"))
                        .transpose()?,
                    tstart: s.tstart,
                    tend: s.tend,
                })
            })
            .collect::<Result<_>>()?;
        data.eedges.push(EEdge {
            mtype: ee.mtype,
            segments,
            nodes: [
                lookup(node_keys, ee.nodes[0], "node")?,
                lookup(node_keys, ee.nodes[1], "node")?,
            ],
            trange: ee.trange,
        });
    }

    for el in &es.eloops {
        let raw = el
            .raw
            .iter()
            .map(|r| {
                Ok(RawEdge {
                    edge: lookup(edge_keys, r.edge, "edge")?,
                    sense: r.sense,
                    indices: r.indices.clone(),
                })
            })
            .collect::<Result<_>>()?;
        data.eloops.push(ELoop {
            mtype: el.mtype,
            edges: el.edges.clone(),
            raw,
            area: el.area,
            hosted: false,
        });
    }

    for ef in &es.efaces {
        let patches = ef
            .patches
            .iter()
            .map(|p| {
                Ok(Patch {
                    face: Some(lookup(face_keys, p.face, "face")?),
                    start: p.start,
                    uvs: p.uvs.clone(),
                    deflection: p.deflection.clone(),
                    triangles: p.triangles.clone(),
                })
            })
            .collect::<Result<_>>()?;
        data.efaces.push(EFace {
            sense: ef.sense,
            patches,
            loops: ef.loops.clone(),
            last: ef.last,
            range: ef.range,
            uvmap: ef.uvmap.clone(),
        });
    }

    data.eshells = es.eshells.clone();
    data.senses = es.senses.clone();
    Ok(data)
}
