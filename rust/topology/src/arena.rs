// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for B-Rep models.
//!
//! The [`BrepArena`] is the central owner of all model data. Every object
//! (geometry, node, edge, loop, face, shell, body, model, tessellation,
//! effective body) lives inside slot maps with stable, generational keys.
//! References between objects are keys, never pointers, so geometry shared by
//! several edges or faces is simply the same [`GeomKey`] stored in each.
//!
//! The arena is read-only while an export runs. Exporting two different
//! arenas from two threads is safe; all export state lives outside it.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::attributes::Attributes;
use crate::effective::EBodyData;
use crate::error::{Error, Result};
use crate::geometry::GeometryData;
use crate::keys::*;
use crate::tessellation::TessData;

/// Axis-aligned bounding box: `[xmin, ymin, zmin, xmax, ymax, zmax]`.
pub type BoundingBox = [f64; 6];

/// Default tolerance assigned to nodes, edges and faces.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Returns the empty box, which absorbs any point it is merged with.
pub fn empty_box() -> BoundingBox {
    [
        f64::INFINITY,
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    ]
}

/// Grows `bbox` to contain `point`.
pub fn box_add_point(bbox: &mut BoundingBox, point: [f64; 3]) {
    for i in 0..3 {
        bbox[i] = bbox[i].min(point[i]);
        bbox[i + 3] = bbox[i + 3].max(point[i]);
    }
}

/// Grows `bbox` to contain `other`.
pub fn box_union(bbox: &mut BoundingBox, other: &BoundingBox) {
    for i in 0..3 {
        bbox[i] = bbox[i].min(other[i]);
        bbox[i + 3] = bbox[i + 3].max(other[i + 3]);
    }
}

/// Replaces a never-grown box with zeros so no infinities reach the stream.
pub(crate) fn box_finish(bbox: BoundingBox) -> BoundingBox {
    if bbox[0] > bbox[3] {
        [0.0; 6]
    } else {
        bbox
    }
}

/// Data stored for a node: a point with a tolerance.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub point: [f64; 3],
    pub tolerance: f64,
}

/// Data stored for an edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub mtype: EdgeType,
    /// The 3D curve; `None` only for degenerate edges.
    pub curve: Option<GeomKey>,
    /// Start and end nodes. Both slots hold the same node for one-node and
    /// degenerate edges.
    pub nodes: [NodeKey; 2],
    pub trange: [f64; 2],
    pub bbox: BoundingBox,
    pub tolerance: f64,
}

/// Data stored for a loop: a signed, ordered chain of edges.
#[derive(Debug, Clone)]
pub struct LoopData {
    pub mtype: Closure,
    /// Host surface when the loop bounds a face.
    pub surface: Option<GeomKey>,
    pub edges: Vec<EdgeKey>,
    /// `+1` if edge[i] is traversed forward, `-1` if reversed.
    pub senses: Vec<i32>,
    /// One pcurve per edge when `surface` is set, empty otherwise.
    pub pcurves: Vec<GeomKey>,
    pub bbox: BoundingBox,
}

/// Data stored for a face: a surface trimmed by loops.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub mtype: FaceSense,
    pub surface: GeomKey,
    pub loops: Vec<LoopKey>,
    /// `+1` for outer loops, `-1` for inner loops.
    pub senses: Vec<i32>,
    /// `[umin, umax, vmin, vmax]`.
    pub uvbox: [f64; 4],
    pub bbox: BoundingBox,
    pub tolerance: f64,
}

/// Data stored for a shell: a connected set of faces.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub mtype: Closure,
    pub faces: Vec<FaceKey>,
    pub bbox: BoundingBox,
}

/// The top-level children of a body, by body kind.
#[derive(Debug, Clone)]
pub enum BodyShape {
    Wire(LoopKey),
    Faces(Vec<FaceKey>),
    Shells(Vec<ShellKey>),
}

/// Data stored for a body.
#[derive(Debug, Clone)]
pub struct BodyData {
    pub mtype: BodyType,
    pub shape: BodyShape,
    /// Per-shell senses; only populated for solids.
    pub senses: Vec<i32>,
    pub bbox: BoundingBox,
}

/// A model child written after all plain bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelExtra {
    Tessellation(TessKey),
    EBody(EBodyKey),
}

impl From<ModelExtra> for ObjectKey {
    fn from(extra: ModelExtra) -> Self {
        match extra {
            ModelExtra::Tessellation(k) => ObjectKey::Tessellation(k),
            ModelExtra::EBody(k) => ObjectKey::EBody(k),
        }
    }
}

/// Data stored for a model.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub bodies: Vec<BodyKey>,
    pub extras: Vec<ModelExtra>,
    pub bbox: BoundingBox,
}

impl ModelData {
    /// Total number of children: plain bodies plus trailing companions.
    pub fn child_count(&self) -> usize {
        self.bodies.len() + self.extras.len()
    }
}

/// The central arena that owns every object of one or more models.
///
/// # Example
///
/// ```
/// use egads_lite_topology::BrepArena;
///
/// let mut arena = BrepArena::new();
/// let n0 = arena.add_node([0.0, 0.0, 0.0]);
/// let n1 = arena.add_node([1.0, 0.0, 0.0]);
///
/// assert_eq!(arena.node_count(), 2);
/// assert_ne!(n0, n1);
/// ```
#[derive(Debug, Default)]
pub struct BrepArena {
    pub(crate) geometry: SlotMap<GeomKey, GeometryData>,
    pub(crate) nodes: SlotMap<NodeKey, NodeData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) loops: SlotMap<LoopKey, LoopData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) shells: SlotMap<ShellKey, ShellData>,
    pub(crate) bodies: SlotMap<BodyKey, BodyData>,
    pub(crate) models: SlotMap<ModelKey, ModelData>,
    pub(crate) tessellations: SlotMap<TessKey, TessData>,
    pub(crate) ebodies: SlotMap<EBodyKey, EBodyData>,

    pub(crate) attributes: FxHashMap<ObjectKey, Attributes>,
}

impl BrepArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self, key: GeomKey) -> Result<&GeometryData> {
        self.geometry.get(key).ok_or(Error::GeometryNotFound(key))
    }

    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    pub fn node(&self, key: NodeKey) -> Result<&NodeData> {
        self.nodes.get(key).ok_or(Error::NodeNotFound(key))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge(&self, key: EdgeKey) -> Result<&EdgeData> {
        self.edges.get(key).ok_or(Error::EdgeNotFound(key))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn loop_(&self, key: LoopKey) -> Result<&LoopData> {
        self.loops.get(key).ok_or(Error::LoopNotFound(key))
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn face(&self, key: FaceKey) -> Result<&FaceData> {
        self.faces.get(key).ok_or(Error::FaceNotFound(key))
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn shell(&self, key: ShellKey) -> Result<&ShellData> {
        self.shells.get(key).ok_or(Error::ShellNotFound(key))
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    pub fn body(&self, key: BodyKey) -> Result<&BodyData> {
        self.bodies.get(key).ok_or(Error::BodyNotFound(key))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn model(&self, key: ModelKey) -> Result<&ModelData> {
        self.models.get(key).ok_or(Error::ModelNotFound(key))
    }

    pub fn tessellation(&self, key: TessKey) -> Result<&TessData> {
        self.tessellations
            .get(key)
            .ok_or(Error::TessellationNotFound(key))
    }

    pub fn ebody(&self, key: EBodyKey) -> Result<&EBodyData> {
        self.ebodies.get(key).ok_or(Error::EBodyNotFound(key))
    }

    /// Returns `true` if the given key references a live object.
    pub fn contains(&self, key: ObjectKey) -> bool {
        match key {
            ObjectKey::Geometry(k) => self.geometry.contains_key(k),
            ObjectKey::Node(k) => self.nodes.contains_key(k),
            ObjectKey::Edge(k) => self.edges.contains_key(k),
            ObjectKey::Loop(k) => self.loops.contains_key(k),
            ObjectKey::Face(k) => self.faces.contains_key(k),
            ObjectKey::Shell(k) => self.shells.contains_key(k),
            ObjectKey::Body(k) => self.bodies.contains_key(k),
            ObjectKey::Model(k) => self.models.contains_key(k),
            ObjectKey::Tessellation(k) => self.tessellations.contains_key(k),
            ObjectKey::EBody(k) => self.ebodies.contains_key(k),
        }
    }

    /// Returns the class tag of an object.
    pub fn object_class(&self, key: ObjectKey) -> Result<ObjectClass> {
        Ok(match key {
            ObjectKey::Geometry(k) => self.geometry(k)?.class,
            ObjectKey::Node(_) => ObjectClass::Node,
            ObjectKey::Edge(_) => ObjectClass::Edge,
            ObjectKey::Loop(_) => ObjectClass::Loop,
            ObjectKey::Face(_) => ObjectClass::Face,
            ObjectKey::Shell(_) => ObjectClass::Shell,
            ObjectKey::Body(_) => ObjectClass::Body,
            ObjectKey::Model(_) => ObjectClass::Model,
            ObjectKey::Tessellation(_) => ObjectClass::Tessellation,
            ObjectKey::EBody(_) => ObjectClass::EBody,
        })
    }

    /// Returns the bounding box of a topological object or model.
    pub fn bounding_box(&self, key: impl Into<ObjectKey>) -> Result<BoundingBox> {
        let key = key.into();
        Ok(match key {
            ObjectKey::Node(k) => {
                let p = self.node(k)?.point;
                [p[0], p[1], p[2], p[0], p[1], p[2]]
            }
            ObjectKey::Edge(k) => self.edge(k)?.bbox,
            ObjectKey::Loop(k) => self.loop_(k)?.bbox,
            ObjectKey::Face(k) => self.face(k)?.bbox,
            ObjectKey::Shell(k) => self.shell(k)?.bbox,
            ObjectKey::Body(k) => self.body(k)?.bbox,
            ObjectKey::Model(k) => self.model(k)?.bbox,
            _ => return Err(Error::NotFound(key)),
        })
    }

    /// Overrides the computed bounding box of a topological object or model.
    pub fn set_bounding_box(&mut self, key: impl Into<ObjectKey>, bbox: BoundingBox) -> Result<()> {
        let key = key.into();
        let slot = match key {
            ObjectKey::Edge(k) => self.edges.get_mut(k).map(|d| &mut d.bbox),
            ObjectKey::Loop(k) => self.loops.get_mut(k).map(|d| &mut d.bbox),
            ObjectKey::Face(k) => self.faces.get_mut(k).map(|d| &mut d.bbox),
            ObjectKey::Shell(k) => self.shells.get_mut(k).map(|d| &mut d.bbox),
            ObjectKey::Body(k) => self.bodies.get_mut(k).map(|d| &mut d.bbox),
            ObjectKey::Model(k) => self.models.get_mut(k).map(|d| &mut d.bbox),
            _ => None,
        };
        *slot.ok_or(Error::NotFound(key))? = bbox;
        Ok(())
    }

    /// Returns the tolerance of a node, edge or face.
    pub fn tolerance(&self, key: impl Into<ObjectKey>) -> Result<f64> {
        let key = key.into();
        match key {
            ObjectKey::Node(k) => Ok(self.node(k)?.tolerance),
            ObjectKey::Edge(k) => Ok(self.edge(k)?.tolerance),
            ObjectKey::Face(k) => Ok(self.face(k)?.tolerance),
            _ => Err(Error::NotFound(key)),
        }
    }

    /// Sets the tolerance of a node, edge or face.
    pub fn set_tolerance(&mut self, key: impl Into<ObjectKey>, tolerance: f64) -> Result<()> {
        let key = key.into();
        let slot = match key {
            ObjectKey::Node(k) => self.nodes.get_mut(k).map(|d| &mut d.tolerance),
            ObjectKey::Edge(k) => self.edges.get_mut(k).map(|d| &mut d.tolerance),
            ObjectKey::Face(k) => self.faces.get_mut(k).map(|d| &mut d.tolerance),
            _ => None,
        };
        *slot.ok_or(Error::NotFound(key))? = tolerance;
        Ok(())
    }
}
