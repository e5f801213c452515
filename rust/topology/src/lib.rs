// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # EGADS-Lite Topology
//!
//! In-memory boundary representation (B-Rep) source model for the
//! EGADS-lite exporter.
//!
//! Every object (parametric geometry, nodes, edges, loops, faces, shells,
//! bodies, tessellations, effective bodies and models) lives in a single
//! [`BrepArena`] and is addressed by a typed generational key. Geometry is
//! shared between topological objects simply by storing the same
//! [`GeomKey`] in each of them.
//!
//! The crate also provides what the exporter needs from a geometry kernel:
//! deterministic per-body enumeration ([`BrepArena::body_topology`]),
//! geometric equivalence ([`BrepArena::is_same_geometry`]) and periodic
//! B-spline flattening ([`GeometryData::flattened`]).

pub mod arena;
pub mod attributes;
pub mod construction;
pub mod effective;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod keys;
pub mod serialization;
pub mod tessellation;
pub mod traversal;

pub use arena::{BodyShape, BoundingBox, BrepArena, ModelExtra};
pub use attributes::{AttrValue, Attribute, Attributes};
pub use effective::{
    EBodyData, EEdge, EEdgeSeg, EFace, ELoop, EShell, EdgeSegment, Patch, RawEdge, UvBFace, UvRemap,
};
pub use error::{Error, Result};
pub use geometry::{CurveType, GeometryData, Layout, SurfaceType};
pub use keys::{
    BodyKey, BodyType, Closure, EBodyKey, EdgeKey, EdgeType, FaceKey, FaceSense, GeomKey, LoopKey,
    ModelKey, NodeKey, ObjectClass, ObjectKey, ShellKey, TessKey,
};
pub use tessellation::{EdgeTess, FaceTess, TessData};
pub use traversal::{BodyTopology, SiblingList};
