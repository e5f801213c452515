// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model construction and introspection.

use crate::keys::*;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced object was not found in the arena.
    #[error("object not found: {0:?}")]
    NotFound(ObjectKey),

    /// Geometry key not found in the arena.
    #[error("geometry not found: {0:?}")]
    GeometryNotFound(GeomKey),

    /// Node key not found in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Edge key not found in the arena.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Loop key not found in the arena.
    #[error("loop not found: {0:?}")]
    LoopNotFound(LoopKey),

    /// Face key not found in the arena.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// Shell key not found in the arena.
    #[error("shell not found: {0:?}")]
    ShellNotFound(ShellKey),

    /// Body key not found in the arena.
    #[error("body not found: {0:?}")]
    BodyNotFound(BodyKey),

    /// Tessellation key not found in the arena.
    #[error("tessellation not found: {0:?}")]
    TessellationNotFound(TessKey),

    /// Effective body key not found in the arena.
    #[error("effective body not found: {0:?}")]
    EBodyNotFound(EBodyKey),

    /// Model key not found in the arena.
    #[error("model not found: {0:?}")]
    ModelNotFound(ModelKey),

    /// A geometry object of one class was supplied where another is required.
    #[error("expected {expected} geometry, found {found}")]
    WrongClass {
        expected: ObjectClass,
        found: ObjectClass,
    },

    /// A geometry object violates the fixed per-type layout.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Edges in a loop are not connected end-to-end.
    #[error("loop edges are not connected: edge {0} endpoint does not match edge {1} startpoint")]
    DisconnectedLoop(usize, usize),

    /// A loop must have at least one edge.
    #[error("loop must have at least one edge")]
    EmptyLoop,

    /// A face must have at least one loop.
    #[error("face must have at least one loop")]
    EmptyFace,

    /// A loop on a surface needs exactly one pcurve per edge.
    #[error("loop has {edges} edges but {pcurves} pcurves")]
    PCurveMismatch { edges: usize, pcurves: usize },

    /// A face was given a loop that has no host surface.
    #[error("loop {0:?} has no surface and cannot bound a face")]
    LoopWithoutSurface(LoopKey),

    /// Senses must be +1 or -1.
    #[error("invalid sense {0}")]
    InvalidSense(i32),

    /// A shell must have at least one face.
    #[error("shell must have at least one face")]
    EmptyShell,

    /// A solid needs closed shells.
    #[error("shell is not closed: {0} boundary edges remain")]
    OpenShell(usize),

    /// A body must have at least one child.
    #[error("body must have at least one {0}")]
    EmptyBody(&'static str),

    /// A coordinate-system attribute needs origin, x and y directions.
    #[error("coordinate system needs at least 9 reals, got {0}")]
    InvalidCsys(usize),

    /// A periodic spline could not be flattened.
    #[error("flatten failed: {0}")]
    Flatten(String),

    /// Tessellation data does not match its body.
    #[error("invalid tessellation: {0}")]
    InvalidTessellation(String),

    /// Effective body data references something it should not.
    #[error("invalid effective body: {0}")]
    InvalidEBody(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
