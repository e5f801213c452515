// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage and the class/type tags shared with the
//! export format.
//!
//! Each entity gets a unique, type-safe key for O(1) lookup in the arena.
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! entities are removed (generational indices). All three geometry classes
//! (pcurves, curves, surfaces) share one key type because a basis reference
//! may cross classes (a surface of revolution references a curve).

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for a parametric geometry object (pcurve, curve or surface).
    pub struct GeomKey;

    /// Key for a node (point in 3D space with a tolerance).
    pub struct NodeKey;

    /// Key for an edge (bounded piece of a curve between nodes).
    pub struct EdgeKey;

    /// Key for a loop (signed, ordered chain of edges).
    pub struct LoopKey;

    /// Key for a face (trimmed surface bounded by loops).
    pub struct FaceKey;

    /// Key for a shell (set of connected faces).
    pub struct ShellKey;

    /// Key for a body (wire, face, sheet or solid).
    pub struct BodyKey;

    /// Key for a model (ordered collection of bodies and their companions).
    pub struct ModelKey;

    /// Key for a tessellation bound to a body.
    pub struct TessKey;

    /// Key for an effective body built on top of a source body.
    pub struct EBodyKey;
}

/// A key that can reference any object stored in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    Geometry(GeomKey),
    Node(NodeKey),
    Edge(EdgeKey),
    Loop(LoopKey),
    Face(FaceKey),
    Shell(ShellKey),
    Body(BodyKey),
    Model(ModelKey),
    Tessellation(TessKey),
    EBody(EBodyKey),
}

macro_rules! object_key_from {
    ($($key:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$key> for ObjectKey {
                fn from(k: $key) -> Self {
                    ObjectKey::$variant(k)
                }
            }
        )*
    };
}

object_key_from! {
    GeomKey => Geometry,
    NodeKey => Node,
    EdgeKey => Edge,
    LoopKey => Loop,
    FaceKey => Face,
    ShellKey => Shell,
    BodyKey => Body,
    ModelKey => Model,
    TessKey => Tessellation,
    EBodyKey => EBody,
}

/// Object class tags as they appear in the export stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i32)]
pub enum ObjectClass {
    Tessellation = 2,
    PCurve = 10,
    Curve = 11,
    Surface = 12,
    Node = 20,
    Edge = 21,
    Loop = 22,
    Face = 23,
    Shell = 24,
    Body = 25,
    Model = 26,
    EEdge = 31,
    ELoop = 32,
    EFace = 33,
    EShell = 34,
    EBody = 35,
}

impl ObjectClass {
    /// Returns the integer tag written to the stream.
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Returns the class name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Tessellation => "Tessellation",
            ObjectClass::PCurve => "PCurve",
            ObjectClass::Curve => "Curve",
            ObjectClass::Surface => "Surface",
            ObjectClass::Node => "Node",
            ObjectClass::Edge => "Edge",
            ObjectClass::Loop => "Loop",
            ObjectClass::Face => "Face",
            ObjectClass::Shell => "Shell",
            ObjectClass::Body => "Body",
            ObjectClass::Model => "Model",
            ObjectClass::EEdge => "EEdge",
            ObjectClass::ELoop => "ELoop",
            ObjectClass::EFace => "EFace",
            ObjectClass::EShell => "EShell",
            ObjectClass::EBody => "EBody",
        }
    }

    /// Returns `true` for the three parametric geometry classes.
    pub fn is_geometry(self) -> bool {
        matches!(
            self,
            ObjectClass::PCurve | ObjectClass::Curve | ObjectClass::Surface
        )
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge member types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum EdgeType {
    TwoNode = 1,
    OneNode = 2,
    Degenerate = 5,
}

/// Open/closed member type shared by loops and shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Closure {
    Open = 3,
    Closed = 4,
}

/// Face orientation relative to its surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FaceSense {
    Forward = 1,
    Reverse = -1,
}

/// Body member types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BodyType {
    WireBody = 6,
    FaceBody = 7,
    SheetBody = 8,
    SolidBody = 9,
}

impl BodyType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::WireBody => "WireBody",
            BodyType::FaceBody => "FaceBody",
            BodyType::SheetBody => "SheetBody",
            BodyType::SolidBody => "SolidBody",
        }
    }
}

impl std::fmt::Display for BodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
