// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discrete approximations of a body: edge polylines and face meshes.
//!
//! A tessellation is addressed by the same 1-based edge and face indices
//! that [`BrepArena::body_topology`] assigns to its body. Entries may be
//! empty; the exporter writes them as zero-length records.

use serde::{Deserialize, Serialize};

use crate::arena::{BodyShape, BrepArena};
use crate::error::{Error, Result};
use crate::keys::{BodyKey, TessKey};

/// Polyline of one edge: 3D points with their curve parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeTess {
    pub points: Vec<[f64; 3]>,
    pub params: Vec<f64>,
}

/// Triangulation of one face. Triangle vertices are 1-based into `points`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceTess {
    pub points: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    pub triangles: Vec<[i32; 3]>,
}

/// Data stored for a tessellation.
#[derive(Debug, Clone)]
pub struct TessData {
    pub body: BodyKey,
    /// One entry per body edge, in sibling order.
    pub edges: Vec<EdgeTess>,
    /// One entry per body face, in sibling order. Always empty for wire bodies.
    pub faces: Vec<FaceTess>,
}

impl EdgeTess {
    fn validate(&self, index: usize) -> Result<()> {
        if self.points.len() != self.params.len() {
            return Err(Error::InvalidTessellation(format!(
                "edge {index}: {} points but {} parameters",
                self.points.len(),
                self.params.len()
            )));
        }
        Ok(())
    }
}

impl FaceTess {
    fn validate(&self, index: usize) -> Result<()> {
        if self.points.len() != self.uvs.len() {
            return Err(Error::InvalidTessellation(format!(
                "face {index}: {} points but {} uvs",
                self.points.len(),
                self.uvs.len()
            )));
        }
        let np = self.points.len() as i64;
        if let Some(bad) = self
            .triangles
            .iter()
            .flatten()
            .find(|&&v| v < 1 || i64::from(v) > np)
        {
            return Err(Error::InvalidTessellation(format!(
                "face {index}: triangle vertex {bad} outside 1..={np}"
            )));
        }
        Ok(())
    }
}

impl BrepArena {
    /// Attaches a tessellation to `body`.
    ///
    /// The number of edge and face entries must match the body's own edge
    /// and face counts.
    pub fn add_tessellation(
        &mut self,
        body: BodyKey,
        edges: Vec<EdgeTess>,
        faces: Vec<FaceTess>,
    ) -> Result<TessKey> {
        let topo = self.body_topology(body)?;
        if edges.len() != topo.edges.len() {
            return Err(Error::InvalidTessellation(format!(
                "body has {} edges, tessellation has {}",
                topo.edges.len(),
                edges.len()
            )));
        }
        let nface = match self.body(body)?.shape {
            BodyShape::Wire(_) => 0,
            _ => topo.faces.len(),
        };
        if faces.len() != nface {
            return Err(Error::InvalidTessellation(format!(
                "body has {nface} faces, tessellation has {}",
                faces.len()
            )));
        }
        for (i, e) in edges.iter().enumerate() {
            e.validate(i + 1)?;
        }
        for (i, f) in faces.iter().enumerate() {
            f.validate(i + 1)?;
        }

        Ok(self.tessellations.insert(TessData { body, edges, faces }))
    }
}

impl TessData {
    /// Returns the polyline of a 1-based edge index.
    pub fn edge_tessellation(&self, index: usize) -> Option<&EdgeTess> {
        index.checked_sub(1).and_then(|i| self.edges.get(i))
    }

    /// Returns the mesh of a 1-based face index.
    pub fn face_tessellation(&self, index: usize) -> Option<&FaceTess> {
        index.checked_sub(1).and_then(|i| self.faces.get(i))
    }
}
