// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for topology objects.
//!
//! Each object is created through the arena, which ensures referential
//! integrity (all referenced sub-objects and geometry must exist and belong
//! to the right class) and computes bounding boxes bottom-up.

use rustc_hash::FxHashMap;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

fn check_sense(sense: i32) -> Result<()> {
    if sense == 1 || sense == -1 {
        Ok(())
    } else {
        Err(Error::InvalidSense(sense))
    }
}

impl BrepArena {
    /// Adds a node at the given 3D point with the default tolerance.
    pub fn add_node(&mut self, point: [f64; 3]) -> NodeKey {
        self.nodes.insert(NodeData {
            point,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Creates an edge on a 3D curve.
    ///
    /// One node makes a closed (one-node) edge, two nodes an open one. The
    /// bounding box covers the nodes and, for spline curves, the control
    /// hull.
    pub fn add_edge(&mut self, curve: GeomKey, nodes: &[NodeKey], trange: [f64; 2]) -> Result<EdgeKey> {
        self.expect_class(curve, ObjectClass::Curve)?;
        let (mtype, pair) = match *nodes {
            [n] => (EdgeType::OneNode, [n, n]),
            [n0, n1] => (EdgeType::TwoNode, [n0, n1]),
            _ => {
                return Err(Error::InvalidGeometry(format!(
                    "an edge needs one or two nodes, got {}",
                    nodes.len()
                )))
            }
        };

        let mut bbox = empty_box();
        for &n in &pair {
            box_add_point(&mut bbox, self.node(n)?.point);
        }
        for p in self.geometry(curve)?.control_points() {
            box_add_point(&mut bbox, p);
        }

        Ok(self.edges.insert(EdgeData {
            mtype,
            curve: Some(curve),
            nodes: pair,
            trange,
            bbox: box_finish(bbox),
            tolerance: DEFAULT_TOLERANCE,
        }))
    }

    /// Creates a degenerate edge: a zero-length placeholder at `node` with
    /// no curve, such as the pole of a sphere.
    pub fn add_degenerate_edge(&mut self, node: NodeKey, trange: [f64; 2]) -> Result<EdgeKey> {
        let p = self.node(node)?.point;
        Ok(self.edges.insert(EdgeData {
            mtype: EdgeType::Degenerate,
            curve: None,
            nodes: [node, node],
            trange,
            bbox: [p[0], p[1], p[2], p[0], p[1], p[2]],
            tolerance: DEFAULT_TOLERANCE,
        }))
    }

    /// Creates a loop from signed edges.
    ///
    /// The edges must form a connected chain when walked with their senses.
    /// The loop is closed when the chain returns to its first node. A loop
    /// on a surface needs one pcurve per edge; a free loop takes none.
    pub fn add_loop(
        &mut self,
        surface: Option<GeomKey>,
        edges: &[(EdgeKey, i32)],
        pcurves: &[GeomKey],
    ) -> Result<LoopKey> {
        if edges.is_empty() {
            return Err(Error::EmptyLoop);
        }
        match surface {
            Some(s) => {
                self.expect_class(s, ObjectClass::Surface)?;
                if pcurves.len() != edges.len() {
                    return Err(Error::PCurveMismatch {
                        edges: edges.len(),
                        pcurves: pcurves.len(),
                    });
                }
                for &pc in pcurves {
                    self.expect_class(pc, ObjectClass::PCurve)?;
                }
            }
            None if !pcurves.is_empty() => {
                return Err(Error::PCurveMismatch {
                    edges: edges.len(),
                    pcurves: pcurves.len(),
                });
            }
            None => {}
        }

        let mut bbox = empty_box();
        let mut ends = Vec::with_capacity(edges.len());
        for &(ek, sense) in edges {
            check_sense(sense)?;
            let edge = self.edge(ek)?;
            box_union(&mut bbox, &edge.bbox);
            let [n0, n1] = edge.nodes;
            ends.push(if sense > 0 { (n0, n1) } else { (n1, n0) });
        }

        for i in 1..ends.len() {
            if ends[i - 1].1 != ends[i].0 {
                return Err(Error::DisconnectedLoop(i - 1, i));
            }
        }
        let mtype = if ends[ends.len() - 1].1 == ends[0].0 {
            Closure::Closed
        } else {
            Closure::Open
        };

        Ok(self.loops.insert(LoopData {
            mtype,
            surface,
            edges: edges.iter().map(|&(e, _)| e).collect(),
            senses: edges.iter().map(|&(_, s)| s).collect(),
            pcurves: pcurves.to_vec(),
            bbox: box_finish(bbox),
        }))
    }

    /// Creates a face on `surface` bounded by signed loops (`+1` outer,
    /// `-1` inner). Every loop must lie on a surface.
    pub fn add_face(
        &mut self,
        surface: GeomKey,
        sense: FaceSense,
        loops: &[(LoopKey, i32)],
        uvbox: [f64; 4],
    ) -> Result<FaceKey> {
        if loops.is_empty() {
            return Err(Error::EmptyFace);
        }
        self.expect_class(surface, ObjectClass::Surface)?;

        let mut bbox = empty_box();
        for &(lk, s) in loops {
            check_sense(s)?;
            let lp = self.loop_(lk)?;
            if lp.surface.is_none() {
                return Err(Error::LoopWithoutSurface(lk));
            }
            box_union(&mut bbox, &lp.bbox);
        }

        Ok(self.faces.insert(FaceData {
            mtype: sense,
            surface,
            loops: loops.iter().map(|&(l, _)| l).collect(),
            senses: loops.iter().map(|&(_, s)| s).collect(),
            uvbox,
            bbox: box_finish(bbox),
            tolerance: DEFAULT_TOLERANCE,
        }))
    }

    /// Creates a shell from faces.
    ///
    /// The shell is closed when every non-degenerate edge of its faces is
    /// used exactly twice.
    pub fn add_shell(&mut self, faces: &[FaceKey]) -> Result<ShellKey> {
        if faces.is_empty() {
            return Err(Error::EmptyShell);
        }

        let mut bbox = empty_box();
        let mut usage: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &fk in faces {
            let face = self.face(fk)?;
            box_union(&mut bbox, &face.bbox);
            for &lk in &face.loops {
                for &ek in &self.loop_(lk)?.edges {
                    if self.edge(ek)?.mtype != EdgeType::Degenerate {
                        *usage.entry(ek).or_default() += 1;
                    }
                }
            }
        }
        let mtype = if usage.values().all(|&n| n == 2) {
            Closure::Closed
        } else {
            Closure::Open
        };

        Ok(self.shells.insert(ShellData {
            mtype,
            faces: faces.to_vec(),
            bbox: box_finish(bbox),
        }))
    }

    /// Number of edges in a shell that are not shared by exactly two faces.
    pub fn shell_boundary_edges(&self, shell: ShellKey) -> Result<usize> {
        let mut usage: FxHashMap<EdgeKey, usize> = FxHashMap::default();
        for &fk in &self.shell(shell)?.faces {
            for &lk in &self.face(fk)?.loops {
                for &ek in &self.loop_(lk)?.edges {
                    if self.edge(ek)?.mtype != EdgeType::Degenerate {
                        *usage.entry(ek).or_default() += 1;
                    }
                }
            }
        }
        Ok(usage.values().filter(|&&n| n != 2).count())
    }

    /// Creates a wire body from a single loop without a surface.
    pub fn add_wire_body(&mut self, wire: LoopKey) -> Result<BodyKey> {
        let lp = self.loop_(wire)?;
        if lp.surface.is_some() {
            return Err(Error::InvalidGeometry(
                "a wire body loop must not lie on a surface".into(),
            ));
        }
        let bbox = lp.bbox;
        Ok(self.bodies.insert(BodyData {
            mtype: BodyType::WireBody,
            shape: BodyShape::Wire(wire),
            senses: Vec::new(),
            bbox,
        }))
    }

    /// Creates a face body from one or more faces.
    pub fn add_face_body(&mut self, faces: &[FaceKey]) -> Result<BodyKey> {
        if faces.is_empty() {
            return Err(Error::EmptyBody("face"));
        }
        let mut bbox = empty_box();
        for &fk in faces {
            box_union(&mut bbox, &self.face(fk)?.bbox);
        }
        Ok(self.bodies.insert(BodyData {
            mtype: BodyType::FaceBody,
            shape: BodyShape::Faces(faces.to_vec()),
            senses: Vec::new(),
            bbox: box_finish(bbox),
        }))
    }

    /// Creates a sheet body from (typically open) shells.
    pub fn add_sheet_body(&mut self, shells: &[ShellKey]) -> Result<BodyKey> {
        if shells.is_empty() {
            return Err(Error::EmptyBody("shell"));
        }
        let bbox = self.shells_box(shells)?;
        Ok(self.bodies.insert(BodyData {
            mtype: BodyType::SheetBody,
            shape: BodyShape::Shells(shells.to_vec()),
            senses: Vec::new(),
            bbox,
        }))
    }

    /// Creates a solid body from closed shells with senses (`+1` for the
    /// outer shell, `-1` for voids).
    pub fn add_solid_body(&mut self, shells: &[(ShellKey, i32)]) -> Result<BodyKey> {
        if shells.is_empty() {
            return Err(Error::EmptyBody("shell"));
        }
        for &(sk, sense) in shells {
            check_sense(sense)?;
            if self.shell(sk)?.mtype != Closure::Closed {
                return Err(Error::OpenShell(self.shell_boundary_edges(sk)?));
            }
        }
        let keys: Vec<ShellKey> = shells.iter().map(|&(s, _)| s).collect();
        let bbox = self.shells_box(&keys)?;
        Ok(self.bodies.insert(BodyData {
            mtype: BodyType::SolidBody,
            shape: BodyShape::Shells(keys),
            senses: shells.iter().map(|&(_, s)| s).collect(),
            bbox,
        }))
    }

    fn shells_box(&self, shells: &[ShellKey]) -> Result<BoundingBox> {
        let mut bbox = empty_box();
        for &sk in shells {
            box_union(&mut bbox, &self.shell(sk)?.bbox);
        }
        Ok(box_finish(bbox))
    }

    /// Creates a model from plain bodies followed by trailing tessellations
    /// and effective bodies.
    ///
    /// Trailing children are not checked against `bodies`; a companion of a
    /// body outside the model is reported when the model is exported.
    pub fn add_model(&mut self, bodies: &[BodyKey], extras: &[ModelExtra]) -> Result<ModelKey> {
        let mut bbox = empty_box();
        for &bk in bodies {
            box_union(&mut bbox, &self.body(bk)?.bbox);
        }
        for &extra in extras {
            let key = ObjectKey::from(extra);
            if !self.contains(key) {
                return Err(Error::NotFound(key));
            }
        }
        Ok(self.models.insert(ModelData {
            bodies: bodies.to_vec(),
            extras: extras.to_vec(),
            bbox: box_finish(bbox),
        }))
    }
}
