// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures and a stream decoder for export tests.

#![allow(dead_code)]

use std::io::Cursor;

use byteorder::{NativeEndian, ReadBytesExt};
use egads_lite_topology::{
    BodyKey, BrepArena, EdgeKey, FaceKey, FaceSense, GeomKey, GeometryData, NodeKey, ObjectClass,
    ShellKey,
};

// ============================================================================
// Fixtures
// ============================================================================

pub struct Quad {
    pub body: BodyKey,
    pub face: FaceKey,
    pub plane: GeomKey,
    pub edges: Vec<EdgeKey>,
    pub nodes: Vec<NodeKey>,
}

/// A unit square on the z = 0 plane as a FaceBody: four nodes, four line
/// edges with matching pcurves, one loop, one face.
pub fn quad(arena: &mut BrepArena) -> Quad {
    let corners = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let plane = arena
        .add_geometry(GeometryData::plane(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ))
        .unwrap();
    let nodes: Vec<_> = corners
        .iter()
        .map(|c| arena.add_node([c[0], c[1], 0.0]))
        .collect();

    let mut edges = Vec::new();
    let mut pcurves = Vec::new();
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        let dir = [b[0] - a[0], b[1] - a[1]];
        let curve = arena
            .add_geometry(
                GeometryData::line(
                    ObjectClass::Curve,
                    &[a[0], a[1], 0.0],
                    &[dir[0], dir[1], 0.0],
                )
                .unwrap(),
            )
            .unwrap();
        let pcurve = arena
            .add_geometry(GeometryData::line(ObjectClass::PCurve, &a, &dir).unwrap())
            .unwrap();
        edges.push(
            arena
                .add_edge(curve, &[nodes[i], nodes[(i + 1) % 4]], [0.0, 1.0])
                .unwrap(),
        );
        pcurves.push(pcurve);
    }

    let signed: Vec<_> = edges.iter().map(|&e| (e, 1)).collect();
    let lp = arena.add_loop(Some(plane), &signed, &pcurves).unwrap();
    let face = arena
        .add_face(plane, FaceSense::Forward, &[(lp, 1)], [0.0, 1.0, 0.0, 1.0])
        .unwrap();
    let body = arena.add_face_body(&[face]).unwrap();

    Quad {
        body,
        face,
        plane,
        edges,
        nodes,
    }
}

pub struct Tetra {
    pub body: BodyKey,
    pub shell: ShellKey,
    pub faces: Vec<FaceKey>,
    /// `e01, e12, e02, e03, e13, e23`, the order the body enumerates them.
    pub edges: Vec<EdgeKey>,
    pub nodes: Vec<NodeKey>,
}

/// Corner triples of the tetrahedron faces, each walked `a -> b -> c`.
pub const TETRA_FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];

/// A solid tetrahedron on the corners of the unit simplex. Every edge is
/// shared by exactly two faces. Each face lies on its own plane spanned by
/// `b - a` and `c - a`, so its corners sit at uv (0,0), (1,0) and (0,1).
pub fn tetra(arena: &mut BrepArena) -> Tetra {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let nodes: Vec<_> = points.iter().map(|&p| arena.add_node(p)).collect();
    let sub = |a: [f64; 3], b: [f64; 3]| [b[0] - a[0], b[1] - a[1], b[2] - a[2]];

    let pairs = [(0, 1), (1, 2), (0, 2), (0, 3), (1, 3), (2, 3)];
    let edges: Vec<_> = pairs
        .iter()
        .map(|&(i, j)| {
            let line =
                GeometryData::line(ObjectClass::Curve, &points[i], &sub(points[i], points[j]))
                    .unwrap();
            let curve = arena.add_geometry(line).unwrap();
            arena
                .add_edge(curve, &[nodes[i], nodes[j]], [0.0, 1.0])
                .unwrap()
        })
        .collect();

    let uv = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
    let faces = TETRA_FACES
        .iter()
        .map(|&corners| {
            let [a, b, c] = corners.map(|i| points[i]);
            let plane = arena
                .add_geometry(GeometryData::plane(a, sub(a, b), sub(a, c)))
                .unwrap();
            let mut signed = Vec::new();
            let mut pcurves = Vec::new();
            for k in 0..3 {
                let (from, to) = (k, (k + 1) % 3);
                let (i, j) = (corners[from], corners[to]);
                let (e, sense, start, end) = match pairs.iter().position(|&p| p == (i, j)) {
                    Some(e) => (e, 1, from, to),
                    None => {
                        let e = pairs.iter().position(|&p| p == (j, i)).unwrap();
                        (e, -1, to, from)
                    }
                };
                // the pcurve follows the edge's own direction
                let dir = [uv[end][0] - uv[start][0], uv[end][1] - uv[start][1]];
                let pcurve = GeometryData::line(ObjectClass::PCurve, &uv[start], &dir).unwrap();
                pcurves.push(arena.add_geometry(pcurve).unwrap());
                signed.push((edges[e], sense));
            }
            let lp = arena.add_loop(Some(plane), &signed, &pcurves).unwrap();
            arena
                .add_face(plane, FaceSense::Forward, &[(lp, 1)], [0.0, 1.0, 0.0, 1.0])
                .unwrap()
        })
        .collect::<Vec<_>>();

    let shell = arena.add_shell(&faces).unwrap();
    let body = arena.add_solid_body(&[(shell, 1)]).unwrap();
    Tetra {
        body,
        shell,
        faces,
        edges,
        nodes,
    }
}

/// A full unit circle as one closed edge of a wire body.
pub fn circle_wire(arena: &mut BrepArena) -> (BodyKey, EdgeKey) {
    let circle = arena
        .add_geometry(
            GeometryData::circle(
                ObjectClass::Curve,
                &[0.0, 0.0, 0.0],
                &[1.0, 0.0, 0.0],
                &[0.0, 1.0, 0.0],
                1.0,
            )
            .unwrap(),
        )
        .unwrap();
    let node = arena.add_node([1.0, 0.0, 0.0]);
    let edge = arena
        .add_edge(circle, &[node], [0.0, 2.0 * std::f64::consts::PI])
        .unwrap();
    let lp = arena.add_loop(None, &[(edge, 1)], &[]).unwrap();
    (arena.add_wire_body(lp).unwrap(), edge)
}

/// A periodic cubic B-spline curve over uniform knots 0..=9, with a
/// parameter domain of [3, 6].
pub fn periodic_spline(arena: &mut BrepArena) -> GeomKey {
    let knots: Vec<f64> = (0..10).map(f64::from).collect();
    let cps = [
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        -1.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        -1.0, 0.0, 0.0,
    ];
    arena
        .add_geometry(
            GeometryData::bspline_curve(ObjectClass::Curve, 3, &knots, &cps, None, true).unwrap(),
        )
        .unwrap()
}

/// A wire body whose single closed edge lies on `curve`.
pub fn closed_wire_on(arena: &mut BrepArena, curve: GeomKey, trange: [f64; 2]) -> BodyKey {
    let node = arena.add_node([0.0, 0.0, 0.0]);
    let edge = arena.add_edge(curve, &[node], trange).unwrap();
    let lp = arena.add_loop(None, &[(edge, 1)], &[]).unwrap();
    arena.add_wire_body(lp).unwrap()
}

// ============================================================================
// Decoder
// ============================================================================

/// Cursor over a native-endian export stream.
pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn int(&mut self) -> i32 {
        self.cursor.read_i32::<NativeEndian>().unwrap()
    }

    pub fn ints(&mut self, n: usize) -> Vec<i32> {
        (0..n).map(|_| self.int()).collect()
    }

    pub fn real(&mut self) -> f64 {
        self.cursor.read_f64::<NativeEndian>().unwrap()
    }

    pub fn reals(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.real()).collect()
    }

    pub fn count(&mut self) -> usize {
        usize::try_from(self.int()).unwrap()
    }

    pub fn string(&mut self) -> Option<String> {
        let len = self.count();
        if len == 0 {
            return None;
        }
        let mut bytes: Vec<u8> = (0..len).map(|_| self.cursor.read_u8().unwrap()).collect();
        assert_eq!(bytes.pop(), Some(0), "string is NUL terminated");
        Some(String::from_utf8(bytes).unwrap())
    }

    /// Reads an attribute table, returning `(type, length, name, reals)`
    /// per entry; `reals` holds the real payload including csys frames.
    pub fn attributes(&mut self) -> Vec<(i32, usize, Option<String>, Vec<f64>)> {
        let n = self.count();
        (0..n)
            .map(|_| {
                let ty = self.int();
                let len = self.count();
                let name = self.string();
                let mut reals = Vec::new();
                match ty {
                    1 => {
                        self.ints(len);
                    }
                    2 => reals = self.reals(len),
                    3 => {
                        self.string();
                    }
                    12 => reals = self.reals(len + 12),
                    other => panic!("unexpected attribute type {other}"),
                }
                (ty, len, name, reals)
            })
            .collect()
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn at_end(&self) -> bool {
        self.position() == self.cursor.get_ref().len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeomRecord {
    pub mtype: i32,
    pub reference: i32,
    pub ints: Vec<i32>,
    pub reals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub mtype: i32,
    pub curve: i32,
    pub nodes: [i32; 2],
    pub trange: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopRecord {
    pub mtype: i32,
    pub surface: i32,
    pub senses: Vec<i32>,
    pub edges: Vec<i32>,
    pub pcurves: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceRecord {
    pub mtype: i32,
    pub surface: i32,
    pub senses: Vec<i32>,
    pub loops: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRecord {
    pub mtype: i32,
    pub counts: Vec<usize>,
    pub pcurves: Vec<GeomRecord>,
    pub curves: Vec<GeomRecord>,
    pub surfaces: Vec<GeomRecord>,
    pub nodes: Vec<[f64; 3]>,
    pub edges: Vec<EdgeRecord>,
    pub loops: Vec<LoopRecord>,
    pub faces: Vec<FaceRecord>,
    pub shells: Vec<Vec<i32>>,
    pub senses: Vec<i32>,
}

impl Reader<'_> {
    pub fn geometry(&mut self) -> GeomRecord {
        let mtype = self.int();
        let reference = self.int();
        let nint = self.count();
        let nreal = self.count();
        GeomRecord {
            mtype,
            reference,
            ints: self.ints(nint),
            reals: self.reals(nreal),
        }
    }

    pub fn body(&mut self) -> BodyRecord {
        let mtype = self.int();
        let counts: Vec<usize> = (0..8).map(|_| self.count()).collect();
        let pcurves = (0..counts[0]).map(|_| self.geometry()).collect();
        let curves = (0..counts[1]).map(|_| self.geometry()).collect();
        let surfaces = (0..counts[2]).map(|_| self.geometry()).collect();

        let nodes = (0..counts[3])
            .map(|_| {
                let p = self.reals(3);
                self.real();
                self.attributes();
                [p[0], p[1], p[2]]
            })
            .collect();

        let edges = (0..counts[4])
            .map(|_| {
                let mtype = self.int();
                let curve = self.int();
                let nodes = [self.int(), self.int()];
                let trange = self.reals(2);
                self.reals(6);
                self.real();
                self.attributes();
                EdgeRecord {
                    mtype,
                    curve,
                    nodes,
                    trange,
                }
            })
            .collect();

        let loops = (0..counts[5])
            .map(|_| {
                let mtype = self.int();
                let n = self.count();
                let surface = self.int();
                self.reals(6);
                let senses = self.ints(n);
                let edges = self.ints(n);
                let pcurves = if surface != 0 { self.ints(n) } else { Vec::new() };
                self.attributes();
                LoopRecord {
                    mtype,
                    surface,
                    senses,
                    edges,
                    pcurves,
                }
            })
            .collect();

        let faces = (0..counts[6])
            .map(|_| {
                let mtype = self.int();
                let n = self.count();
                let surface = self.int();
                self.reals(4 + 6 + 1);
                let senses = self.ints(n);
                let loops = self.ints(n);
                self.attributes();
                FaceRecord {
                    mtype,
                    surface,
                    senses,
                    loops,
                }
            })
            .collect();

        let shells = (0..counts[7])
            .map(|_| {
                self.int();
                let n = self.count();
                self.reals(6);
                let faces = self.ints(n);
                self.attributes();
                faces
            })
            .collect();

        let senses = if mtype == 9 { self.ints(counts[7]) } else { Vec::new() };
        self.reals(6);
        self.attributes();

        BodyRecord {
            mtype,
            counts,
            pcurves,
            curves,
            surfaces,
            nodes,
            edges,
            loops,
            faces,
            shells,
            senses,
        }
    }

    /// Reads the model header and returns the body count.
    pub fn header(&mut self) -> usize {
        assert_eq!(self.int(), egads_lite_export::MAGIC);
        assert_eq!(self.ints(2), egads_lite_export::REVISION.to_vec());
        self.reals(6);
        let n = self.count();
        self.attributes();
        n
    }
}
