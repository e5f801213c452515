// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric geometry: pcurves, curves and surfaces.
//!
//! Every geometry object is stored in the flat form the export stream uses:
//! a member type, an optional basis reference, an integer vector and a real
//! vector. The per-type vector lengths form a fixed layout table that is not
//! derivable from any general rule, so it is spelled out in [`layout`].
//!
//! Spline reals are ordered knots, control points, then weights. Surface
//! control points run with u varying fastest. Periodic splines are stored
//! unclamped: `nknots == ncp + degree + 1` and the valid parameter domain
//! is `[knots[degree], knots[ncp]]`.

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::keys::{GeomKey, ObjectClass};

/// Spline flag bit: control points carry weights.
pub const FLAG_RATIONAL: i32 = 2;
/// Spline flag bit: periodic (u direction for surfaces).
pub const FLAG_PERIODIC: i32 = 4;
/// Spline flag bit: periodic in v (surfaces only).
pub const FLAG_V_PERIODIC: i32 = 8;
/// Spline flag bit: this record was flattened from a periodic spline.
pub const FLAG_FLATTENED: i32 = 16;

/// Member types of pcurves and curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CurveType {
    Line = 1,
    Circle = 2,
    Ellipse = 3,
    Parabola = 4,
    Hyperbola = 5,
    Trimmed = 6,
    Bezier = 7,
    BSpline = 8,
    Offset = 9,
}

impl CurveType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            1 => CurveType::Line,
            2 => CurveType::Circle,
            3 => CurveType::Ellipse,
            4 => CurveType::Parabola,
            5 => CurveType::Hyperbola,
            6 => CurveType::Trimmed,
            7 => CurveType::Bezier,
            8 => CurveType::BSpline,
            9 => CurveType::Offset,
            _ => return None,
        })
    }
}

/// Member types of surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SurfaceType {
    Plane = 1,
    Spherical = 2,
    Cylindrical = 3,
    Revolution = 4,
    Toroidal = 5,
    Trimmed = 6,
    Bezier = 7,
    BSpline = 8,
    Offset = 9,
    Conical = 10,
    Extrusion = 11,
}

impl SurfaceType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            1 => SurfaceType::Plane,
            2 => SurfaceType::Spherical,
            3 => SurfaceType::Cylindrical,
            4 => SurfaceType::Revolution,
            5 => SurfaceType::Toroidal,
            6 => SurfaceType::Trimmed,
            7 => SurfaceType::Bezier,
            8 => SurfaceType::BSpline,
            9 => SurfaceType::Offset,
            10 => SurfaceType::Conical,
            11 => SurfaceType::Extrusion,
            _ => return None,
        })
    }
}

/// Expected vector lengths and basis requirement for one geometry object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub ints: usize,
    pub reals: usize,
    /// Class the basis reference must belong to, if the type needs one.
    pub basis: Option<ObjectClass>,
}

fn unknown(class: ObjectClass, mtype: i32) -> Error {
    Error::InvalidGeometry(format!("unknown {class} type {mtype}"))
}

/// Reads a fixed-size spline header, rejecting negative entries.
fn header<const N: usize>(ints: &[i32]) -> Result<[usize; N]> {
    if ints.len() != N {
        return Err(Error::InvalidGeometry(format!(
            "spline header needs {N} ints, got {}",
            ints.len()
        )));
    }
    let mut out = [0usize; N];
    for (slot, &v) in out.iter_mut().zip(ints) {
        *slot = usize::try_from(v)
            .map_err(|_| Error::InvalidGeometry(format!("negative spline header entry {v}")))?;
    }
    Ok(out)
}

/// Checks one parametric direction of a spline header.
fn spline_direction(degree: usize, ncp: usize, nknots: usize) -> Result<()> {
    if degree == 0 || ncp <= degree || nknots != ncp + degree + 1 {
        return Err(Error::InvalidGeometry(format!(
            "bspline of degree {degree} with {ncp} control points cannot have {nknots} knots"
        )));
    }
    Ok(())
}

fn bezier_direction(degree: usize, ncp: usize) -> Result<()> {
    if ncp != degree + 1 {
        return Err(Error::InvalidGeometry(format!(
            "bezier of degree {degree} cannot have {ncp} control points"
        )));
    }
    Ok(())
}

fn rational(flags: usize) -> usize {
    usize::from(flags & FLAG_RATIONAL as usize != 0)
}

/// Returns the fixed layout of a geometry object.
///
/// Spline layouts depend on the header in `ints`; every other type has a
/// constant layout.
pub fn layout(class: ObjectClass, mtype: i32, ints: &[i32]) -> Result<Layout> {
    let fixed = |reals: usize| Layout {
        ints: 0,
        reals,
        basis: None,
    };
    let based = |reals: usize, basis: ObjectClass| Layout {
        ints: 0,
        reals,
        basis: Some(basis),
    };

    match class {
        ObjectClass::PCurve | ObjectClass::Curve => {
            let dim = if class == ObjectClass::PCurve { 2 } else { 3 };
            let ty = CurveType::from_i32(mtype).ok_or_else(|| unknown(class, mtype))?;
            Ok(match ty {
                CurveType::Line => fixed(2 * dim),
                CurveType::Circle | CurveType::Parabola => fixed(3 * dim + 1),
                CurveType::Ellipse | CurveType::Hyperbola => fixed(3 * dim + 2),
                CurveType::Trimmed => based(2, class),
                CurveType::Offset => based(if dim == 2 { 1 } else { 4 }, class),
                CurveType::Bezier => {
                    let [flags, degree, ncp] = header::<3>(ints)?;
                    bezier_direction(degree, ncp)?;
                    Layout {
                        ints: 3,
                        reals: (dim + rational(flags)) * ncp,
                        basis: None,
                    }
                }
                CurveType::BSpline => {
                    let [flags, degree, ncp, nknots] = header::<4>(ints)?;
                    spline_direction(degree, ncp, nknots)?;
                    Layout {
                        ints: 4,
                        reals: nknots + (dim + rational(flags)) * ncp,
                        basis: None,
                    }
                }
            })
        }
        ObjectClass::Surface => {
            let ty = SurfaceType::from_i32(mtype).ok_or_else(|| unknown(class, mtype))?;
            Ok(match ty {
                SurfaceType::Plane => fixed(9),
                SurfaceType::Spherical => fixed(10),
                SurfaceType::Cylindrical => fixed(13),
                SurfaceType::Conical | SurfaceType::Toroidal => fixed(14),
                SurfaceType::Revolution => based(6, ObjectClass::Curve),
                SurfaceType::Extrusion => based(3, ObjectClass::Curve),
                SurfaceType::Trimmed => based(4, ObjectClass::Surface),
                SurfaceType::Offset => based(1, ObjectClass::Surface),
                SurfaceType::Bezier => {
                    let [flags, du, nu, dv, nv] = header::<5>(ints)?;
                    bezier_direction(du, nu)?;
                    bezier_direction(dv, nv)?;
                    Layout {
                        ints: 5,
                        reals: (3 + rational(flags)) * nu * nv,
                        basis: None,
                    }
                }
                SurfaceType::BSpline => {
                    let [flags, du, nu, nuk, dv, nv, nvk] = header::<7>(ints)?;
                    spline_direction(du, nu, nuk)?;
                    spline_direction(dv, nv, nvk)?;
                    Layout {
                        ints: 7,
                        reals: nuk + nvk + (3 + rational(flags)) * nu * nv,
                        basis: None,
                    }
                }
            })
        }
        other => Err(Error::InvalidGeometry(format!("{other} is not a geometry class"))),
    }
}

/// Data stored for a geometry object.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    pub class: ObjectClass,
    pub mtype: i32,
    /// The geometry this object is defined in terms of.
    pub basis: Option<GeomKey>,
    pub ints: Vec<i32>,
    pub reals: Vec<f64>,
}

fn dimension(class: ObjectClass) -> Result<usize> {
    match class {
        ObjectClass::PCurve => Ok(2),
        ObjectClass::Curve => Ok(3),
        other => Err(Error::InvalidGeometry(format!("{other} is not a curve class"))),
    }
}

fn check_len(what: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(Error::InvalidGeometry(format!(
            "{what} needs {expected} reals, got {}",
            values.len()
        )));
    }
    Ok(())
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidGeometry(format!("{value} exceeds int range")))
}

impl GeometryData {
    /// Creates a geometry object from raw parts without validation.
    pub fn new(
        class: ObjectClass,
        mtype: i32,
        basis: Option<GeomKey>,
        ints: Vec<i32>,
        reals: Vec<f64>,
    ) -> Self {
        Self {
            class,
            mtype,
            basis,
            ints,
            reals,
        }
    }

    /// A line through `point` along `dir` (pcurve or curve).
    pub fn line(class: ObjectClass, point: &[f64], dir: &[f64]) -> Result<Self> {
        let dim = dimension(class)?;
        check_len("line point", point, dim)?;
        check_len("line direction", dir, dim)?;
        let reals = point.iter().chain(dir).copied().collect();
        Ok(Self::new(class, CurveType::Line as i32, None, Vec::new(), reals))
    }

    /// A circle given its center, in-plane axes and radius.
    pub fn circle(
        class: ObjectClass,
        center: &[f64],
        xaxis: &[f64],
        yaxis: &[f64],
        radius: f64,
    ) -> Result<Self> {
        let dim = dimension(class)?;
        for (what, v) in [("center", center), ("x axis", xaxis), ("y axis", yaxis)] {
            check_len(what, v, dim)?;
        }
        let mut reals: Vec<f64> = center.iter().chain(xaxis).chain(yaxis).copied().collect();
        reals.push(radius);
        Ok(Self::new(class, CurveType::Circle as i32, None, Vec::new(), reals))
    }

    /// An ellipse given its center, axes and major/minor radii.
    pub fn ellipse(
        class: ObjectClass,
        center: &[f64],
        xaxis: &[f64],
        yaxis: &[f64],
        major: f64,
        minor: f64,
    ) -> Result<Self> {
        let mut data = Self::circle(class, center, xaxis, yaxis, major)?;
        data.mtype = CurveType::Ellipse as i32;
        data.reals.push(minor);
        Ok(data)
    }

    /// A Bezier curve with `dim`-wide control points and optional weights.
    pub fn bezier_curve(
        class: ObjectClass,
        degree: usize,
        cps: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<Self> {
        let dim = dimension(class)?;
        let ncp = cps.len() / dim;
        check_len("bezier control points", cps, ncp * dim)?;
        if ncp != degree + 1 {
            return Err(Error::InvalidGeometry(format!(
                "bezier of degree {degree} needs {} control points, got {ncp}",
                degree + 1
            )));
        }
        let mut flags = 0;
        let mut reals = cps.to_vec();
        if let Some(w) = weights {
            check_len("bezier weights", w, ncp)?;
            flags |= FLAG_RATIONAL;
            reals.extend_from_slice(w);
        }
        Ok(Self::new(
            class,
            CurveType::Bezier as i32,
            None,
            vec![flags, to_i32(degree)?, to_i32(ncp)?],
            reals,
        ))
    }

    /// A B-spline curve. Periodic curves use the unclamped convention.
    pub fn bspline_curve(
        class: ObjectClass,
        degree: usize,
        knots: &[f64],
        cps: &[f64],
        weights: Option<&[f64]>,
        periodic: bool,
    ) -> Result<Self> {
        let dim = dimension(class)?;
        let ncp = cps.len() / dim;
        check_len("bspline control points", cps, ncp * dim)?;
        check_len("bspline knots", knots, ncp + degree + 1)?;
        if degree == 0 || ncp <= degree {
            return Err(Error::InvalidGeometry(format!(
                "bspline of degree {degree} with {ncp} control points"
            )));
        }
        let mut flags = if periodic { FLAG_PERIODIC } else { 0 };
        let mut reals = knots.to_vec();
        reals.extend_from_slice(cps);
        if let Some(w) = weights {
            check_len("bspline weights", w, ncp)?;
            flags |= FLAG_RATIONAL;
            reals.extend_from_slice(w);
        }
        Ok(Self::new(
            class,
            CurveType::BSpline as i32,
            None,
            vec![flags, to_i32(degree)?, to_i32(ncp)?, to_i32(knots.len())?],
            reals,
        ))
    }

    /// A pcurve or curve restricted to `[t0, t1]` of its basis.
    pub fn trimmed(class: ObjectClass, basis: GeomKey, t0: f64, t1: f64) -> Self {
        Self::new(class, CurveType::Trimmed as i32, Some(basis), Vec::new(), vec![t0, t1])
    }

    /// A surface restricted to `[u0, u1, v0, v1]` of its basis.
    pub fn trimmed_surface(basis: GeomKey, range: [f64; 4]) -> Self {
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Trimmed as i32,
            Some(basis),
            Vec::new(),
            range.to_vec(),
        )
    }

    /// A plane through `origin` spanned by `xaxis` and `yaxis`.
    pub fn plane(origin: [f64; 3], xaxis: [f64; 3], yaxis: [f64; 3]) -> Self {
        let reals = [origin, xaxis, yaxis].concat();
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Plane as i32,
            None,
            Vec::new(),
            reals,
        )
    }

    /// A sphere given its center, equatorial axes and radius.
    pub fn sphere(center: [f64; 3], xaxis: [f64; 3], yaxis: [f64; 3], radius: f64) -> Self {
        let mut reals = [center, xaxis, yaxis].concat();
        reals.push(radius);
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Spherical as i32,
            None,
            Vec::new(),
            reals,
        )
    }

    /// A cylinder given its frame and radius.
    pub fn cylinder(
        center: [f64; 3],
        xaxis: [f64; 3],
        yaxis: [f64; 3],
        zaxis: [f64; 3],
        radius: f64,
    ) -> Self {
        let mut reals = [center, xaxis, yaxis, zaxis].concat();
        reals.push(radius);
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Cylindrical as i32,
            None,
            Vec::new(),
            reals,
        )
    }

    /// A cone given its frame, half angle and reference radius.
    pub fn cone(frame: [[f64; 3]; 4], angle: f64, radius: f64) -> Self {
        let mut reals = frame.concat();
        reals.extend([angle, radius]);
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Conical as i32,
            None,
            Vec::new(),
            reals,
        )
    }

    /// A torus given its frame, major and minor radii.
    pub fn torus(frame: [[f64; 3]; 4], major: f64, minor: f64) -> Self {
        let mut reals = frame.concat();
        reals.extend([major, minor]);
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Toroidal as i32,
            None,
            Vec::new(),
            reals,
        )
    }

    /// A surface swept by moving `curve` along `direction`.
    pub fn extrusion(curve: GeomKey, direction: [f64; 3]) -> Self {
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Extrusion as i32,
            Some(curve),
            Vec::new(),
            direction.to_vec(),
        )
    }

    /// A surface swept by rotating `curve` about the axis through `center`.
    pub fn revolution(curve: GeomKey, center: [f64; 3], axis: [f64; 3]) -> Self {
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Revolution as i32,
            Some(curve),
            Vec::new(),
            [center, axis].concat(),
        )
    }

    /// A surface offset from `basis` by `distance` along its normal.
    pub fn offset_surface(basis: GeomKey, distance: f64) -> Self {
        Self::new(
            ObjectClass::Surface,
            SurfaceType::Offset as i32,
            Some(basis),
            Vec::new(),
            vec![distance],
        )
    }

    /// A B-spline surface with `nu * nv` control points, u varying fastest.
    #[allow(clippy::too_many_arguments)]
    pub fn bspline_surface(
        udegree: usize,
        vdegree: usize,
        uknots: &[f64],
        vknots: &[f64],
        cps: &[f64],
        weights: Option<&[f64]>,
        uperiodic: bool,
        vperiodic: bool,
    ) -> Result<Self> {
        if uknots.len() <= udegree + 1 || vknots.len() <= vdegree + 1 {
            return Err(Error::InvalidGeometry("bspline surface knots too short".into()));
        }
        let nu = uknots.len() - udegree - 1;
        let nv = vknots.len() - vdegree - 1;
        check_len("bspline surface control points", cps, 3 * nu * nv)?;

        let mut flags = 0;
        if uperiodic {
            flags |= FLAG_PERIODIC;
        }
        if vperiodic {
            flags |= FLAG_V_PERIODIC;
        }
        let mut reals = Vec::with_capacity(uknots.len() + vknots.len() + 4 * nu * nv);
        reals.extend_from_slice(uknots);
        reals.extend_from_slice(vknots);
        reals.extend_from_slice(cps);
        if let Some(w) = weights {
            check_len("bspline surface weights", w, nu * nv)?;
            flags |= FLAG_RATIONAL;
            reals.extend_from_slice(w);
        }
        Ok(Self::new(
            ObjectClass::Surface,
            SurfaceType::BSpline as i32,
            None,
            vec![
                flags,
                to_i32(udegree)?,
                to_i32(nu)?,
                to_i32(uknots.len())?,
                to_i32(vdegree)?,
                to_i32(nv)?,
                to_i32(vknots.len())?,
            ],
            reals,
        ))
    }

    /// Returns `true` for B-spline curves and surfaces.
    pub fn is_bspline(&self) -> bool {
        self.mtype == CurveType::BSpline as i32 && self.class.is_geometry()
    }

    /// Returns `true` for B-splines with a periodic flag set.
    pub fn is_periodic(&self) -> bool {
        self.is_bspline()
            && self
                .ints
                .first()
                .is_some_and(|f| f & (FLAG_PERIODIC | FLAG_V_PERIODIC) != 0)
    }

    /// Validates the vectors against the layout table and returns it.
    pub fn layout(&self) -> Result<Layout> {
        let layout = layout(self.class, self.mtype, &self.ints)?;
        if self.ints.len() != layout.ints || self.reals.len() != layout.reals {
            return Err(Error::InvalidGeometry(format!(
                "{} type {} needs {}/{} ints/reals, got {}/{}",
                self.class,
                self.mtype,
                layout.ints,
                layout.reals,
                self.ints.len(),
                self.reals.len()
            )));
        }
        if layout.basis.is_some() != self.basis.is_some() {
            return Err(Error::InvalidGeometry(format!(
                "{} type {} basis reference mismatch",
                self.class, self.mtype
            )));
        }
        Ok(layout)
    }

    /// Structural equality of the numeric data within `tolerance`.
    fn same_data(&self, other: &GeometryData, tolerance: f64) -> bool {
        self.class == other.class
            && self.mtype == other.mtype
            && self.ints == other.ints
            && self.reals.len() == other.reals.len()
            && self
                .reals
                .iter()
                .zip(&other.reals)
                .all(|(a, b)| (a - b).abs() <= tolerance)
            && self.basis.is_some() == other.basis.is_some()
    }

    /// Returns the 3D control hull points of a spline curve or surface.
    pub(crate) fn control_points(&self) -> Vec<[f64; 3]> {
        let (offset, count) = match (self.class, CurveType::from_i32(self.mtype)) {
            (ObjectClass::Curve, Some(CurveType::Bezier)) if self.ints.len() == 3 => {
                (0, self.ints[2].max(0) as usize)
            }
            (ObjectClass::Curve, Some(CurveType::BSpline)) if self.ints.len() == 4 => {
                (self.ints[3].max(0) as usize, self.ints[2].max(0) as usize)
            }
            _ => return Vec::new(),
        };
        self.reals
            .get(offset..offset + 3 * count)
            .map(|cps| cps.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
            .unwrap_or_default()
    }
}

impl BrepArena {
    /// Adds a geometry object after checking it against the layout table
    /// and verifying its basis reference.
    pub fn add_geometry(&mut self, data: GeometryData) -> Result<GeomKey> {
        let layout = data.layout()?;
        if let (Some(expected), Some(basis)) = (layout.basis, data.basis) {
            let found = self.geometry(basis)?.class;
            if found != expected {
                return Err(Error::WrongClass { expected, found });
            }
        }
        Ok(self.geometry.insert(data))
    }

    /// Adds a geometry object without any validation.
    pub fn add_geometry_unchecked(&mut self, data: GeometryData) -> GeomKey {
        self.geometry.insert(data)
    }

    /// Checks that `key` exists and belongs to `class`.
    pub(crate) fn expect_class(&self, key: GeomKey, class: ObjectClass) -> Result<()> {
        let found = self.geometry(key)?.class;
        if found != class {
            return Err(Error::WrongClass {
                expected: class,
                found,
            });
        }
        Ok(())
    }

    /// Geometric equivalence: identical keys, or equal numeric data within
    /// `tolerance` with equivalent basis chains.
    pub fn is_same_geometry(&self, a: GeomKey, b: GeomKey, tolerance: f64) -> Result<bool> {
        let (mut a, mut b) = (a, b);
        loop {
            if a == b {
                return Ok(true);
            }
            let ga = self.geometry(a)?;
            let gb = self.geometry(b)?;
            if !ga.same_data(gb, tolerance) {
                return Ok(false);
            }
            match (ga.basis, gb.basis) {
                (Some(na), Some(nb)) => {
                    a = na;
                    b = nb;
                }
                _ => return Ok(true),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_table_constants() {
        let pc = |t: CurveType| layout(ObjectClass::PCurve, t as i32, &[]).unwrap().reals;
        let c = |t: CurveType| layout(ObjectClass::Curve, t as i32, &[]).unwrap().reals;
        let s = |t: SurfaceType| layout(ObjectClass::Surface, t as i32, &[]).unwrap().reals;

        assert_eq!(pc(CurveType::Line), 4);
        assert_eq!(c(CurveType::Line), 6);
        assert_eq!(pc(CurveType::Circle), 7);
        assert_eq!(c(CurveType::Circle), 10);
        assert_eq!(c(CurveType::Ellipse), 11);
        assert_eq!(pc(CurveType::Offset), 1);
        assert_eq!(c(CurveType::Offset), 4);
        assert_eq!(s(SurfaceType::Plane), 9);
        assert_eq!(s(SurfaceType::Cylindrical), 13);
        assert_eq!(s(SurfaceType::Toroidal), 14);
        assert_eq!(s(SurfaceType::Extrusion), 3);
    }

    #[test]
    fn spline_layouts_follow_header() {
        let l = layout(ObjectClass::Curve, CurveType::BSpline as i32, &[0, 3, 5, 9]).unwrap();
        assert_eq!(l.ints, 4);
        assert_eq!(l.reals, 9 + 15);

        let l = layout(
            ObjectClass::PCurve,
            CurveType::BSpline as i32,
            &[FLAG_RATIONAL, 2, 4, 7],
        )
        .unwrap();
        assert_eq!(l.reals, 7 + 3 * 4);

        let l = layout(
            ObjectClass::Surface,
            SurfaceType::BSpline as i32,
            &[0, 1, 2, 4, 1, 3, 5],
        )
        .unwrap();
        assert_eq!(l.ints, 7);
        assert_eq!(l.reals, 4 + 5 + 18);
    }

    #[test]
    fn basis_requirements() {
        let l = layout(ObjectClass::Surface, SurfaceType::Revolution as i32, &[]).unwrap();
        assert_eq!(l.basis, Some(ObjectClass::Curve));
        let l = layout(ObjectClass::PCurve, CurveType::Trimmed as i32, &[]).unwrap();
        assert_eq!(l.basis, Some(ObjectClass::PCurve));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(layout(ObjectClass::Curve, 42, &[]).is_err());
        assert!(layout(ObjectClass::Surface, 0, &[]).is_err());
        assert!(layout(ObjectClass::Edge, 1, &[]).is_err());
        assert!(layout(ObjectClass::Curve, CurveType::BSpline as i32, &[0, 3]).is_err());
    }

    #[test]
    fn inconsistent_spline_headers_are_rejected() {
        let curve = |ints: &[i32]| layout(ObjectClass::Curve, CurveType::BSpline as i32, ints);
        // Knot count must be ncp + degree + 1.
        assert!(curve(&[FLAG_PERIODIC, 2, 1, 6]).is_err());
        assert!(curve(&[0, 3, 5, 8]).is_err());
        assert!(curve(&[0, 0, 2, 3]).is_err());
        assert!(curve(&[0, 3, 5, 9]).is_ok());

        let surface = |ints: &[i32]| layout(ObjectClass::Surface, SurfaceType::BSpline as i32, ints);
        assert!(surface(&[FLAG_PERIODIC, 1, 0, 2, 1, 2, 4]).is_err());
        assert!(surface(&[0, 1, 2, 4, 1, 0, 2]).is_err());
        assert!(surface(&[0, 1, 2, 4, 1, 2, 4]).is_ok());

        let bezier = layout(ObjectClass::Surface, SurfaceType::Bezier as i32, &[0, 1, 2, 2, 2]);
        assert!(bezier.is_err());

        let mut arena = BrepArena::new();
        let bad = GeometryData::new(
            ObjectClass::Curve,
            CurveType::BSpline as i32,
            None,
            vec![FLAG_PERIODIC, 2, 1, 6],
            vec![0.0; 9],
        );
        assert!(matches!(arena.add_geometry(bad), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn bezier_curve_layout() {
        let g = GeometryData::bezier_curve(
            ObjectClass::PCurve,
            2,
            &[0.0, 0.0, 0.5, 1.0, 1.0, 0.0],
            Some(&[1.0, 0.5, 1.0]),
        )
        .unwrap();
        assert_eq!(g.ints, vec![FLAG_RATIONAL, 2, 3]);
        assert_eq!(g.layout().unwrap().reals, 9);
        assert!(!g.is_bspline());

        let short = GeometryData::bezier_curve(ObjectClass::Curve, 3, &[0.0; 6], None);
        assert!(short.is_err());
    }

    #[test]
    fn trimmed_surface_carries_uv_range() {
        let mut arena = BrepArena::new();
        let plane = arena
            .add_geometry(GeometryData::plane([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]))
            .unwrap();
        let trimmed = GeometryData::trimmed_surface(plane, [0.0, 2.0, -1.0, 1.0]);
        assert_eq!(trimmed.mtype, SurfaceType::Trimmed as i32);
        assert_eq!(trimmed.layout().unwrap().reals, 4);
        assert!(arena.add_geometry(trimmed).is_ok());

        let pcurve = GeometryData::trimmed(ObjectClass::PCurve, plane, 0.0, 1.0);
        assert!(matches!(arena.add_geometry(pcurve), Err(Error::WrongClass { .. })));
    }

    #[test]
    fn offset_surface_needs_surface_basis() {
        let mut arena = BrepArena::new();
        let plane = arena
            .add_geometry(GeometryData::plane([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]))
            .unwrap();
        let offset = GeometryData::offset_surface(plane, 0.25);
        let l = offset.layout().unwrap();
        assert_eq!(l.basis, Some(ObjectClass::Surface));
        assert_eq!(l.reals, 1);
        let key = arena.add_geometry(offset).unwrap();
        assert_eq!(arena.geometry(key).unwrap().basis, Some(plane));

        let line = arena
            .add_geometry(GeometryData::line(ObjectClass::Curve, &[0.0; 3], &[1.0, 0.0, 0.0]).unwrap())
            .unwrap();
        let err = arena.add_geometry(GeometryData::offset_surface(line, 0.25));
        assert!(matches!(err, Err(Error::WrongClass { .. })));
    }

    #[test]
    fn add_geometry_validates_basis_class() {
        let mut arena = BrepArena::new();
        let plane = arena
            .add_geometry(GeometryData::plane([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]))
            .unwrap();

        let err = arena.add_geometry(GeometryData::extrusion(plane, [0.0, 0.0, 1.0]));
        assert!(matches!(err, Err(Error::WrongClass { .. })));

        let line = arena
            .add_geometry(GeometryData::line(ObjectClass::Curve, &[0.0; 3], &[1.0, 0.0, 0.0]).unwrap())
            .unwrap();
        assert!(arena
            .add_geometry(GeometryData::extrusion(line, [0.0, 0.0, 1.0]))
            .is_ok());
    }

    #[test]
    fn add_geometry_rejects_wrong_lengths() {
        let mut arena = BrepArena::new();
        let bad = GeometryData::new(
            ObjectClass::Curve,
            CurveType::Line as i32,
            None,
            Vec::new(),
            vec![0.0; 5],
        );
        assert!(arena.add_geometry(bad.clone()).is_err());
        // The unchecked path admits it unchanged.
        let key = arena.add_geometry_unchecked(bad);
        assert_eq!(arena.geometry(key).unwrap().reals.len(), 5);
    }

    #[test]
    fn periodic_flag_detection() {
        let knots: Vec<f64> = (0..8).map(f64::from).collect();
        let cps = vec![0.0; 15];
        let g = GeometryData::bspline_curve(ObjectClass::Curve, 2, &knots, &cps, None, true).unwrap();
        assert!(g.is_bspline());
        assert!(g.is_periodic());
        assert_eq!(g.ints, vec![FLAG_PERIODIC, 2, 5, 8]);
        assert!(g.layout().is_ok());
    }

    #[test]
    fn equivalence_follows_basis_chain() {
        let mut arena = BrepArena::new();
        let l0 = arena
            .add_geometry(GeometryData::line(ObjectClass::Curve, &[0.0; 3], &[1.0, 0.0, 0.0]).unwrap())
            .unwrap();
        let l1 = arena
            .add_geometry(GeometryData::line(ObjectClass::Curve, &[0.0; 3], &[1.0, 0.0, 0.0]).unwrap())
            .unwrap();
        let l2 = arena
            .add_geometry(GeometryData::line(ObjectClass::Curve, &[0.0; 3], &[0.0, 1.0, 0.0]).unwrap())
            .unwrap();
        let t0 = arena
            .add_geometry(GeometryData::trimmed(ObjectClass::Curve, l0, 0.0, 1.0))
            .unwrap();
        let t1 = arena
            .add_geometry(GeometryData::trimmed(ObjectClass::Curve, l1, 0.0, 1.0))
            .unwrap();
        let t2 = arena
            .add_geometry(GeometryData::trimmed(ObjectClass::Curve, l2, 0.0, 1.0))
            .unwrap();

        assert!(arena.is_same_geometry(l0, l1, 1e-12).unwrap());
        assert!(!arena.is_same_geometry(l0, l2, 1e-12).unwrap());
        assert!(arena.is_same_geometry(t0, t1, 1e-12).unwrap());
        assert!(!arena.is_same_geometry(t0, t2, 1e-12).unwrap());
    }
}
