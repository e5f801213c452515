// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of periodic B-splines into open (clamped) B-splines.
//!
//! A periodic spline is stored unclamped, valid on `[knots[p], knots[ncp]]`.
//! Clamping inserts the domain start until it has multiplicity `p`, then
//! drops the knots and control points that only influence the curve before
//! it. The end is clamped the same way on the reversed spline. The result
//! traces the same curve over the same parameter domain.
//!
//! Control points are handled in homogeneous form so rational splines stay
//! exact.

use nalgebra::Vector4;

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::geometry::*;
use crate::keys::{GeomKey, ObjectClass};

type Point = Vector4<f64>;

fn fail(msg: impl Into<String>) -> Error {
    Error::Flatten(msg.into())
}

/// Inserts `u` once into every row sharing `knots`.
fn insert_knot(knots: &mut Vec<f64>, degree: usize, rows: &mut [Vec<Point>], u: f64) -> Result<()> {
    let k = knots
        .iter()
        .rposition(|&x| x <= u)
        .ok_or_else(|| fail(format!("knot {u} precedes the knot vector")))?;
    let s = knots.iter().filter(|&&x| x == u).count();
    if k < degree || s > degree {
        return Err(fail(format!("cannot insert knot {u} at span {k}")));
    }

    for row in rows.iter_mut() {
        if row.len() + degree + 1 != knots.len() {
            return Err(fail("control net does not match the knot vector"));
        }
        let mut out = Vec::with_capacity(row.len() + 1);
        out.extend_from_slice(&row[..=k - degree]);
        for i in k - degree + 1..=k - s {
            let denom = knots[i + degree] - knots[i];
            if denom <= 0.0 {
                return Err(fail("zero-length knot span during insertion"));
            }
            let alpha = (u - knots[i]) / denom;
            out.push(row[i] * alpha + row[i - 1] * (1.0 - alpha));
        }
        out.extend_from_slice(&row[k - s..]);
        *row = out;
    }
    knots.insert(k + 1, u);
    Ok(())
}

/// Clamps the start of the domain, `knots[degree]`.
fn clamp_start(knots: &mut Vec<f64>, degree: usize, rows: &mut [Vec<Point>]) -> Result<()> {
    let a = *knots
        .get(degree)
        .ok_or_else(|| fail("knot vector shorter than the degree"))?;
    while knots.iter().filter(|&&x| x == a).count() < degree {
        insert_knot(knots, degree, rows, a)?;
    }

    let e = knots
        .iter()
        .rposition(|&x| x == a)
        .ok_or_else(|| fail("lost the clamped knot"))?;
    let drop = e
        .checked_sub(degree)
        .ok_or_else(|| fail("clamped knot precedes the degree"))?;
    for row in rows.iter_mut() {
        if row.len() + degree + 1 != knots.len() || drop > row.len() {
            return Err(fail("control net does not match the knot vector"));
        }
    }
    let mut clamped = vec![a; degree + 1];
    clamped.extend_from_slice(&knots[e + 1..]);
    *knots = clamped;
    for row in rows.iter_mut() {
        row.drain(..drop);
    }
    Ok(())
}

fn reverse(knots: &mut [f64], rows: &mut [Vec<Point>]) {
    knots.reverse();
    for k in knots.iter_mut() {
        *k = -*k;
    }
    for row in rows.iter_mut() {
        row.reverse();
    }
}

/// Clamps both ends of a shared knot vector.
fn clamp(knots: &mut Vec<f64>, degree: usize, rows: &mut [Vec<Point>]) -> Result<()> {
    clamp_start(knots, degree, rows)?;
    reverse(knots, rows);
    clamp_start(knots, degree, rows)?;
    reverse(knots, rows);
    Ok(())
}

fn to_point(coords: &[f64], weight: f64) -> Point {
    let mut p = Point::new(0.0, 0.0, 0.0, weight);
    for (slot, &c) in p.iter_mut().zip(coords) {
        *slot = c * weight;
    }
    p
}

fn to_usize(v: i32) -> Result<usize> {
    usize::try_from(v).map_err(|_| fail(format!("negative spline header entry {v}")))
}

/// Reads a fixed-size spline header.
fn ints<const N: usize>(data: &GeometryData) -> Result<[usize; N]> {
    let mut out = [0usize; N];
    if data.ints.len() != N {
        return Err(fail(format!("spline header needs {N} ints")));
    }
    for (slot, &v) in out.iter_mut().zip(&data.ints) {
        *slot = to_usize(v)?;
    }
    Ok(out)
}

fn reals(data: &GeometryData, range: std::ops::Range<usize>) -> Result<&[f64]> {
    data.reals
        .get(range.clone())
        .ok_or_else(|| fail(format!("reals {range:?} out of bounds")))
}

/// Builds homogeneous points from packed coordinates and optional weights.
fn points(cps: &[f64], dim: usize, weights: Option<&[f64]>) -> Result<Vec<Point>> {
    cps.chunks_exact(dim)
        .enumerate()
        .map(|(i, c)| match weights {
            Some(w) => w
                .get(i)
                .map(|&w| to_point(c, w))
                .ok_or_else(|| fail("missing control point weight")),
            None => Ok(to_point(c, 1.0)),
        })
        .collect()
}

/// Writes homogeneous points back as coordinates followed by weights.
fn push_points(reals: &mut Vec<f64>, points: &[Point], dim: usize, rational: bool) {
    for p in points {
        for c in p.iter().take(dim) {
            reals.push(c / p[3]);
        }
    }
    if rational {
        reals.extend(points.iter().map(|p| p[3]));
    }
}

fn flatten_curve(data: &GeometryData) -> Result<GeometryData> {
    let dim = if data.class == ObjectClass::PCurve { 2 } else { 3 };
    let [_, degree, ncp, nk] = ints::<4>(data)?;
    let flags = data.ints[0];
    let rational = flags & FLAG_RATIONAL != 0;

    let mut knots = reals(data, 0..nk)?.to_vec();
    let cps = reals(data, nk..nk + dim * ncp)?;
    let weights = if rational {
        Some(reals(data, nk + dim * ncp..nk + (dim + 1) * ncp)?)
    } else {
        None
    };
    let mut rows = [points(cps, dim, weights)?];

    clamp(&mut knots, degree, &mut rows)?;
    let [row] = rows;

    let mut reals = knots.clone();
    push_points(&mut reals, &row, dim, rational);
    let flags = (flags & !FLAG_PERIODIC) | FLAG_FLATTENED;
    Ok(GeometryData::new(
        data.class,
        data.mtype,
        None,
        vec![flags, data.ints[1], count(row.len())?, count(knots.len())?],
        reals,
    ))
}

fn count(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| fail(format!("{n} exceeds int range")))
}

fn flatten_surface(data: &GeometryData) -> Result<GeometryData> {
    let [_, udeg, mut nu, nuk, vdeg, mut nv, nvk] = ints::<7>(data)?;
    let flags = data.ints[0];
    let rational = flags & FLAG_RATIONAL != 0;
    if nu == 0 || nv == 0 {
        return Err(fail("bspline surface without control points"));
    }

    let mut uknots = reals(data, 0..nuk)?.to_vec();
    let mut vknots = reals(data, nuk..nuk + nvk)?.to_vec();
    let base = nuk + nvk;
    let ncp = nu * nv;
    let cps = reals(data, base..base + 3 * ncp)?;
    let weights = if rational {
        Some(reals(data, base + 3 * ncp..base + 4 * ncp)?)
    } else {
        None
    };
    let net = points(cps, 3, weights)?;

    // Rows run along u (u varies fastest in storage).
    let mut rows: Vec<Vec<Point>> = net.chunks_exact(nu).map(<[Point]>::to_vec).collect();
    if flags & FLAG_PERIODIC != 0 {
        clamp(&mut uknots, udeg, &mut rows)?;
        nu = rows.first().map_or(0, Vec::len);
    }

    if flags & FLAG_V_PERIODIC != 0 {
        let mut cols: Vec<Vec<Point>> = (0..nu)
            .map(|i| rows.iter().filter_map(|r| r.get(i).copied()).collect())
            .collect();
        clamp(&mut vknots, vdeg, &mut cols)?;
        nv = cols.first().map_or(0, Vec::len);
        rows = (0..nv)
            .map(|j| cols.iter().filter_map(|c| c.get(j).copied()).collect())
            .collect();
    }

    let net: Vec<Point> = rows.into_iter().flatten().collect();
    let mut reals = uknots.clone();
    reals.extend_from_slice(&vknots);
    push_points(&mut reals, &net, 3, rational);
    let flags = (flags & !(FLAG_PERIODIC | FLAG_V_PERIODIC)) | FLAG_FLATTENED;
    Ok(GeometryData::new(
        data.class,
        data.mtype,
        None,
        vec![
            flags,
            data.ints[1],
            count(nu)?,
            count(uknots.len())?,
            data.ints[4],
            count(nv)?,
            count(vknots.len())?,
        ],
        reals,
    ))
}

impl GeometryData {
    /// Returns an open B-spline equivalent to this periodic one, flagged as
    /// flattened. Fails for anything that is not a periodic B-spline.
    pub fn flattened(&self) -> Result<GeometryData> {
        if !self.is_periodic() {
            return Err(fail(format!(
                "{} type {} is not a periodic bspline",
                self.class, self.mtype
            )));
        }
        self.layout().map_err(|e| fail(e.to_string()))?;
        match self.class {
            ObjectClass::Surface => flatten_surface(self),
            _ => flatten_curve(self),
        }
    }
}

impl BrepArena {
    /// Flattens the periodic B-spline stored at `key` into a new, unowned
    /// geometry object.
    pub fn flatten_geometry(&self, key: GeomKey) -> Result<GeometryData> {
        self.geometry(key)?.flattened()
    }
}
