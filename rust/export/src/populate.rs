// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry population.
//!
//! Walks a body in three passes (loops, faces, edges) and registers every
//! geometry object the body's records will reference, following basis
//! chains to their end. The resulting map order is the emission order.

use egads_lite_topology::{BodyTopology, BrepArena, EdgeType, GeomKey};
use tracing::trace;

use crate::error::{Error, Result};
use crate::kernel::GeometryKernel;
use crate::maps::GeometryMaps;

/// Builds the deduplication maps for one body.
pub fn populate<K: GeometryKernel>(
    arena: &BrepArena,
    kernel: &K,
    topo: &BodyTopology,
) -> Result<GeometryMaps> {
    let mut maps = GeometryMaps::new();

    for lk in topo.loops.iter() {
        let lp = arena.loop_(lk)?;
        let Some(surface) = lp.surface else {
            continue;
        };
        register_chain(arena, kernel, &mut maps, surface)?;
        for &pcurve in &lp.pcurves {
            register_chain(arena, kernel, &mut maps, pcurve)?;
        }
    }

    for fk in topo.faces.iter() {
        register_chain(arena, kernel, &mut maps, arena.face(fk)?.surface)?;
    }

    for ek in topo.edges.iter() {
        let edge = arena.edge(ek)?;
        if edge.mtype == EdgeType::Degenerate {
            continue;
        }
        if let Some(curve) = edge.curve {
            register_chain(arena, kernel, &mut maps, curve)?;
        }
    }

    let [pcurves, curves, surfaces] = maps.counts();
    trace!(pcurves, curves, surfaces, "populated geometry maps");
    Ok(maps)
}

/// Registers `key` and its basis chain, each link in the map of its own
/// class. Stops at the first link that was already present, since its chain
/// has been registered with it.
fn register_chain<K: GeometryKernel>(
    arena: &BrepArena,
    kernel: &K,
    maps: &mut GeometryMaps,
    mut key: GeomKey,
) -> Result<()> {
    loop {
        let geom = arena.geometry(key)?;
        geom.layout().map_err(|e| Error::GeometryFormat {
            class: geom.class,
            mtype: geom.mtype,
            reason: e.to_string(),
        })?;

        let map = maps.for_class_mut(geom.class, geom.mtype)?;
        let (_, added) = map.register(arena, kernel, key)?;
        match geom.basis {
            Some(basis) if added => key = basis,
            _ => return Ok(()),
        }
    }
}
