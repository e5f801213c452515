// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic enumeration of a body's topology.
//!
//! Every object of a body gets a 1-based sibling index within its kind.
//! The order is a depth-first walk from the body's top-level children down
//! to nodes, keeping only the first occurrence of each shared object:
//!
//! - shells in body order,
//! - faces per shell (or the body's faces for face bodies),
//! - loops per face (or the single loop of a wire body),
//! - edges per loop,
//! - nodes per edge.
//!
//! Position lookup goes through a hash map, so resolving an index is O(1)
//! rather than a scan of the sibling list.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::arena::{BodyShape, BrepArena};
use crate::error::Result;
use crate::keys::*;

/// An ordered, duplicate-free list of objects with 1-based index lookup.
#[derive(Debug, Clone)]
pub struct SiblingList<K> {
    items: Vec<K>,
    positions: FxHashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> Default for SiblingList<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> SiblingList<K> {
    /// Appends `key` unless it is already present.
    pub fn push(&mut self, key: K) {
        if !self.positions.contains_key(&key) {
            self.positions.insert(key, self.items.len());
            self.items.push(key);
        }
    }

    /// Returns the 1-based index of `key`.
    pub fn index_of(&self, key: K) -> Option<usize> {
        self.positions.get(&key).map(|&i| i + 1)
    }

    /// Returns the object at a 1-based index.
    pub fn get(&self, index: usize) -> Option<K> {
        index.checked_sub(1).and_then(|i| self.items.get(i)).copied()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// All objects of one body, grouped by kind in sibling order.
#[derive(Debug, Clone, Default)]
pub struct BodyTopology {
    pub shells: SiblingList<ShellKey>,
    pub faces: SiblingList<FaceKey>,
    pub loops: SiblingList<LoopKey>,
    pub edges: SiblingList<EdgeKey>,
    pub nodes: SiblingList<NodeKey>,
}

impl BrepArena {
    /// Enumerates every object of `body` in sibling order.
    pub fn body_topology(&self, body: BodyKey) -> Result<BodyTopology> {
        let mut topo = BodyTopology::default();

        match &self.body(body)?.shape {
            BodyShape::Wire(lk) => topo.loops.push(*lk),
            BodyShape::Faces(faces) => {
                for &fk in faces {
                    topo.faces.push(fk);
                }
            }
            BodyShape::Shells(shells) => {
                for &sk in shells {
                    topo.shells.push(sk);
                    for &fk in &self.shell(sk)?.faces {
                        topo.faces.push(fk);
                    }
                }
            }
        }

        for fk in topo.faces.items.clone() {
            for &lk in &self.face(fk)?.loops {
                topo.loops.push(lk);
            }
        }
        for lk in topo.loops.items.clone() {
            for &ek in &self.loop_(lk)?.edges {
                topo.edges.push(ek);
            }
        }
        for ek in topo.edges.items.clone() {
            for &nk in &self.edge(ek)?.nodes {
                topo.nodes.push(nk);
            }
        }

        Ok(topo)
    }
}
