// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered, typed attribute tables that can be attached to any object.
//!
//! Attributes keep their insertion order because the export stream writes
//! them positionally. Setting an attribute whose name already exists
//! replaces the value in place.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::arena::BrepArena;
use crate::error::{Error, Result};
use crate::keys::ObjectKey;

/// Attribute type tags as they appear in the export stream.
pub const ATTR_INT: i32 = 1;
pub const ATTR_REAL: i32 = 2;
pub const ATTR_STRING: i32 = 3;
pub const ATTR_CSYS: i32 = 12;
pub const ATTR_POINTER: i32 = 13;

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(Vec<i32>),
    Real(Vec<f64>),
    String(Option<String>),
    /// Declared reals (origin, x direction, y direction, ...) plus the
    /// derived orthonormal frame: x, y, z axes followed by the origin.
    Csys { values: Vec<f64>, frame: [f64; 12] },
    /// Opaque in-process handle. Never serialized.
    Pointer(usize),
}

impl AttrValue {
    /// Builds a coordinate-system value, deriving the 12-value frame from
    /// the first nine declared reals.
    pub fn csys(values: Vec<f64>) -> Result<Self> {
        if values.len() < 9 {
            return Err(Error::InvalidCsys(values.len()));
        }
        let frame = derive_frame(&values)?;
        Ok(AttrValue::Csys { values, frame })
    }

    /// Returns the stream type tag.
    pub fn type_tag(&self) -> i32 {
        match self {
            AttrValue::Int(_) => ATTR_INT,
            AttrValue::Real(_) => ATTR_REAL,
            AttrValue::String(_) => ATTR_STRING,
            AttrValue::Csys { .. } => ATTR_CSYS,
            AttrValue::Pointer(_) => ATTR_POINTER,
        }
    }

    /// Returns the declared length. Strings report their byte length and
    /// coordinate systems report only the declared reals.
    pub fn len(&self) -> usize {
        match self {
            AttrValue::Int(v) => v.len(),
            AttrValue::Real(v) => v.len(),
            AttrValue::String(s) => s.as_ref().map_or(0, |s| s.len()),
            AttrValue::Csys { values, .. } => values.len(),
            AttrValue::Pointer(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` for values that only make sense in-process.
    pub fn is_opaque(&self) -> bool {
        matches!(self, AttrValue::Pointer(_))
    }
}

fn derive_frame(values: &[f64]) -> Result<[f64; 12]> {
    let origin = Vector3::new(values[0], values[1], values[2]);
    let dx = Vector3::new(values[3], values[4], values[5]);
    let dy = Vector3::new(values[6], values[7], values[8]);

    let x = dx
        .try_normalize(1e-300)
        .ok_or(Error::InvalidCsys(values.len()))?;
    let z = x
        .cross(&dy)
        .try_normalize(1e-300)
        .ok_or(Error::InvalidCsys(values.len()))?;
    let y = z.cross(&x);

    let mut frame = [0.0; 12];
    frame[0..3].copy_from_slice(x.as_slice());
    frame[3..6].copy_from_slice(y.as_slice());
    frame[6..9].copy_from_slice(z.as_slice());
    frame[9..12].copy_from_slice(origin.as_slice());
    Ok(frame)
}

/// A named attribute. Names are optional in the stream format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: Option<String>,
    pub value: AttrValue,
}

/// An ordered attribute table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a named attribute, replacing an existing one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|a| a.name.as_deref() == Some(name.as_str()))
        {
            Some(existing) => existing.value = value,
            None => self.entries.push(Attribute {
                name: Some(name),
                value,
            }),
        }
    }

    /// Appends an attribute without a name.
    pub fn push_unnamed(&mut self, value: AttrValue) {
        self.entries.push(Attribute { name: None, value });
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let pos = self
            .entries
            .iter()
            .position(|a| a.name.as_deref() == Some(name))?;
        Some(self.entries.remove(pos).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that end up in the stream (opaque ones excluded).
    pub fn persistent_len(&self) -> usize {
        self.entries.iter().filter(|a| !a.value.is_opaque()).count()
    }
}

impl BrepArena {
    /// Attaches an attribute table to an object, replacing any existing one.
    pub fn set_attributes(&mut self, key: impl Into<ObjectKey>, attrs: Attributes) {
        self.attributes.insert(key.into(), attrs);
    }

    /// Sets a single named attribute on an object.
    pub fn set_attribute(&mut self, key: impl Into<ObjectKey>, name: &str, value: AttrValue) {
        self.attributes
            .entry(key.into())
            .or_default()
            .set(name, value);
    }

    /// Returns the attribute table attached to an object, if any.
    pub fn attributes(&self, key: impl Into<ObjectKey>) -> Option<&Attributes> {
        self.attributes.get(&key.into())
    }
}
