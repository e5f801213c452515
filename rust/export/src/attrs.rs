// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute table serialization.
//!
//! Layout: `count`, then per attribute `type`, `length`, name string and
//! payload. Pointer attributes are skipped and not counted. Coordinate
//! systems carry their 12 derived frame reals after the declared ones.

use egads_lite_topology::{AttrValue, Attributes};

use crate::error::Result;
use crate::stream::ByteStream;

/// Writes an attribute table; `None` is written as an empty table.
pub fn write_attributes(stream: &mut ByteStream, attrs: Option<&Attributes>) -> Result<()> {
    let Some(attrs) = attrs else {
        return stream.write_i32(0);
    };

    stream.write_count(attrs.persistent_len())?;
    for attr in attrs.iter().filter(|a| !a.value.is_opaque()) {
        stream.write_i32(attr.value.type_tag())?;
        stream.write_count(attr.value.len())?;
        stream.write_string(attr.name.as_deref())?;
        match &attr.value {
            AttrValue::Int(v) => stream.write_i32s(v)?,
            AttrValue::Real(v) => stream.write_f64s(v)?,
            AttrValue::Csys { values, frame } => {
                stream.write_f64s(values)?;
                stream.write_f64s(frame)?;
            }
            AttrValue::String(s) => stream.write_string(s.as_deref())?,
            AttrValue::Pointer(_) => {}
        }
    }
    Ok(())
}
