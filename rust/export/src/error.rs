// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the export engine.
//!
//! Every error is fatal to the export call that raised it. No partial
//! stream is ever returned.

use std::collections::TryReserveError;

use egads_lite_topology::{BodyKey, EBodyKey, GeomKey, ObjectClass, ObjectKey};

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object handed to the exporter is not a model.
    #[error("expected a model, got {0:?}")]
    NotAModel(ObjectKey),

    /// Introspection of the source model failed.
    #[error(transparent)]
    Topology(#[from] egads_lite_topology::Error),

    /// A geometry object does not match any recognized class and type, or
    /// violates its layout.
    #[error("unrecognized {class} type {mtype}: {reason}")]
    GeometryFormat {
        class: ObjectClass,
        mtype: i32,
        reason: String,
    },

    /// A geometry object is missing from its deduplication map.
    #[error("{class} {key:?} is not in the geometry map")]
    GeometryNotFound { class: ObjectClass, key: GeomKey },

    /// A topology object is missing from the body's sibling list.
    #[error("{class} {key:?} is not part of the body")]
    SiblingNotFound { class: ObjectClass, key: ObjectKey },

    /// A tessellation or effective body refers to a body outside the model.
    #[error("body {0:?} is not a plain body of the model")]
    BodyNotInModel(BodyKey),

    /// The effective body has not been finalized.
    #[error("effective body {0:?} is not finalized")]
    NotFinalized(EBodyKey),

    /// A merged effective face has no uv remapping table.
    #[error("effective face {0} has several patches but no uv map")]
    MissingUvMap(usize),

    /// An effective object references a sibling that does not exist.
    #[error("{what} index {index} outside 1..={len}")]
    EffectiveIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The output buffer could not grow.
    #[error("output buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// A count does not fit the stream's integer type.
    #[error("count {0} exceeds the stream integer range")]
    Overflow(usize),

    /// Writing to the stream failed.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}
