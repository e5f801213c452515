// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # EGADS-Lite Export
//!
//! Serializes a B-Rep model held in an
//! [`egads_lite_topology::BrepArena`] into the self-contained binary stream
//! read by the lightweight EGADS-lite reader.
//!
//! Per body the exporter populates three geometry deduplication maps
//! (pcurves, curves, surfaces), writes each map's geometry once, and then
//! writes every topological object with its references expressed as 1-based
//! positions in the body's deterministic enumeration. Periodic splines are
//! flattened on the way out. Tessellations and effective bodies follow the
//! plain bodies as trailing children of the model.
//!
//! The stream uses the host's native integer and float representation.
//!
//! ```no_run
//! use egads_lite_export::export_model;
//! # use egads_lite_topology::BrepArena;
//! # let arena = BrepArena::new();
//! # let model = arena.model_keys()[0];
//! let bytes = export_model(&arena, model)?;
//! # Ok::<(), egads_lite_export::Error>(())
//! ```

mod attrs;
mod body;
pub mod config;
mod context;
mod ebody;
pub mod error;
mod geometry;
pub mod kernel;
pub mod maps;
pub mod model;
pub mod populate;
pub mod stream;
mod tessellation;

pub use attrs::write_attributes;
pub use config::ExportConfig;
pub use error::{Error, Result};
pub use kernel::{GeometryKernel, NativeKernel};
pub use maps::{GeometryMap, GeometryMaps};
pub use model::{export_model, Exporter, MAGIC, REVISION};
pub use populate::populate;
pub use stream::ByteStream;
