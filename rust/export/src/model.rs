// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model exporter entry point.

use egads_lite_topology::{BodyKey, BrepArena, ModelExtra, ObjectClass, ObjectKey};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::context::ExportContext;
use crate::error::{Error, Result};
use crate::kernel::{GeometryKernel, NativeKernel};

/// Stream magic number ("EGLT").
pub const MAGIC: i32 = 0x4547_4C54;
/// Format revision pair written after the magic number.
pub const REVISION: [i32; 2] = [1, 0];

/// Serializes models from one source arena.
///
/// # Example
///
/// ```no_run
/// use egads_lite_export::Exporter;
/// use egads_lite_topology::BrepArena;
///
/// let arena = BrepArena::from_json("{}")?;
/// for model in arena.model_keys() {
///     let bytes = Exporter::new(&arena).export(model)?;
///     println!("{} bytes", bytes.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Exporter<'a, K = NativeKernel> {
    arena: &'a BrepArena,
    kernel: K,
    config: ExportConfig,
}

impl<'a> Exporter<'a, NativeKernel> {
    /// Creates an exporter with the default configuration and the native
    /// kernel.
    pub fn new(arena: &'a BrepArena) -> Self {
        Self::with_config(arena, ExportConfig::default())
    }

    /// Creates an exporter whose native kernel uses the configured
    /// equivalence tolerance.
    pub fn with_config(arena: &'a BrepArena, config: ExportConfig) -> Self {
        Self {
            arena,
            kernel: NativeKernel::new(config.equivalence_tolerance),
            config,
        }
    }
}

impl<'a, K: GeometryKernel> Exporter<'a, K> {
    /// Replaces the geometry kernel.
    pub fn with_kernel<K2: GeometryKernel>(self, kernel: K2) -> Exporter<'a, K2> {
        Exporter {
            arena: self.arena,
            kernel,
            config: self.config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports a model into a self-contained byte stream.
    ///
    /// Either the complete stream is returned or an error; no partial
    /// output survives a failure.
    pub fn export(&self, object: impl Into<ObjectKey>) -> Result<Vec<u8>> {
        let object = object.into();
        let ObjectKey::Model(key) = object else {
            return Err(Error::NotAModel(object));
        };
        let model = self.arena.model(key)?;

        info!(
            bodies = model.bodies.len(),
            extras = model.extras.len(),
            "exporting model"
        );

        let mut ctx = ExportContext::new(self.arena, &self.kernel, &self.config)?;
        ctx.stream.write_i32(MAGIC)?;
        ctx.stream.write_i32s(&REVISION)?;
        ctx.stream.write_box(&model.bbox)?;
        ctx.stream.write_count(model.bodies.len())?;
        ctx.write_object_attributes(key)?;

        for (i, &body) in model.bodies.iter().enumerate() {
            debug!(index = i + 1, "body");
            ctx.write_body(body)?;
        }

        ctx.stream.write_count(model.child_count())?;
        for extra in &model.extras {
            let (class, body) = match *extra {
                ModelExtra::Tessellation(t) => {
                    (ObjectClass::Tessellation, self.arena.tessellation(t)?.body)
                }
                ModelExtra::EBody(e) => (ObjectClass::EBody, self.arena.ebody(e)?.body),
            };
            let index = body_index(&model.bodies, body)?;
            debug!(class = %class, body = index, "trailing child");

            ctx.stream.write_i32(class.tag())?;
            ctx.stream.write_count(index)?;
            match *extra {
                ModelExtra::Tessellation(t) => ctx.write_tessellation(t)?,
                ModelExtra::EBody(e) => ctx.write_ebody(e)?,
            }
        }

        let bytes = ctx.stream.into_bytes();
        info!(bytes = bytes.len(), "model exported");
        Ok(bytes)
    }
}

/// 1-based position of `body` among the model's plain bodies.
fn body_index(bodies: &[BodyKey], body: BodyKey) -> Result<usize> {
    bodies
        .iter()
        .position(|&b| b == body)
        .map(|i| i + 1)
        .ok_or(Error::BodyNotInModel(body))
}

/// Exports a model with the default configuration and the native kernel.
pub fn export_model(arena: &BrepArena, object: impl Into<ObjectKey>) -> Result<Vec<u8>> {
    Exporter::new(arena).export(object)
}
