// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export configuration loaded from environment variables.

/// Default initial size of the output buffer (1 MiB).
pub const DEFAULT_INITIAL_CAPACITY: usize = 1 << 20;
/// Default amount the output buffer grows by when it runs out (1 MiB).
pub const DEFAULT_GROWTH_CHUNK: usize = 1 << 20;
/// Default tolerance of the built-in geometric equivalence test.
pub const DEFAULT_EQUIVALENCE_TOLERANCE: f64 = 1e-12;

/// Export configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Bytes reserved before the first write.
    pub initial_capacity: usize,
    /// Minimum number of bytes added whenever the buffer must grow.
    pub growth_chunk: usize,
    /// Real-vector tolerance used by [`NativeKernel`](crate::NativeKernel).
    pub equivalence_tolerance: f64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl ExportConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            initial_capacity: env_or("EGADS_LITE_INITIAL_CAPACITY", DEFAULT_INITIAL_CAPACITY),
            growth_chunk: env_or("EGADS_LITE_GROWTH_CHUNK", DEFAULT_GROWTH_CHUNK).max(1),
            equivalence_tolerance: env_or("EGADS_LITE_TOLERANCE", DEFAULT_EQUIVALENCE_TOLERANCE),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_chunk: DEFAULT_GROWTH_CHUNK,
            equivalence_tolerance: DEFAULT_EQUIVALENCE_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.initial_capacity, 1024 * 1024);
        assert_eq!(config.growth_chunk, 1024 * 1024);
        assert_eq!(config.equivalence_tolerance, 1e-12);
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(env_or("EGADS_LITE_TEST_UNSET_VARIABLE", 7usize), 7);
    }
}
