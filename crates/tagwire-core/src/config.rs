//! Per-call codec settings.

use serde::{Deserialize, Serialize};

use crate::format::FieldMode;

/// Default queue size before [`FlowWriter::write`](crate::flow::FlowWriter::write)
/// waits for a drain.
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

/// Default nesting limit for both encoding and decoding.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings shared by a serialize call and the deserialize call that reads
/// its output. The stream carries no header, so both sides must agree on
/// `field_mode` out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub field_mode: FieldMode,
    /// Bytes queued in the writer before a write suspends for a drain.
    pub high_water_mark: usize,
    /// Deepest mapping nesting accepted; the root value is depth 0.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            field_mode: FieldMode::default(),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn with_field_mode(mut self, field_mode: FieldMode) -> Self {
        self.field_mode = field_mode;
        self
    }

    /// Values below 1 are raised to 1.
    #[must_use]
    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark.max(1);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
