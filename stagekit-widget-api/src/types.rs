//! Data types shared between widget authors and the host

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Layout box the host assigns to a widget instance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetStyles {
    /// Width in host pixels
    pub width: f64,
    /// Height in host pixels
    pub height: f64,
}

impl WidgetStyles {
    /// Create a layout box
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Progress through an appear or disappear phase.
///
/// `data` is `None` when the widget declared no schema for the phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationParameters<T> {
    /// Current frame within the phase
    pub frame: u32,
    /// Total length of the phase in frames
    pub duration_in_frames: u32,
    /// Author-declared animation data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> AnimationParameters<T> {
    /// Create phase progress without data
    pub fn new(frame: u32, duration_in_frames: u32) -> Self {
        Self {
            frame,
            duration_in_frames,
            data: None,
        }
    }

    /// Builder: attach animation data
    #[must_use]
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Fraction of the phase already played, clamped to `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.duration_in_frames == 0 {
            return 1.0;
        }
        (f64::from(self.frame) / f64::from(self.duration_in_frames)).clamp(0.0, 1.0)
    }
}

/// A host-managed audio selection, read-only on the widget side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    /// Host identifier of the asset
    pub id: String,
    /// Asset kind as reported by the host (e.g. "speech", "music")
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the host serves the audio from
    pub url: String,
    /// Display name
    pub name: String,
    /// Opaque host data attached to the selection
    #[serde(default)]
    pub userdata: Value,
}
