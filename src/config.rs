use log::Level;
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Chatty while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

pub const ENROLL_URL: &str = "https://form.typeform.com/to/p1dfW2Ab";

pub const NOTICE_DURATION_MS: u32 = 4000;
pub const NOTICE_TRANSITION_MS: u32 = 300;
/// Shorter notices for "opening X..." style feedback.
pub const QUICK_NOTICE_MS: u32 = 2000;

pub const OVERLAY_TRANSITION_MS: u32 = 300;

pub const PRESS_FEEDBACK_MS: u32 = 150;

pub const SCROLL_TOP_THRESHOLD_PX: f64 = 500.0;
pub const SCROLL_DEBOUNCE_MS: u32 = 100;

pub const COUNTER_TARGET: u32 = 5000;
pub const COUNTER_STEPS: u32 = 100;
pub const COUNTER_TICK_MS: u32 = 20;

pub const RESOURCE_PREPARE_MS: u32 = 1500;
pub const RESOURCE_PREPARE_JITTER_MS: u32 = 1000;
pub const RESOURCE_RESET_MS: u32 = 3000;

/// Analytics names the overlay controller reports under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayEvents {
    pub opened: String,
    pub closed: String,
    pub link: String,
    /// Value of the `source` property on link events.
    pub source: String,
}

impl Default for OverlayEvents {
    fn default() -> Self {
        Self {
            opened: "video_modal_opened".to_string(),
            closed: "video_modal_closed".to_string(),
            link: "enroll_click".to_string(),
            source: "video_modal".to_string(),
        }
    }
}
