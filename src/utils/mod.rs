//! Utility Module
//!
//! - [`time`]: wall-clock sources used by the playback clock

pub mod time;

pub use time::{ManualClock, SystemClock, TimeSource};
