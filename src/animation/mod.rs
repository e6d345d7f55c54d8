//! Animation Module
//!
//! Keyframe storage, interpolation and the timeline tree:
//!
//! - [`KeyframeStore`]: sorted keyframes of one attribute
//! - [`Interpolator`]: samples a store with a fixed [`Interpolation`]
//! - [`Timeline`]: a node of the animation tree, driving scene members
//! - [`TimelinePlayer`]: the root, owning the playback clock

pub mod channel;
pub mod ingest;
pub mod interpolator;
pub mod keyframe;
pub mod motion_path;
pub mod playback;
pub mod player;
pub mod system;
pub mod timeline;
pub mod values;

pub use channel::{Channel, ChannelSet};
pub use ingest::{BatchReport, KeyframeBatch};
pub use interpolator::{Interpolation, Interpolator, slerp_shortest};
pub use keyframe::{Keyframe, KeyframeStore};
pub use motion_path::MotionPath;
pub use playback::{ClockTick, PlaybackClock, PlaybackState};
pub use player::{PanelEvent, PlaybackPanel, TimelinePlayer};
pub use timeline::{Namespace, Timeline};
pub use values::{AttributeKind, Interpolatable, IntoValue, Value};
