#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod errors;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{
    Interpolation, KeyframeBatch, Namespace, PlaybackState, Timeline, TimelinePlayer, Value,
};
pub use errors::{AnimationError, Result};
pub use scene::{Animatable, CameraRig, Capabilities, MemberHandle, Stage};
pub use settings::{PlaybackSettings, TimelineSettings};
pub use utils::time::{ManualClock, SystemClock, TimeSource};
