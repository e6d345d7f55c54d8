//! Error Types
//!
//! This module defines the error types used throughout the animation engine.
//!
//! # Overview
//!
//! The main error type [`AnimationError`] covers every way an authoring or
//! query call can be refused:
//! - Malformed keyframe payloads (wrong arity, non-finite timestamps)
//! - Queries against channels that hold no keyframes
//! - Members the engine cannot drive
//! - Interpolation strategies that do not fit a channel
//!
//! Playback misuse (negative speed, out-of-range seeks) is never an error:
//! those values are clamped or ignored so a UI control cannot break the
//! render loop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kinema::errors::{AnimationError, Result};
//!
//! fn author(timeline: &mut Timeline) -> Result<()> {
//!     timeline.set_position(1.0, [1.0, 2.0, 3.0])?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::animation::interpolator::Interpolation;
use crate::scene::MemberHandle;

/// The main error type for the animation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A keyframe value does not have the arity its attribute expects.
    /// The write is rejected and the store is left unchanged.
    #[error("Invalid value for '{attribute}': expected {expected} component(s), got {found}")]
    InvalidValue {
        /// Attribute the value was written to
        attribute: String,
        /// Human readable description of the accepted arity
        expected: String,
        /// Number of components actually supplied
        found: usize,
    },

    /// A timestamp was NaN or infinite.
    #[error("Keyframe timestamp must be finite, got {0}")]
    NonFiniteTimestamp(f32),

    /// The channel holds no keyframes (or does not exist).
    #[error("Attribute '{attribute}' has no keyframes to interpolate")]
    NotInterpolatable {
        /// Attribute that was queried
        attribute: String,
    },

    /// The member cannot be animated by a timeline.
    #[error("Member {handle:?} cannot be animated: {reason}")]
    UnsupportedMemberType {
        /// Offending member
        handle: MemberHandle,
        /// Why it was refused
        reason: &'static str,
    },

    /// The strategy cannot be bound to this channel.
    #[error("Interpolation {interpolation:?} is not supported for '{attribute}'")]
    UnsupportedInterpolation {
        /// Attribute of the channel
        attribute: String,
        /// Requested strategy
        interpolation: Interpolation,
    },

    /// The interpolator was built against an older revision of its store.
    #[error("Interpolator for '{attribute}' is stale; rebuild before sampling")]
    StaleInterpolator {
        /// Attribute of the channel
        attribute: String,
    },
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
