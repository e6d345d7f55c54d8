use rustc_hash::FxHashMap;

use crate::animation::interpolator::{Interpolation, Interpolator};
use crate::animation::keyframe::{Keyframe, KeyframeStore};
use crate::animation::values::Value;
use crate::errors::Result;

/// One animated attribute: its keyframes plus the interpolator bound to them.
///
/// All mutation goes through the channel so the interpolator is rebuilt in
/// lock-step with the store.
#[derive(Debug, Clone)]
pub struct Channel {
    store: KeyframeStore,
    interpolator: Interpolator,
}

impl Channel {
    #[must_use]
    pub fn new(attribute: &str, camera: bool) -> Self {
        let store = KeyframeStore::for_attribute(attribute, camera);
        let interpolator = Interpolator::for_store(&store);
        Self {
            store,
            interpolator,
        }
    }

    pub fn set(
        &mut self,
        time: f32,
        value: Value,
        in_tangent: Option<Value>,
        out_tangent: Option<Value>,
    ) -> Result<()> {
        self.store.set(time, value, in_tangent, out_tangent)?;
        self.interpolator.rebuild(&self.store);
        Ok(())
    }

    pub fn remove(&mut self, time: f32) -> Option<Keyframe> {
        let removed = self.store.remove(time)?;
        self.interpolator.rebuild(&self.store);
        Some(removed)
    }

    /// Rebinds the channel to another strategy.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<()> {
        if interpolation != self.interpolator.interpolation() {
            self.interpolator = Interpolator::new(interpolation, &self.store)?;
        }
        Ok(())
    }

    #[inline]
    pub fn sample(&self, t: f32) -> Result<Value> {
        self.interpolator.interpolate(&self.store, t)
    }

    /// `true` once the channel holds at least one keyframe.
    #[inline]
    #[must_use]
    pub fn is_interpolatable(&self) -> bool {
        !self.store.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolator.interpolation()
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }
}

/// A namespace of channels keyed by attribute name.
///
/// Each timeline owns two independent sets: object attributes and camera
/// properties.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    camera: bool,
    channels: FxHashMap<String, Channel>,
}

impl ChannelSet {
    #[must_use]
    pub fn new(camera: bool) -> Self {
        Self {
            camera,
            channels: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Channel> {
        self.channels.get(attribute)
    }

    #[inline]
    pub fn get_mut(&mut self, attribute: &str) -> Option<&mut Channel> {
        self.channels.get_mut(attribute)
    }

    /// Returns the channel for `attribute`, creating it on first use.
    pub fn get_or_create(&mut self, attribute: &str) -> &mut Channel {
        let camera = self.camera;
        self.channels
            .entry(attribute.to_string())
            .or_insert_with(|| Channel::new(attribute, camera))
    }

    /// The channel for `attribute`, only if it has keyframes.
    #[must_use]
    pub fn interpolatable(&self, attribute: &str) -> Option<&Channel> {
        self.get(attribute).filter(|c| c.is_interpolatable())
    }

    /// `true` if any channel holds keyframes.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.channels.values().any(Channel::is_interpolatable)
    }

    /// Largest keyframe timestamp across all channels.
    #[must_use]
    pub fn last_time(&self) -> Option<f32> {
        self.channels
            .values()
            .filter_map(|c| c.store().last_time())
            .reduce(f32::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.channels.iter().map(|(name, channel)| (name.as_str(), channel))
    }

    #[inline]
    #[must_use]
    pub fn is_camera(&self) -> bool {
        self.camera
    }
}
