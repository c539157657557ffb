//! Picture navigation.
//!
//! The gallery is a row of picture slots.  Instead of moving the camera, the
//! whole gallery slides so the active slot ends up in front of it: the
//! gallery's target position is the negated local offset of the active slot.
//!
//! A navigation request is answered synchronously with a [`NavResponse`].
//! While a transition is in flight every request is answered `Busy`, which
//! is how swipes made during a slide are dropped.

use glam::Vec3;
use tracing::{debug, info};

use crate::config::NavigationConfig;
use crate::gesture::SwipeDirection;

// ════════════════════════════════════════════════════════════════════════════
// Responses and cues
// ════════════════════════════════════════════════════════════════════════════

/// Answer to a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavResponse {
    Accepted { from: usize, to: usize },
    /// A transition is already in flight.
    Busy,
    /// The move would run off the first or last picture.
    AtBoundary,
}

/// Light-switch sound cues for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    LightOn,
    LightOff,
}

/// Move `current` toward `target` by at most `max_delta`, landing exactly on
/// the target once within reach.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gallery
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Gallery {
    offsets:    Vec<Vec3>,
    speed:      f32,
    index:      usize,
    position:   Vec3,
    in_transit: bool,
    /// Accent light per slot.
    lights:     Vec<bool>,
}

impl Gallery {
    /// The gallery starts parked on `cfg.start_index`.  `cfg` must have been
    /// validated.
    pub fn new(cfg: &NavigationConfig) -> Self {
        let index = cfg.start_index.min(cfg.slot_offsets.len().saturating_sub(1));
        let position = cfg.slot_offsets.get(index).map_or(Vec3::ZERO, |o| -*o);
        Gallery {
            offsets: cfg.slot_offsets.clone(),
            speed: cfg.speed,
            index,
            position,
            in_transit: false,
            lights: vec![false; cfg.slot_offsets.len()],
        }
    }

    /// Handle a swipe.  On acceptance the outgoing picture's light goes off
    /// without a cue and the slide begins.
    pub fn request(&mut self, direction: SwipeDirection) -> NavResponse {
        if self.in_transit {
            debug!(direction = direction.as_str(), "navigation busy, swipe dropped");
            return NavResponse::Busy;
        }

        let target = self.index as i64 - direction.signal() as i64;
        if target < 0 || target >= self.offsets.len() as i64 {
            debug!(direction = direction.as_str(), index = self.index, "end of gallery");
            return NavResponse::AtBoundary;
        }

        let from = self.index;
        let to = target as usize;
        self.lights[from] = false;
        self.index = to;
        self.in_transit = true;
        info!(from, to, "moving to picture");
        NavResponse::Accepted { from, to }
    }

    /// Advance the slide by one frame.  Returns the index on arrival.
    pub fn tick(&mut self, dt: f32) -> Option<usize> {
        if !self.in_transit {
            return None;
        }
        let target = self.target();
        self.position = move_towards(self.position, target, self.speed * dt);
        if self.position == target {
            self.in_transit = false;
            debug!(index = self.index, "arrived");
            return Some(self.index);
        }
        None
    }

    /// Switch the active picture's light.  Returns a cue only on change.
    pub fn set_light(&mut self, on: bool) -> Option<Cue> {
        let light = self.lights.get_mut(self.index)?;
        if *light == on {
            return None;
        }
        *light = on;
        debug!(index = self.index, on, "accent light");
        Some(if on { Cue::LightOn } else { Cue::LightOff })
    }

    pub fn index(&self) -> usize { self.index }

    pub fn len(&self) -> usize { self.offsets.len() }

    pub fn is_empty(&self) -> bool { self.offsets.is_empty() }

    pub fn position(&self) -> Vec3 { self.position }

    /// Local slot offsets, in picture order.
    pub fn offsets(&self) -> &[Vec3] { &self.offsets }

    /// Resting position for the active picture.
    pub fn target(&self) -> Vec3 {
        self.offsets.get(self.index).map_or(Vec3::ZERO, |o| -*o)
    }

    pub fn in_transit(&self) -> bool { self.in_transit }

    pub fn light_on(&self, index: usize) -> bool {
        self.lights.get(index).copied().unwrap_or(false)
    }

    pub fn lights(&self) -> &[bool] { &self.lights }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
