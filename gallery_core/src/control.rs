//! Spatial control law: head position → camera transform and blur.
//!
//! Per frame, in order:
//!
//! 1. **Zoom**: head Z inside `[min_z, max_z]` is remapped through a quintic
//!    so near-range steps zoom less than far-range ones.  Outside, camera Z
//!    holds.
//! 2. **Light**: the active picture's accent light is wanted at or nearer
//!    than `light_toggle_z`.
//! 3. **Pan**: head X inside `[min_x, max_x]` is scaled by a gain that falls
//!    off with distance.
//! 4. **Tilt**: inside the tilt band the neck→head angle drives camera
//!    pitch; elsewhere pitch drifts back to level.
//! 5. **Classify**: which margin band, if any, the head is in.
//! 6. **Blur**: penetration into that band drives aperture, vignette and
//!    the out-of-range overlay.
//!
//! All remaps extrapolate; nothing here can fail.

use glam::Vec3;
use tracing::trace;

use crate::config::{BlurLaw, CameraLaw, InstallationConfig, ViewingVolume};

// ════════════════════════════════════════════════════════════════════════════
// Remaps
// ════════════════════════════════════════════════════════════════════════════

/// Affine remap of `value` from `[src_min, src_max]` onto `[dst_min, dst_max]`.
/// Values outside the source range extrapolate.
pub fn map_linear(value: f32, src_min: f32, src_max: f32, dst_min: f32, dst_max: f32) -> f32 {
    (value - src_min) / (src_max - src_min) * (dst_max - dst_min) + dst_min
}

/// Evaluate the zoom polynomial (coefficients for powers 5..0) at `z`.
pub fn map_nonlinear(coefficients: &[f32; 6], z: f32) -> f32 {
    let z = z as f64;
    coefficients
        .iter()
        .fold(0.0_f64, |acc, &c| acc * z + c as f64) as f32
}

/// Step `current` toward `target` by at most `max_step` degrees.
pub fn rotate_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_step {
        target
    } else {
        current + max_step.copysign(delta)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Range classification
// ════════════════════════════════════════════════════════════════════════════

/// Which margin band of the viewing volume the head is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Front,
    Back,
    Left,
    Right,
    /// Safe interior, no blur.
    Inside,
}

impl Range {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Inside => "inside",
        }
    }
}

/// Classify a head position.  Sides are tested left, right, front, back; a
/// corner is attributed to the first match.
pub fn classify(volume: &ViewingVolume, head: Vec3) -> Range {
    if head.x < volume.blur_start_min_x() {
        Range::Left
    } else if head.x > volume.blur_start_max_x() {
        Range::Right
    } else if head.z < volume.blur_start_min_z() {
        Range::Front
    } else if head.z > volume.blur_start_max_z() {
        Range::Back
    } else {
        Range::Inside
    }
}

/// Distance from the outer edge of the band inward: 0 at the outer edge,
/// `margin` at the inner boundary, negative beyond the outer edge.
pub fn penetration(volume: &ViewingVolume, range: Range, head: Vec3) -> Option<f32> {
    match range {
        Range::Front => Some(head.z - volume.min_z_for_blur),
        Range::Back => Some(volume.max_z - head.z),
        Range::Left => Some(head.x - volume.min_x),
        Range::Right => Some(volume.max_x - head.x),
        Range::Inside => None,
    }
}

/// Blur parameters for one penetration depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurLevel {
    pub aperture: f32,
    pub vignette: f32,
    pub opacity:  u8,
}

impl BlurLevel {
    /// `None` when the head is past the outer edge of the band.
    pub fn at(law: &BlurLaw, margin: f32, depth: f32) -> Option<Self> {
        if depth < 0.0 {
            return None;
        }
        let opacity = map_linear(depth, 0.0, margin, 255.0, 0.0).round().clamp(0.0, 255.0) as u8;
        Some(BlurLevel {
            aperture: map_linear(depth, 0.0, margin, law.min_aperture, law.max_aperture),
            vignette: map_linear(depth, 0.0, margin, law.max_vignette, 0.0),
            opacity,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlOutput
// ════════════════════════════════════════════════════════════════════════════

/// Everything the renderer needs from the control law, recomputed per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub camera_x:             f32,
    pub camera_z:             f32,
    /// Camera rotation around X, degrees.
    pub pitch_deg:            f32,
    /// Depth-of-field aperture; smaller is blurrier.
    pub aperture:             f32,
    pub vignette:             f32,
    /// "Out of range" overlay alpha.
    pub out_of_range_opacity: u8,
    /// "Multiple visitors" overlay alpha.
    pub crowd_opacity:        u8,
}

/// Side effects of one control step the caller must route elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlStep {
    /// Desired accent-light state; `None` when position tracking was frozen.
    pub light_wanted: Option<bool>,
    pub range:        Range,
}

// ════════════════════════════════════════════════════════════════════════════
// SpatialController
// ════════════════════════════════════════════════════════════════════════════

/// Owns [`ControlOutput`] and applies the control law to it every frame.
#[derive(Debug, Clone)]
pub struct SpatialController {
    volume: ViewingVolume,
    camera: CameraLaw,
    blur:   BlurLaw,
    output: ControlOutput,
    crowd:  bool,
}

impl SpatialController {
    pub fn new(cfg: &InstallationConfig) -> Self {
        SpatialController {
            volume: cfg.volume,
            camera: cfg.camera,
            blur:   cfg.blur,
            output: ControlOutput {
                camera_x:             0.0,
                camera_z:             cfg.camera.initial_camera_z,
                pitch_deg:            0.0,
                aperture:             cfg.blur.max_aperture,
                vignette:             0.0,
                out_of_range_opacity: 0,
                crowd_opacity:        0,
            },
            crowd: false,
        }
    }

    pub fn output(&self) -> &ControlOutput { &self.output }

    pub fn volume(&self) -> &ViewingVolume { &self.volume }

    /// Full control step for the controlling body's head (and neck, for tilt).
    ///
    /// `frozen` skips zoom, light and pan while the gallery is in transit.
    pub fn update(&mut self, head: Vec3, neck: Option<Vec3>, dt: f32, frozen: bool) -> ControlStep {
        let light_wanted = if frozen { None } else { Some(self.track_position(head.x, head.z)) };
        self.update_tilt(head, neck, dt);
        let range = self.update_blur(head);
        ControlStep { light_wanted, range }
    }

    /// Steps 1–3: zoom, light, pan.  Returns whether the accent light is
    /// wanted.  This is all the direct simulator drives.
    pub fn track_position(&mut self, x: f32, z: f32) -> bool {
        if self.volume.contains_z(z) {
            self.output.camera_z = map_nonlinear(&self.camera.zoom_coefficients, z);
        }

        let light_wanted = z <= self.camera.light_toggle_z;

        let gain = (1.0 - z / self.volume.max_z) * self.camera.lateral_scale;
        if self.volume.contains_x(x) {
            self.output.camera_x = x * gain;
        }

        light_wanted
    }

    /// Step 4: tilt toward the head pitch inside the band, level outside.
    pub fn update_tilt(&mut self, head: Vec3, neck: Option<Vec3>, dt: f32) {
        if !self.volume.in_tilt_band(head.z) {
            let step = self.camera.return_speed_deg * dt;
            self.output.pitch_deg = rotate_towards(self.output.pitch_deg, 0.0, step);
            return;
        }

        let Some(neck) = neck else { return };
        let neck_to_head = head - neck;
        if neck_to_head.length_squared() <= f32::EPSILON {
            return;
        }

        let angle = self.camera.baseline.angle_between(neck_to_head).to_degrees();
        let (lo, hi) = self.camera.tilt_domain_deg;
        let (down, up) = self.camera.tilt_range_deg;
        let target = map_linear(angle, lo, hi, down, up);
        let step = self.camera.tilt_speed_deg * dt;
        self.output.pitch_deg = rotate_towards(self.output.pitch_deg, target, step);
        trace!(angle, target, pitch = self.output.pitch_deg, "tilt");
    }

    /// Steps 5–6.  While the crowd override is active the aperture stays
    /// where the override put it.
    pub fn update_blur(&mut self, head: Vec3) -> Range {
        let range = classify(&self.volume, head);
        match penetration(&self.volume, range, head) {
            None => self.output.out_of_range_opacity = 0,
            Some(depth) => {
                if let Some(level) = BlurLevel::at(&self.blur, self.volume.margin, depth) {
                    if !self.crowd {
                        self.output.aperture = level.aperture;
                    }
                    self.output.vignette = level.vignette;
                    self.output.out_of_range_opacity = level.opacity;
                }
            }
        }
        range
    }

    /// Enter or leave the multiple-visitors override.  Only the transition
    /// writes the output.
    pub fn set_crowd_override(&mut self, active: bool) {
        if active == self.crowd {
            return;
        }
        self.crowd = active;
        if active {
            self.output.aperture = self.blur.min_aperture;
            self.output.crowd_opacity = 255;
        } else {
            self.output.aperture = self.blur.max_aperture;
            self.output.crowd_opacity = 0;
        }
    }

    pub fn crowd_override(&self) -> bool { self.crowd }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
