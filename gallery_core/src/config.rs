//! Installation tuning.
//!
//! Every constant of the control pipeline lives in one of the structs below.
//! The defaults reproduce the classroom installation: a 2.4 m wide viewing
//! area from 1.3 m to 4 m in front of the sensor, a six-picture gallery, and
//! a projection frame roughly 2 m wide.

use glam::Vec3;

use crate::error::{ConfigError, Result};
use crate::gesture::OcclusionPolicy;

// ════════════════════════════════════════════════════════════════════════════
// ViewingVolume
// ════════════════════════════════════════════════════════════════════════════

/// The floor rectangle a visitor is expected to stay in, in sensor meters.
///
/// `min_z` is where camera tracking starts; blur starts earlier, at
/// `min_z_for_blur`, so a visitor walking toward the wall sees the picture
/// soften before tracking is lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingVolume {
    pub min_x:          f32,
    pub max_x:          f32,
    pub min_z:          f32,
    pub max_z:          f32,
    pub min_z_for_blur: f32,
    /// Width of the blur band inside each edge.
    pub margin:         f32,
}

impl Default for ViewingVolume {
    fn default() -> Self {
        ViewingVolume {
            min_x:          -1.2,
            max_x:          1.2,
            min_z:          1.85,
            max_z:          4.0,
            min_z_for_blur: 1.3,
            margin:         0.2,
        }
    }
}

impl ViewingVolume {
    pub fn blur_start_min_x(&self) -> f32 { self.min_x + self.margin }
    pub fn blur_start_max_x(&self) -> f32 { self.max_x - self.margin }
    pub fn blur_start_min_z(&self) -> f32 { self.min_z_for_blur + self.margin }
    pub fn blur_start_max_z(&self) -> f32 { self.max_z - self.margin }

    pub fn contains_z(&self, z: f32) -> bool { z >= self.min_z && z <= self.max_z }
    pub fn contains_x(&self, x: f32) -> bool { x >= self.min_x && x <= self.max_x }

    /// Open Z band in which head tilt drives camera pitch.
    pub fn in_tilt_band(&self, z: f32) -> bool {
        z < self.min_z && z > self.blur_start_min_z()
    }

    fn validate(&self) -> Result<()> {
        check_bounds("x", self.min_x, self.max_x)?;
        check_bounds("z", self.min_z, self.max_z)?;
        check_bounds("blur z", self.min_z_for_blur, self.max_z)?;
        check_positive("margin", self.margin)?;
        let width = self.max_x - self.min_x;
        if self.margin * 2.0 > width {
            return Err(ConfigError::MarginTooWide { axis: "x", margin: self.margin, extent: width });
        }
        let depth = self.max_z - self.min_z_for_blur;
        if self.margin * 2.0 > depth {
            return Err(ConfigError::MarginTooWide { axis: "z", margin: self.margin, extent: depth });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CameraLaw
// ════════════════════════════════════════════════════════════════════════════

/// Head position → camera transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLaw {
    /// Quintic zoom polynomial, coefficients for powers 5 down to 0.
    pub zoom_coefficients: [f32; 6],
    /// Lateral gain at the sensor; falls off linearly to zero at `max_z`.
    pub lateral_scale:     f32,
    /// Accent light is on at or nearer than this depth.
    pub light_toggle_z:    f32,
    /// Neck→head angle domain (degrees) mapped onto `tilt_range_deg`.
    pub tilt_domain_deg:   (f32, f32),
    pub tilt_range_deg:    (f32, f32),
    /// Degrees per second toward the tilt target.
    pub tilt_speed_deg:    f32,
    /// Degrees per second back to level outside the tilt band.
    pub return_speed_deg:  f32,
    /// Reference direction the neck→head vector is measured against.
    pub baseline:          Vec3,
    pub initial_camera_z:  f32,
}

impl Default for CameraLaw {
    fn default() -> Self {
        CameraLaw {
            zoom_coefficients: [1.93521, -28.0282, 153.417, -405.986, 521.014, -263.394],
            lateral_scale:     22.0,
            light_toggle_z:    3.8,
            tilt_domain_deg:   (80.0, 90.0),
            tilt_range_deg:    (-20.0, 5.0),
            tilt_speed_deg:    30.0,
            return_speed_deg:  15.0,
            baseline:          Vec3::Z,
            initial_camera_z:  -4.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BlurLaw
// ════════════════════════════════════════════════════════════════════════════

/// Margin penetration → depth-of-field and vignette.
///
/// Smaller aperture values mean a stronger blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurLaw {
    pub min_aperture: f32,
    pub max_aperture: f32,
    pub max_vignette: f32,
}

impl Default for BlurLaw {
    fn default() -> Self {
        BlurLaw { min_aperture: 1.0, max_aperture: 20.0, max_vignette: 0.5 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Consecutive segment matches needed for one swipe.
    pub segments:          usize,
    /// Frames a segment may stall before the gesture resets.
    pub window:            u32,
    /// Max vertical hand–spine distance, meters.
    pub spine_tolerance_m: f32,
    pub occlusion:         OcclusionPolicy,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            segments:          4,
            window:            10,
            spine_tolerance_m: 0.07,
            occlusion:         OcclusionPolicy::Evaluate,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NavigationConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct NavigationConfig {
    /// Local offset of each picture slot inside the gallery, in order.
    pub slot_offsets: Vec<Vec3>,
    /// Gallery travel speed, scene units per second.
    pub speed:        f32,
    pub start_index:  usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            slot_offsets: (0..6).map(|i| Vec3::new(i as f32 * 20.0, 0.0, 0.0)).collect(),
            speed:        15.0,
            start_index:  0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InstallationConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstallationConfig {
    pub volume:     ViewingVolume,
    pub camera:     CameraLaw,
    pub blur:       BlurLaw,
    pub gesture:    GestureConfig,
    pub navigation: NavigationConfig,
}

impl InstallationConfig {
    pub fn validate(&self) -> Result<()> {
        self.volume.validate()?;

        let (lo, hi) = self.camera.tilt_domain_deg;
        if lo == hi {
            return Err(ConfigError::DegenerateDomain { name: "tilt", min: lo, max: hi });
        }
        check_positive("lateral scale", self.camera.lateral_scale)?;
        check_positive("tilt speed", self.camera.tilt_speed_deg)?;
        check_positive("return speed", self.camera.return_speed_deg)?;

        check_bounds("aperture", self.blur.min_aperture, self.blur.max_aperture)?;

        if self.gesture.segments == 0 || self.gesture.window == 0 {
            return Err(ConfigError::EmptyGesture);
        }
        check_positive("spine tolerance", self.gesture.spine_tolerance_m)?;

        let slots = self.navigation.slot_offsets.len();
        if slots == 0 {
            return Err(ConfigError::EmptyGallery);
        }
        if self.navigation.start_index >= slots {
            return Err(ConfigError::StartIndexOutOfRange { index: self.navigation.start_index, len: slots });
        }
        check_positive("navigation speed", self.navigation.speed)
    }
}

fn check_bounds(axis: &'static str, min: f32, max: f32) -> Result<()> {
    if min >= max {
        return Err(ConfigError::InvertedBounds { axis, min, max });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if !(value > 0.0) {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(InstallationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn derived_blur_bounds() {
        let v = ViewingVolume::default();
        assert!((v.blur_start_min_x() - -1.0).abs() < 1e-6);
        assert!((v.blur_start_max_x() - 1.0).abs() < 1e-6);
        assert!((v.blur_start_min_z() - 1.5).abs() < 1e-6);
        assert!((v.blur_start_max_z() - 3.8).abs() < 1e-6);
    }

    #[test]
    fn tilt_band_is_open() {
        let v = ViewingVolume::default();
        assert!(v.in_tilt_band(1.7));
        assert!(!v.in_tilt_band(1.85));
        assert!(!v.in_tilt_band(v.blur_start_min_z()));
        assert!(!v.in_tilt_band(2.5));
    }

    #[test]
    fn empty_gallery_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.navigation.slot_offsets.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyGallery));
    }

    #[test]
    fn start_index_must_be_inside_gallery() {
        let mut cfg = InstallationConfig::default();
        cfg.navigation.start_index = 6;
        assert_eq!(cfg.validate(), Err(ConfigError::StartIndexOutOfRange { index: 6, len: 6 }));
    }

    #[test]
    fn inverted_volume_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.volume.min_x = 2.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvertedBounds { axis: "x", .. })));
    }

    #[test]
    fn oversized_margin_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.volume.margin = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::MarginTooWide { axis: "x", .. })));
    }

    #[test]
    fn zero_window_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.gesture.window = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyGesture));
    }

    #[test]
    fn nan_speed_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.navigation.speed = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositive { name: "navigation speed", .. })));
    }
}
