//! The per-frame pass.
//!
//! [`Installation`] owns every stateful piece of the pipeline and is driven
//! once per rendered frame, either from a sensor body snapshot
//! ([`Installation::process_frame`]) or from the direct simulator
//! ([`Installation::process_simulated`]).  Each call is bounded and
//! synchronous; the only state that crosses frames is what the components
//! own.
//!
//! Sensor frame order:
//!
//! 1. reconcile bodies (lost before appeared), apply crowd override edges
//! 2. feed every tracked body to its recognizers; keep the controlling
//!    body's swipes
//! 3. submit those swipes to the gallery
//! 4. run the control law on the controlling body's head
//! 5. advance the gallery slide

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::body::{Body, JointType, SkeletonView};
use crate::config::InstallationConfig;
use crate::control::{ControlOutput, Range, SpatialController};
use crate::error::Result;
use crate::gesture::SwipeDirection;
use crate::navigation::{Cue, Gallery, NavResponse};
use crate::reconcile::{BodyTable, CrowdChange, Reconciliation};

// ════════════════════════════════════════════════════════════════════════════
// Inputs and reports
// ════════════════════════════════════════════════════════════════════════════

/// What the direct simulator supplies instead of a body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatorInput {
    /// Visitor floor position: x lateral, y holds sensor Z.
    pub position:  Vec2,
    /// +1 previous picture, -1 next picture, 0 nothing.
    pub direction: i32,
}

/// Everything that happened during one frame, for the collaborators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// No body array was supplied; nothing changed.
    pub skipped:     bool,
    pub bodies:      Reconciliation,
    /// Swipes recognized on the controlling body.
    pub swipes:      Vec<SwipeDirection>,
    pub navigation:  Vec<NavResponse>,
    /// Picture index the gallery came to rest on this frame.
    pub arrived:     Option<usize>,
    pub cues:        Vec<Cue>,
    /// Margin classification of the controlling head, when there was one.
    pub range:       Option<Range>,
}

// ════════════════════════════════════════════════════════════════════════════
// Installation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Installation {
    bodies:  BodyTable,
    control: SpatialController,
    gallery: Gallery,
    frames:  u64,
}

impl Installation {
    pub fn new(cfg: InstallationConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Installation {
            bodies:  BodyTable::new(cfg.gesture),
            control: SpatialController::new(&cfg),
            gallery: Gallery::new(&cfg.navigation),
            frames:  0,
        })
    }

    /// One sensor frame.  `None` means the sensor supplied no body array;
    /// the frame is skipped and every output holds.
    pub fn process_frame(&mut self, frame: Option<&[Body]>, dt: f32) -> FrameReport {
        let Some(bodies) = frame else {
            debug!("no body frame, holding");
            return FrameReport { skipped: true, ..FrameReport::default() };
        };
        self.frames += 1;

        let reconciliation = self.bodies.reconcile(bodies);
        match reconciliation.crowd {
            Some(CrowdChange::Entered) => self.control.set_crowd_override(true),
            Some(CrowdChange::Left) => self.control.set_crowd_override(false),
            None => {}
        }
        let controlling = reconciliation.controlling;

        let mut report = FrameReport { bodies: reconciliation, ..FrameReport::default() };

        let mut seen = BTreeSet::new();
        let mut controller_body = None;
        for body in bodies.iter().filter(|b| b.is_tracked) {
            if !seen.insert(body.tracking_id) {
                continue;
            }
            let swipes = self.bodies.observe(body);
            if Some(body.tracking_id) == controlling {
                report.swipes = swipes;
                controller_body = Some(body);
            }
        }

        for &direction in &report.swipes {
            report.navigation.push(self.gallery.request(direction));
        }

        if let Some(head) = controller_body.and_then(Body::head) {
            let neck = controller_body.and_then(|b| b.position(JointType::Neck));
            let step = self.control.update(head.position, neck, dt, self.gallery.in_transit());
            if let Some(cue) = step.light_wanted.and_then(|on| self.gallery.set_light(on)) {
                report.cues.push(cue);
            }
            report.range = Some(step.range);
        }

        report.arrived = self.gallery.tick(dt);
        report
    }

    /// One frame from the direct simulator: position drives zoom, pan and
    /// light; the direction signal drives navigation.  No tilt, no blur.
    pub fn process_simulated(&mut self, input: SimulatorInput, dt: f32) -> FrameReport {
        self.frames += 1;
        let mut report = FrameReport::default();

        if let Some(direction) = SwipeDirection::from_signal(input.direction) {
            report.swipes.push(direction);
            report.navigation.push(self.gallery.request(direction));
        }

        if !self.gallery.in_transit() {
            let on = self.control.track_position(input.position.x, input.position.y);
            if let Some(cue) = self.gallery.set_light(on) {
                report.cues.push(cue);
            }
        }

        report.arrived = self.gallery.tick(dt);
        report
    }

    pub fn output(&self) -> &ControlOutput { self.control.output() }

    pub fn gallery(&self) -> &Gallery { &self.gallery }

    pub fn bodies(&self) -> &BodyTable { &self.bodies }

    pub fn controlling(&self) -> Option<u64> { self.bodies.controlling() }

    /// Frames processed so far, skipped frames excluded.
    pub fn frames(&self) -> u64 { self.frames }

    /// Render data for every tracked body, lowest id first.
    pub fn skeletons(&self) -> impl Iterator<Item = &SkeletonView> {
        self.bodies.iter().map(|b| &b.skeleton)
    }

    /// Gallery position in scene units, for the renderer.
    pub fn gallery_position(&self) -> Vec3 { self.gallery.position() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{standing_body, swipe_pose};

    const DT: f32 = 1.0 / 30.0;

    fn installation() -> Installation {
        match Installation::new(InstallationConfig::default()) {
            Ok(i) => i,
            Err(e) => panic!("default config rejected: {e}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = InstallationConfig::default();
        cfg.navigation.slot_offsets.clear();
        assert!(Installation::new(cfg).is_err());
    }

    #[test]
    fn missing_frame_holds_everything() {
        let mut inst = installation();
        let body = standing_body(1, Vec3::new(0.3, 0.6, 2.5));
        inst.process_frame(Some(&[body]), DT);
        let before = *inst.output();
        let report = inst.process_frame(None, DT);
        assert!(report.skipped);
        assert_eq!(*inst.output(), before);
        assert_eq!(inst.frames(), 1);
    }

    #[test]
    fn controlling_head_drives_camera() {
        let mut inst = installation();
        let report = inst.process_frame(Some(&[standing_body(1, Vec3::new(0.5, 0.6, 2.0))]), DT);
        assert_eq!(report.range, Some(Range::Inside));
        assert!((inst.output().camera_x - 5.5).abs() < 1e-3);
        assert_eq!(report.cues, vec![Cue::LightOn]);
    }

    #[test]
    fn lowest_id_controls_with_two_visitors() {
        let mut inst = installation();
        let near = standing_body(9, Vec3::new(0.5, 0.6, 2.0));
        let far = standing_body(3, Vec3::new(-0.5, 0.6, 2.0));
        inst.process_frame(Some(&[near, far]), DT);
        assert_eq!(inst.controlling(), Some(3));
        assert!((inst.output().camera_x - -5.5).abs() < 1e-3);
    }

    #[test]
    fn empty_frame_holds_camera() {
        let mut inst = installation();
        inst.process_frame(Some(&[standing_body(1, Vec3::new(0.5, 0.6, 2.0))]), DT);
        let before = *inst.output();
        let report = inst.process_frame(Some(&[]), DT);
        assert_eq!(report.bodies.lost, vec![1]);
        assert_eq!(report.range, None);
        assert_eq!(*inst.output(), before);
    }

    #[test]
    fn swipe_from_bystander_is_ignored() {
        let mut inst = installation();
        for _ in 0..4 {
            let controller = standing_body(1, Vec3::new(0.0, 0.6, 2.5));
            let bystander = swipe_pose(2, SwipeDirection::Right);
            let report = inst.process_frame(Some(&[bystander, controller]), DT);
            assert!(report.swipes.is_empty());
        }
        assert_eq!(inst.gallery().index(), 0);
    }

    #[test]
    fn simulator_direction_navigates() {
        let mut inst = installation();
        let input = SimulatorInput { position: Vec2::new(0.0, 2.5), direction: -1 };
        let report = inst.process_simulated(input, DT);
        assert_eq!(report.navigation, vec![NavResponse::Accepted { from: 0, to: 1 }]);
        assert!(inst.gallery().in_transit());
        assert!(report.cues.is_empty(), "camera frozen while sliding");
    }

    #[test]
    fn simulator_position_moves_camera() {
        let mut inst = installation();
        let input = SimulatorInput { position: Vec2::new(0.5, 2.0), direction: 0 };
        let report = inst.process_simulated(input, DT);
        assert!((inst.output().camera_x - 5.5).abs() < 1e-3);
        assert_eq!(report.cues, vec![Cue::LightOn]);
        assert!(report.navigation.is_empty());
    }
}
