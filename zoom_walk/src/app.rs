//! Top-level application loop.
//!
//! `AppState` owns the [`Installation`], the keyboard [`Simulator`] standing
//! in for the sensor, and the [`CuePlayer`].  Each frame it turns simulator
//! input into a pipeline frame, routes cues to the audio thread and keeps a
//! one-line status for the visualizer.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use glam::Vec2;
use tracing::info;

use gallery_core::body::JointType;
use gallery_core::config::InstallationConfig;
use gallery_core::navigation::NavResponse;
use gallery_core::pipeline::{FrameReport, Installation};

use crate::cues::{CuePlayer, CueSettings};
use crate::error::AppError;
use crate::simulator::{SimFrame, SimInput, SimMode, Simulator};
use crate::visualizer::{Scene, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub installation: InstallationConfig,
    pub mode:         SimMode,
    pub cues:         CueSettings,
    pub fps:          u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            installation: InstallationConfig::default(),
            mode:         SimMode::Skeleton,
            cues:         CueSettings::default(),
            fps:          60,
        }
    }
}

/// Longest frame step fed to the pipeline, seconds.
const MAX_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    installation: Installation,
    config:       InstallationConfig,
    simulator:    Simulator,
    cues:         CuePlayer,
    pub status:   String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self, AppError> {
        let installation = Installation::new(cfg.installation.clone())?;
        Ok(AppState {
            installation,
            config:    cfg.installation,
            simulator: Simulator::new(cfg.mode),
            cues:      CuePlayer::spawn(cfg.cues),
            status:    format!("Ready — {} simulator", cfg.mode.as_str()),
        })
    }

    pub fn apply(&mut self, input: SimInput) {
        self.simulator.apply(input);
    }

    pub fn quit_requested(&self) -> bool { self.simulator.quit_requested() }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32) -> FrameReport {
        let report = match self.simulator.step(dt) {
            SimFrame::Direct(input) => self.installation.process_simulated(input, dt),
            SimFrame::Bodies(bodies) => self.installation.process_frame(Some(&bodies), dt),
        };
        for &cue in &report.cues {
            self.cues.play(cue);
        }
        self.update_status(&report);
        report
    }

    fn update_status(&mut self, report: &FrameReport) {
        for response in &report.navigation {
            self.status = match response {
                NavResponse::Accepted { from, to } => format!("Moving picture {} → {}", from + 1, to + 1),
                NavResponse::Busy => "Still moving — swipe ignored".to_string(),
                NavResponse::AtBoundary => "End of gallery".to_string(),
            };
        }
        if let Some(index) = report.arrived {
            self.status = format!("Picture {} of {}", index + 1, self.installation.gallery().len());
        }
        if !report.bodies.appeared.is_empty() || !report.bodies.lost.is_empty() {
            self.status = format!("{} visitor(s) tracked", self.installation.bodies().len());
        }
    }

    /// Floor position of the controlling visitor, for the map.
    fn visitor(&self) -> Option<Vec2> {
        match self.simulator.mode() {
            SimMode::Direct => Some(self.simulator.position()),
            SimMode::Skeleton => {
                let id = self.installation.controlling()?;
                let skeleton = &self.installation.bodies().get(id)?.skeleton;
                let head = skeleton.points.iter().find(|p| p.joint_type == JointType::Head)?;
                let head = head.position / gallery_core::body::SCENE_SCALE;
                Some(Vec2::new(head.x, head.z))
            }
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn installation(&self) -> &Installation { &self.installation }

    pub fn scene(&self) -> Scene<'_> {
        let gallery = self.installation.gallery();
        Scene {
            output:    self.installation.output(),
            blur:      &self.config.blur,
            volume:    &self.config.volume,
            gallery:   gallery.position(),
            slots:     gallery.offsets(),
            active:    gallery.index(),
            lights:    gallery.lights(),
            skeletons: self.installation.skeletons().collect(),
            visitor:   self.visitor(),
            status:    &self.status,
            mode:      self.simulator.mode().as_str(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the visualizer, wires its keyboard events to the simulator and
/// drives the pipeline once per rendered frame.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut vis = Visualizer::new(sim_tx, cfg.fps).map_err(AppError::Window)?;
    let mut app = AppState::new(cfg)?;

    info!("gallery open");
    let mut last = Instant::now();
    while vis.is_open() {
        if !vis.poll_input() { break; }
        if !drain_input(&sim_rx, &mut app) { break; }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;

        app.tick(dt);
        vis.render(&app.scene());
    }

    info!(frames = app.installation().frames(), "gallery closed");
    Ok(())
}

/// Feed pending window input to the app.  Returns false on quit.
fn drain_input(rx: &Receiver<SimInput>, app: &mut AppState) -> bool {
    loop {
        match rx.try_recv() {
            Ok(input) => app.apply(input),
            Err(TryRecvError::Empty) => return !app.quit_requested(),
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimKey;
    use gallery_core::navigation::Cue;

    const DT: f32 = 1.0 / 60.0;

    fn make_app(mode: SimMode) -> AppState {
        let cfg = AppConfig {
            mode,
            cues: CueSettings { muted: true, ..CueSettings::default() },
            ..AppConfig::default()
        };
        match AppState::new(cfg) {
            Ok(app) => app,
            Err(e) => panic!("app failed to start: {e}"),
        }
    }

    #[test]
    fn invalid_config_is_reported() {
        let mut cfg = AppConfig::default();
        cfg.cues.muted = true;
        cfg.installation.navigation.slot_offsets.clear();
        assert!(matches!(AppState::new(cfg), Err(AppError::Config(_))));
    }

    #[test]
    fn arrow_key_navigates_in_direct_mode() {
        let mut app = make_app(SimMode::Direct);
        app.apply(SimInput::Pressed(SimKey::NextPicture));
        let report = app.tick(DT);
        assert_eq!(report.navigation, vec![NavResponse::Accepted { from: 0, to: 1 }]);
        assert!(app.status.contains("1 → 2"));
    }

    #[test]
    fn held_arm_swipes_in_skeleton_mode() {
        let mut app = make_app(SimMode::Skeleton);
        let mut responses = Vec::new();
        for _ in 0..4 {
            app.apply(SimInput::Held(SimKey::RightArm));
            responses.extend(app.tick(DT).navigation);
        }
        assert_eq!(responses, vec![NavResponse::Accepted { from: 0, to: 1 }]);
    }

    #[test]
    fn second_visitor_triggers_override() {
        let mut app = make_app(SimMode::Skeleton);
        app.tick(DT);
        app.apply(SimInput::Pressed(SimKey::SecondVisitor));
        app.tick(DT);
        assert_eq!(app.installation().output().crowd_opacity, 255);
        assert!(app.status.contains("2 visitor"));
    }

    #[test]
    fn first_frame_lights_the_picture() {
        let mut app = make_app(SimMode::Skeleton);
        let report = app.tick(DT);
        assert_eq!(report.cues, vec![Cue::LightOn]);
    }

    #[test]
    fn walking_forward_zooms_in() {
        let mut app = make_app(SimMode::Direct);
        app.tick(DT);
        let far = app.installation().output().camera_z;
        for _ in 0..30 {
            app.apply(SimInput::Held(SimKey::Forward));
            app.tick(DT);
        }
        assert!(app.installation().output().camera_z > far);
    }

    #[test]
    fn scene_reflects_state() {
        let mut app = make_app(SimMode::Skeleton);
        app.tick(DT);
        let scene = app.scene();
        assert_eq!(scene.slots.len(), 6);
        assert_eq!(scene.skeletons.len(), 1);
        let visitor = scene.visitor.unwrap_or(Vec2::ZERO);
        assert!((visitor.y - 2.5).abs() < 1e-4);
    }

    #[test]
    fn quit_key_stops_loop() {
        let (tx, rx) = mpsc::channel();
        let mut app = make_app(SimMode::Direct);
        let _ = tx.send(SimInput::Pressed(SimKey::Quit));
        assert!(!drain_input(&rx, &mut app));
    }
}
