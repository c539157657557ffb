//! Keyboard stand-in for the body sensor.
//!
//! The visualizer translates window keys into [`SimInput`] events and sends
//! them over a `mpsc` channel; [`Simulator`] folds them into a virtual
//! visitor and produces one [`SimFrame`] per rendered frame.
//!
//! Two modes:
//!
//! * **Direct**: only the visitor's floor position and a navigation signal
//!   are produced.  Zoom, pan and light follow the position; the arrow keys
//!   navigate.  No tilt, no blur.
//! * **Skeleton**: a full tracked body is synthesized at the position and
//!   fed through the sensor path, so swipes, tilt, blur and the
//!   multiple-visitors override all work from the keyboard.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | `W` / `S` (hold) | Walk toward / away from the wall |
//! | `A` / `D` (hold) | Step sideways (mirrored, as seen by the sensor) |
//! | `←` / `→` | Previous / next picture (direct mode) |
//! | `J` / `L` (hold) | Hold left / right arm out (skeleton mode) |
//! | `I` / `K` (hold) | Lean head forward / back (skeleton mode) |
//! | `V` | Toggle a second visitor (skeleton mode) |
//! | `M` | Switch mode |
//! | `Q` / `Esc` | Quit |

use glam::{Vec2, Vec3};
use tracing::info;

use gallery_core::body::Body;
use gallery_core::gesture::SwipeDirection;
use gallery_core::pipeline::SimulatorInput;
use gallery_core::pose;

// ════════════════════════════════════════════════════════════════════════════
// SimInput — raw events from the window
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Key went down this frame.
    Pressed(SimKey),
    /// Key is being held this frame.
    Held(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Forward,        // W
    Back,           // S
    StepLeft,       // A
    StepRight,      // D
    PrevPicture,    // Left arrow
    NextPicture,    // Right arrow
    LeftArm,        // J
    RightArm,       // L
    LeanForward,    // I
    LeanBack,       // K
    SecondVisitor,  // V
    ToggleMode,     // M
    Quit,           // Q / Escape
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimMode {
    Direct,
    Skeleton,
}

impl SimMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Skeleton => "skeleton",
        }
    }
}

/// What the simulator hands to the pipeline for one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum SimFrame {
    Direct(SimulatorInput),
    Bodies(Vec<Body>),
}

// ════════════════════════════════════════════════════════════════════════════
// Simulator
// ════════════════════════════════════════════════════════════════════════════

/// Walking speed, meters per second.
const WALK_SPEED: f32 = 1.0;
/// Head lean rate, degrees per second.
const LEAN_SPEED: f32 = 20.0;
const MAX_LEAN: f32 = 15.0;
const HEAD_HEIGHT: f32 = 0.6;

const PRIMARY_ID: u64 = 1;
const SECOND_ID: u64 = 2;

pub struct Simulator {
    mode:           SimMode,
    /// x lateral, y sensor Z.
    position:       Vec2,
    lean_deg:       f32,
    second_visitor: bool,
    quit:           bool,

    // ── per-frame input, cleared by `step` ───────────────────────────────
    direction:      i32,
    walk:           Vec2,
    lean:           f32,
    arm:            Option<SwipeDirection>,
}

impl Simulator {
    pub fn new(mode: SimMode) -> Self {
        Simulator {
            mode,
            position:       Vec2::new(0.0, 2.5),
            lean_deg:       0.0,
            second_visitor: false,
            quit:           false,
            direction:      0,
            walk:           Vec2::ZERO,
            lean:           0.0,
            arm:            None,
        }
    }

    pub fn mode(&self) -> SimMode { self.mode }

    pub fn position(&self) -> Vec2 { self.position }

    pub fn second_visitor(&self) -> bool { self.second_visitor }

    pub fn quit_requested(&self) -> bool { self.quit }

    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Held(SimKey::Forward) => self.walk.y -= 1.0,
            SimInput::Held(SimKey::Back) => self.walk.y += 1.0,
            SimInput::Held(SimKey::StepLeft) => self.walk.x += 1.0,
            SimInput::Held(SimKey::StepRight) => self.walk.x -= 1.0,
            SimInput::Held(SimKey::LeanForward) => self.lean += 1.0,
            SimInput::Held(SimKey::LeanBack) => self.lean -= 1.0,
            SimInput::Held(SimKey::LeftArm) => self.arm = Some(SwipeDirection::Left),
            SimInput::Held(SimKey::RightArm) => self.arm = Some(SwipeDirection::Right),
            SimInput::Pressed(SimKey::PrevPicture) => self.direction = SwipeDirection::Left.signal(),
            SimInput::Pressed(SimKey::NextPicture) => self.direction = SwipeDirection::Right.signal(),
            SimInput::Pressed(SimKey::SecondVisitor) => {
                self.second_visitor = !self.second_visitor;
                info!(present = self.second_visitor, "simulated second visitor");
            }
            SimInput::Pressed(SimKey::ToggleMode) => {
                self.mode = match self.mode {
                    SimMode::Direct => SimMode::Skeleton,
                    SimMode::Skeleton => SimMode::Direct,
                };
                info!(mode = self.mode.as_str(), "simulator mode");
            }
            SimInput::Pressed(SimKey::Quit) => self.quit = true,
            _ => {}
        }
    }

    /// Integrate the held keys over `dt` and produce this frame's input.
    pub fn step(&mut self, dt: f32) -> SimFrame {
        self.position += self.walk * WALK_SPEED * dt;
        self.lean_deg = (self.lean_deg + self.lean * LEAN_SPEED * dt).clamp(-MAX_LEAN, MAX_LEAN);

        let frame = match self.mode {
            SimMode::Direct => SimFrame::Direct(SimulatorInput {
                position:  self.position,
                direction: self.direction,
            }),
            SimMode::Skeleton => SimFrame::Bodies(self.bodies()),
        };

        self.direction = 0;
        self.walk = Vec2::ZERO;
        self.lean = 0.0;
        self.arm = None;
        frame
    }

    fn bodies(&self) -> Vec<Body> {
        let head = Vec3::new(self.position.x, HEAD_HEIGHT, self.position.y);
        let mut visitor = pose::standing_body(PRIMARY_ID, head);
        if let Some(direction) = self.arm {
            pose::raise_arm(&mut visitor, direction);
        }
        if self.lean_deg != 0.0 {
            pose::tilt_head(&mut visitor, self.lean_deg);
        }

        let mut bodies = vec![visitor];
        if self.second_visitor {
            let beside = Vec3::new(self.position.x + 0.6, HEAD_HEIGHT, self.position.y + 0.5);
            bodies.push(pose::standing_body(SECOND_ID, beside));
        }
        bodies
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
