//! # zoom_walk
//!
//! Keyboard-driven stand-in for the body-tracked gallery installation: a
//! simulated visitor walks, leans and swipes in front of a virtual sensor,
//! and a software-rendered window shows what the gallery projection would.
//!
//! ## Feature flags
//!
//! None.  The simulator always stands in for the sensor.
//!
//! ## Simulation modes
//!
//! * **skeleton** (default) — a full synthetic body goes through gesture
//!   recognition, tilt, blur and the multiple-visitors override.
//! * **direct** (`--direct`) — only floor position and a picture
//!   signal; zoom, pan and the accent light react, nothing else.
//!
//! See [`simulator`] for the key map.

pub mod simulator;
pub mod cues;
pub mod visualizer;
pub mod error;
pub mod app;
