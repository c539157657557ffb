//! # gallery_core
//!
//! Sensor-to-control pipeline for a body-tracked photo gallery.  A visitor
//! walks in front of a depth sensor; their head position zooms, pans and
//! tilts a virtual camera over a row of pictures, the edges of the viewing
//! area blur the view, and an arm swipe slides the gallery to the next or
//! previous picture.
//!
//! ## Per-frame pipeline
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Reconcile tracked ids, pick controlling body | [`reconcile`] | appear / lost, crowd edges |
//! | Recognize swipes per body | [`gesture`] | `Left` / `Right` events |
//! | Slide the gallery | [`navigation`] | active picture, light cues |
//! | Head → camera + blur | [`control`] | [`control::ControlOutput`] |
//!
//! [`pipeline::Installation`] runs the stages in that order once per frame.
//!
//! ## Gesture → action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Right hand held out past the elbow, level with the spine | Next picture |
//! | Left hand held out past the elbow, level with the spine | Previous picture |
//! | Walk toward / away from the wall | Zoom in / out |
//! | Step sideways | Pan |
//! | Lean the head (close to the wall) | Tilt |
//! | Second visitor enters | Full blur + "multiple visitors" overlay |

pub mod body;
pub mod config;
pub mod control;
pub mod error;
pub mod gesture;
pub mod navigation;
pub mod pipeline;
pub mod pose;
pub mod reconcile;

pub use body::{Body, Joint, JointType, SkeletonView, TrackingState};
pub use config::InstallationConfig;
pub use control::{ControlOutput, Range};
pub use error::ConfigError;
pub use gesture::SwipeDirection;
pub use navigation::{Cue, NavResponse};
pub use pipeline::{FrameReport, Installation, SimulatorInput};
