//! Swipe gesture recognition from body joint data.
//!
//! A swipe is the same single-frame pose (hand level with the spine, held
//! out past the elbow) matched on [`GestureConfig::segments`] consecutive
//! evaluations.  Each segment may stall for at most `window` frames before
//! the partial gesture is abandoned, so single-frame jitter never fires a
//! swipe and a half-made gesture does not linger.
//!
//! Recognizers hold no references to their consumers: [`SwipeRecognizer::update`]
//! returns the recognized direction and the caller decides what to do with it.

use tracing::debug;

use crate::body::{Body, JointType};
use crate::config::GestureConfig;

// ════════════════════════════════════════════════════════════════════════════
// Results and directions
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one segment test on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentResult {
    Failed,
    Succeeded,
    /// Neither matched nor contradicted; counts toward the segment window.
    Undetermined,
}

/// Direction of a recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Navigation signal: +1 for left, -1 for right.  The picture index moves
    /// by the negated signal.
    pub fn signal(&self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Right => -1,
        }
    }

    /// Inverse of [`SwipeDirection::signal`]; 0 and anything else is no swipe.
    pub fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            1 => Some(Self::Left),
            -1 => Some(Self::Right),
            _ => None,
        }
    }
}

/// What to do when a joint a segment depends on is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcclusionPolicy {
    /// Use whatever position the sensor reports.
    #[default]
    Evaluate,
    /// Fail the segment.
    Fail,
    /// Report [`SegmentResult::Undetermined`]; the window absorbs short
    /// occlusions.
    Hold,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSegment — single-frame pose tests
// ════════════════════════════════════════════════════════════════════════════

/// A stateless test of one body against one sub-pose.
pub trait GestureSegment {
    fn evaluate(&self, body: &Body) -> SegmentResult;
}

/// Hand at spine-mid height and further out than its elbow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeSegment {
    pub direction: SwipeDirection,
    pub spine_tolerance_m: f32,
    pub occlusion: OcclusionPolicy,
}

impl SwipeSegment {
    pub fn new(direction: SwipeDirection, cfg: &GestureConfig) -> Self {
        SwipeSegment {
            direction,
            spine_tolerance_m: cfg.spine_tolerance_m,
            occlusion: cfg.occlusion,
        }
    }

    fn unavailable(&self) -> SegmentResult {
        match self.occlusion {
            OcclusionPolicy::Hold => SegmentResult::Undetermined,
            OcclusionPolicy::Evaluate | OcclusionPolicy::Fail => SegmentResult::Failed,
        }
    }
}

impl GestureSegment for SwipeSegment {
    fn evaluate(&self, body: &Body) -> SegmentResult {
        let (hand, elbow) = match self.direction {
            SwipeDirection::Left => (JointType::HandLeft, JointType::ElbowLeft),
            SwipeDirection::Right => (JointType::HandRight, JointType::ElbowRight),
        };

        let (Some(spine), Some(hand), Some(elbow)) =
            (body.joint(JointType::SpineMid), body.joint(hand), body.joint(elbow))
        else {
            return self.unavailable();
        };

        if self.occlusion != OcclusionPolicy::Evaluate
            && !(spine.is_tracked() && hand.is_tracked() && elbow.is_tracked())
        {
            return self.unavailable();
        }

        let level = (spine.position.y - hand.position.y).abs() < self.spine_tolerance_m;
        let outward = match self.direction {
            SwipeDirection::Left => hand.position.x < elbow.position.x,
            SwipeDirection::Right => hand.position.x > elbow.position.x,
        };

        if level && outward {
            SegmentResult::Succeeded
        } else {
            SegmentResult::Failed
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeRecognizer — the temporal state machine
// ════════════════════════════════════════════════════════════════════════════

/// Sequences segment evaluations across frames for one direction.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    direction: SwipeDirection,
    segments:  Vec<SwipeSegment>,
    window:    u32,
    current:   usize,
    frames:    u32,
}

impl SwipeRecognizer {
    pub fn new(direction: SwipeDirection, cfg: &GestureConfig) -> Self {
        let segment = SwipeSegment::new(direction, cfg);
        SwipeRecognizer {
            direction,
            segments: vec![segment; cfg.segments.max(1)],
            window: cfg.window.max(1),
            current: 0,
            frames: 0,
        }
    }

    pub fn direction(&self) -> SwipeDirection { self.direction }

    /// Index of the segment awaiting a match.
    pub fn segment(&self) -> usize { self.current }

    /// Frames spent in the current segment without progress.
    pub fn frames(&self) -> u32 { self.frames }

    /// Feed one frame.  Returns the direction when the final segment matches.
    pub fn update(&mut self, body: &Body) -> Option<SwipeDirection> {
        match self.segments[self.current].evaluate(body) {
            SegmentResult::Succeeded => {
                if self.current + 1 < self.segments.len() {
                    self.current += 1;
                    self.frames = 0;
                    None
                } else {
                    debug!(body = body.tracking_id, direction = self.direction.as_str(), "swipe recognized");
                    self.reset();
                    Some(self.direction)
                }
            }
            SegmentResult::Failed => {
                self.reset();
                None
            }
            SegmentResult::Undetermined => {
                self.frames += 1;
                if self.frames >= self.window {
                    debug!(
                        body = body.tracking_id,
                        direction = self.direction.as_str(),
                        segment = self.current,
                        "swipe window expired"
                    );
                    self.reset();
                }
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.frames = 0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeDetectors — one recognizer per direction
// ════════════════════════════════════════════════════════════════════════════

/// Both directional recognizers for one body, fed the same frames.
#[derive(Debug, Clone)]
pub struct SwipeDetectors {
    pub left:  SwipeRecognizer,
    pub right: SwipeRecognizer,
}

impl SwipeDetectors {
    pub fn new(cfg: &GestureConfig) -> Self {
        SwipeDetectors {
            left:  SwipeRecognizer::new(SwipeDirection::Left, cfg),
            right: SwipeRecognizer::new(SwipeDirection::Right, cfg),
        }
    }

    /// Feed one frame to both recognizers; left is reported first.
    pub fn update(&mut self, body: &Body) -> Vec<SwipeDirection> {
        [self.left.update(body), self.right.update(body)]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::TrackingState;
    use crate::pose::{standing_body, swipe_pose};
    use glam::Vec3;

    fn recognizer(direction: SwipeDirection) -> SwipeRecognizer {
        SwipeRecognizer::new(direction, &GestureConfig::default())
    }

    fn hold_config() -> GestureConfig {
        GestureConfig { occlusion: OcclusionPolicy::Hold, ..GestureConfig::default() }
    }

    /// A body whose left-hand joints are occluded.
    fn occluded_left() -> Body {
        let mut body = swipe_pose(1, SwipeDirection::Left);
        let hand = body.position(JointType::HandLeft).unwrap_or(Vec3::ZERO);
        body.set_joint(JointType::HandLeft, hand, TrackingState::NotTracked);
        body
    }

    // ── segment evaluator ────────────────────────────────────────────────

    #[test]
    fn left_segment_matches_left_pose() {
        let seg = SwipeSegment::new(SwipeDirection::Left, &GestureConfig::default());
        assert_eq!(seg.evaluate(&swipe_pose(1, SwipeDirection::Left)), SegmentResult::Succeeded);
        assert_eq!(seg.evaluate(&standing_body(1, Vec3::new(0.0, 0.6, 2.5))), SegmentResult::Failed);
    }

    #[test]
    fn right_segment_mirrors_left() {
        let seg = SwipeSegment::new(SwipeDirection::Right, &GestureConfig::default());
        assert_eq!(seg.evaluate(&swipe_pose(1, SwipeDirection::Right)), SegmentResult::Succeeded);
        assert_eq!(seg.evaluate(&swipe_pose(1, SwipeDirection::Left)), SegmentResult::Failed);
    }

    #[test]
    fn hand_too_far_from_spine_fails() {
        let mut body = swipe_pose(1, SwipeDirection::Left);
        let spine = body.position(JointType::SpineMid).unwrap_or(Vec3::ZERO);
        let hand = body.position(JointType::HandLeft).unwrap_or(Vec3::ZERO);
        body.set_joint(JointType::HandLeft, Vec3::new(hand.x, spine.y + 0.08, hand.z), TrackingState::Tracked);
        let seg = SwipeSegment::new(SwipeDirection::Left, &GestureConfig::default());
        assert_eq!(seg.evaluate(&body), SegmentResult::Failed);
    }

    #[test]
    fn missing_joint_fails_by_default() {
        let mut body = swipe_pose(1, SwipeDirection::Left);
        body.joints.remove(&JointType::ElbowLeft);
        let seg = SwipeSegment::new(SwipeDirection::Left, &GestureConfig::default());
        assert_eq!(seg.evaluate(&body), SegmentResult::Failed);
    }

    #[test]
    fn occlusion_policies() {
        let body = occluded_left();
        let with = |occlusion| {
            let cfg = GestureConfig { occlusion, ..GestureConfig::default() };
            SwipeSegment::new(SwipeDirection::Left, &cfg).evaluate(&body)
        };
        assert_eq!(with(OcclusionPolicy::Evaluate), SegmentResult::Succeeded);
        assert_eq!(with(OcclusionPolicy::Fail), SegmentResult::Failed);
        assert_eq!(with(OcclusionPolicy::Hold), SegmentResult::Undetermined);
    }

    #[test]
    fn direction_signal_round_trips() {
        for d in [SwipeDirection::Left, SwipeDirection::Right] {
            assert_eq!(SwipeDirection::from_signal(d.signal()), Some(d));
        }
        assert_eq!(SwipeDirection::from_signal(0), None);
    }

    // ── state machine ────────────────────────────────────────────────────

    #[test]
    fn four_matches_emit_exactly_one_swipe() {
        let mut r = recognizer(SwipeDirection::Left);
        let pose = swipe_pose(1, SwipeDirection::Left);
        let events: Vec<_> = (0..4).filter_map(|_| r.update(&pose)).collect();
        assert_eq!(events, vec![SwipeDirection::Left]);
        assert_eq!((r.segment(), r.frames()), (0, 0));
    }

    #[test]
    fn three_matches_do_not_emit() {
        let mut r = recognizer(SwipeDirection::Right);
        let pose = swipe_pose(1, SwipeDirection::Right);
        for _ in 0..3 {
            assert_eq!(r.update(&pose), None);
        }
        assert_eq!(r.segment(), 3);
    }

    #[test]
    fn held_pose_fires_every_fourth_frame() {
        let mut r = recognizer(SwipeDirection::Left);
        let pose = swipe_pose(1, SwipeDirection::Left);
        let fired: Vec<usize> = (0..12).filter(|_| r.update(&pose).is_some()).collect();
        assert_eq!(fired.len(), 3);
    }

    #[test]
    fn failure_mid_gesture_resets_without_event() {
        let mut r = recognizer(SwipeDirection::Left);
        let pose = swipe_pose(1, SwipeDirection::Left);
        let rest = standing_body(1, Vec3::new(0.0, 0.6, 2.5));
        r.update(&pose);
        r.update(&pose);
        assert_eq!(r.segment(), 2);
        assert_eq!(r.update(&rest), None);
        assert_eq!(r.segment(), 0);
    }

    #[test]
    fn window_of_ten_stalled_frames_resets() {
        let mut r = SwipeRecognizer::new(SwipeDirection::Left, &hold_config());
        r.update(&swipe_pose(1, SwipeDirection::Left));
        assert_eq!(r.segment(), 1);

        let stalled = occluded_left();
        for _ in 0..9 {
            assert_eq!(r.update(&stalled), None);
        }
        assert_eq!((r.segment(), r.frames()), (1, 9));

        assert_eq!(r.update(&stalled), None);
        assert_eq!((r.segment(), r.frames()), (0, 0));
    }

    #[test]
    fn stall_then_resume_still_completes() {
        let mut r = SwipeRecognizer::new(SwipeDirection::Left, &hold_config());
        let pose = swipe_pose(1, SwipeDirection::Left);
        let stalled = occluded_left();
        r.update(&pose);
        for _ in 0..5 {
            r.update(&stalled);
        }
        assert_eq!(r.update(&pose), None);
        assert_eq!(r.frames(), 0, "advancing clears the window counter");
        r.update(&pose);
        assert_eq!(r.update(&pose), Some(SwipeDirection::Left));
    }

    #[test]
    fn detectors_run_both_directions() {
        let mut d = SwipeDetectors::new(&GestureConfig::default());
        let pose = swipe_pose(1, SwipeDirection::Right);
        let mut events = Vec::new();
        for _ in 0..4 {
            events.extend(d.update(&pose));
        }
        assert_eq!(events, vec![SwipeDirection::Right]);
        assert_eq!(d.left.segment(), 0);
    }
}
