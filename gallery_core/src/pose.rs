//! Synthetic skeletons.
//!
//! Builds plausible full-body [`Body`] frames from a head position, for the
//! skeleton simulator and for tests.  All joints are reported `Tracked`.

use glam::Vec3;

use crate::body::{Body, JointType, TrackingState};
use crate::gesture::SwipeDirection;

/// Joint offsets from the head of an upright visitor with arms hanging.
/// Left-side joints sit at negative X.
const STANDING: [(JointType, Vec3); 25] = [
    (JointType::Head,          Vec3::new(0.0, 0.0, 0.0)),
    (JointType::Neck,          Vec3::new(0.0, -0.25, 0.0)),
    (JointType::SpineShoulder, Vec3::new(0.0, -0.30, 0.0)),
    (JointType::SpineMid,      Vec3::new(0.0, -0.55, 0.0)),
    (JointType::SpineBase,     Vec3::new(0.0, -0.80, 0.0)),
    (JointType::ShoulderLeft,  Vec3::new(-0.20, -0.30, 0.0)),
    (JointType::ElbowLeft,     Vec3::new(-0.30, -0.55, 0.0)),
    (JointType::WristLeft,     Vec3::new(-0.30, -0.75, 0.0)),
    (JointType::HandLeft,      Vec3::new(-0.28, -0.82, 0.0)),
    (JointType::HandTipLeft,   Vec3::new(-0.28, -0.90, 0.0)),
    (JointType::ThumbLeft,     Vec3::new(-0.25, -0.85, -0.02)),
    (JointType::ShoulderRight, Vec3::new(0.20, -0.30, 0.0)),
    (JointType::ElbowRight,    Vec3::new(0.30, -0.55, 0.0)),
    (JointType::WristRight,    Vec3::new(0.30, -0.75, 0.0)),
    (JointType::HandRight,     Vec3::new(0.28, -0.82, 0.0)),
    (JointType::HandTipRight,  Vec3::new(0.28, -0.90, 0.0)),
    (JointType::ThumbRight,    Vec3::new(0.25, -0.85, -0.02)),
    (JointType::HipLeft,       Vec3::new(-0.10, -0.85, 0.0)),
    (JointType::KneeLeft,      Vec3::new(-0.10, -1.30, 0.0)),
    (JointType::AnkleLeft,     Vec3::new(-0.10, -1.70, 0.0)),
    (JointType::FootLeft,      Vec3::new(-0.10, -1.75, -0.10)),
    (JointType::HipRight,      Vec3::new(0.10, -0.85, 0.0)),
    (JointType::KneeRight,     Vec3::new(0.10, -1.30, 0.0)),
    (JointType::AnkleRight,    Vec3::new(0.10, -1.70, 0.0)),
    (JointType::FootRight,     Vec3::new(0.10, -1.75, -0.10)),
];

/// An upright tracked visitor whose head is at `head`.
pub fn standing_body(tracking_id: u64, head: Vec3) -> Body {
    let mut body = Body::tracked(tracking_id);
    for (joint, offset) in STANDING {
        body.set_joint(joint, head + offset, TrackingState::Tracked);
    }
    body
}

/// Move one arm of `body` into the swipe pose: hand level with spine-mid,
/// held out past the elbow.
pub fn raise_arm(body: &mut Body, direction: SwipeDirection) {
    let (hand, elbow, outward) = match direction {
        SwipeDirection::Left => (JointType::HandLeft, JointType::ElbowLeft, -1.0),
        SwipeDirection::Right => (JointType::HandRight, JointType::ElbowRight, 1.0),
    };
    let (Some(spine), Some(elbow_pos)) = (body.position(JointType::SpineMid), body.position(elbow)) else {
        return;
    };
    let target = Vec3::new(elbow_pos.x + outward * 0.15, spine.y, elbow_pos.z - 0.2);
    body.set_joint(hand, target, TrackingState::Tracked);
}

/// A standing visitor at a comfortable viewing distance, mid-swipe.
pub fn swipe_pose(tracking_id: u64, direction: SwipeDirection) -> Body {
    let mut body = standing_body(tracking_id, Vec3::new(0.0, 0.6, 2.5));
    raise_arm(&mut body, direction);
    body
}

/// Tilt the head forward or back by `pitch_deg` around the neck.
///
/// The neck→head vector of an upright visitor is at 90° to the sensor axis.
/// Positive `pitch_deg` leans the head toward the sensor and widens that
/// angle; negative values lean it back and narrow it.
pub fn tilt_head(body: &mut Body, pitch_deg: f32) {
    let Some(neck) = body.position(JointType::Neck) else { return };
    let length = body.position(JointType::Head).map_or(0.25, |h| h.distance(neck));
    let rad = pitch_deg.to_radians();
    let head = neck + Vec3::new(0.0, rad.cos(), -rad.sin()) * length;
    body.set_joint(JointType::Head, head, TrackingState::Tracked);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::JOINT_COUNT;

    #[test]
    fn standing_body_is_complete() {
        let body = standing_body(3, Vec3::new(0.2, 0.6, 2.0));
        assert_eq!(body.joints.len(), JOINT_COUNT);
        assert_eq!(body.position(JointType::Head), Some(Vec3::new(0.2, 0.6, 2.0)));
    }

    #[test]
    fn tilt_changes_neck_angle() {
        let mut body = standing_body(1, Vec3::new(0.0, 0.6, 1.7));
        tilt_head(&mut body, 5.0);
        let neck = body.position(JointType::Neck).unwrap_or(Vec3::ZERO);
        let head = body.position(JointType::Head).unwrap_or(Vec3::ZERO);
        let angle = Vec3::Z.angle_between(head - neck).to_degrees();
        assert!((angle - 95.0).abs() < 0.01, "angle {angle}");
    }
}
