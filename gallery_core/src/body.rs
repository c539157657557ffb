//! Body-tracking data model.
//!
//! A [`Body`] is what the sensor collaborator reports for one visitor in one
//! frame: a stable tracking id, a tracked flag, and a map of the 25 skeleton
//! joints with their positions (meters, sensor frame) and tracking quality.
//! Everything here is plain data; nothing is retained between frames.

use std::collections::HashMap;

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// JointType
// ════════════════════════════════════════════════════════════════════════════

/// The 25 skeleton joints reported per body, in sensor enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointType {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

/// Number of joints per body.
pub const JOINT_COUNT: usize = 25;

impl JointType {
    /// Every joint, in enumeration order.
    pub const ALL: [JointType; JOINT_COUNT] = [
        Self::SpineBase,
        Self::SpineMid,
        Self::Neck,
        Self::Head,
        Self::ShoulderLeft,
        Self::ElbowLeft,
        Self::WristLeft,
        Self::HandLeft,
        Self::ShoulderRight,
        Self::ElbowRight,
        Self::WristRight,
        Self::HandRight,
        Self::HipLeft,
        Self::KneeLeft,
        Self::AnkleLeft,
        Self::FootLeft,
        Self::HipRight,
        Self::KneeRight,
        Self::AnkleRight,
        Self::FootRight,
        Self::SpineShoulder,
        Self::HandTipLeft,
        Self::ThumbLeft,
        Self::HandTipRight,
        Self::ThumbRight,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpineBase => "spine-base",
            Self::SpineMid => "spine-mid",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::ShoulderLeft => "shoulder-left",
            Self::ElbowLeft => "elbow-left",
            Self::WristLeft => "wrist-left",
            Self::HandLeft => "hand-left",
            Self::ShoulderRight => "shoulder-right",
            Self::ElbowRight => "elbow-right",
            Self::WristRight => "wrist-right",
            Self::HandRight => "hand-right",
            Self::HipLeft => "hip-left",
            Self::KneeLeft => "knee-left",
            Self::AnkleLeft => "ankle-left",
            Self::FootLeft => "foot-left",
            Self::HipRight => "hip-right",
            Self::KneeRight => "knee-right",
            Self::AnkleRight => "ankle-right",
            Self::FootRight => "foot-right",
            Self::SpineShoulder => "spine-shoulder",
            Self::HandTipLeft => "hand-tip-left",
            Self::ThumbLeft => "thumb-left",
            Self::HandTipRight => "hand-tip-right",
            Self::ThumbRight => "thumb-right",
        }
    }

    /// The joint this one connects to when drawing the skeleton, if any.
    ///
    /// `Head` is the root of the bone tree and has no parent.
    pub fn parent(&self) -> Option<JointType> {
        use JointType::*;
        let parent = match self {
            FootLeft => AnkleLeft,
            AnkleLeft => KneeLeft,
            KneeLeft => HipLeft,
            HipLeft => SpineBase,

            FootRight => AnkleRight,
            AnkleRight => KneeRight,
            KneeRight => HipRight,
            HipRight => SpineBase,

            HandTipLeft => HandLeft,
            ThumbLeft => HandLeft,
            HandLeft => WristLeft,
            WristLeft => ElbowLeft,
            ElbowLeft => ShoulderLeft,
            ShoulderLeft => SpineShoulder,

            HandTipRight => HandRight,
            ThumbRight => HandRight,
            HandRight => WristRight,
            WristRight => ElbowRight,
            ElbowRight => ShoulderRight,
            ShoulderRight => SpineShoulder,

            SpineBase => SpineMid,
            SpineMid => SpineShoulder,
            SpineShoulder => Neck,
            Neck => Head,

            Head => return None,
        };
        Some(parent)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingState / Joint
// ════════════════════════════════════════════════════════════════════════════

/// Sensor confidence for a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

impl TrackingState {
    /// Bone color used by the renderer (ARGB).
    pub fn color(&self) -> u32 {
        match self {
            Self::Tracked => 0xFF00FF00,  // green
            Self::Inferred => 0xFF00FFFF, // cyan
            Self::NotTracked => 0xFF000000,
        }
    }
}

/// One joint of one body in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub joint_type: JointType,
    /// Position in meters, sensor frame of reference.
    pub position: Vec3,
    pub tracking_state: TrackingState,
}

impl Joint {
    pub fn new(joint_type: JointType, position: Vec3, tracking_state: TrackingState) -> Self {
        Self { joint_type, position, tracking_state }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state != TrackingState::NotTracked
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Body
// ════════════════════════════════════════════════════════════════════════════

/// A visitor as reported by the sensor collaborator for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    /// Stable across frames while the visitor stays tracked.
    pub tracking_id: u64,
    pub is_tracked: bool,
    pub joints: HashMap<JointType, Joint>,
}

impl Body {
    /// An empty tracked body; add joints with [`Body::with_joint`].
    pub fn tracked(tracking_id: u64) -> Self {
        Self { tracking_id, is_tracked: true, joints: HashMap::new() }
    }

    /// Builder-style joint insertion.
    pub fn with_joint(mut self, joint_type: JointType, position: Vec3, state: TrackingState) -> Self {
        self.set_joint(joint_type, position, state);
        self
    }

    pub fn set_joint(&mut self, joint_type: JointType, position: Vec3, state: TrackingState) {
        self.joints.insert(joint_type, Joint::new(joint_type, position, state));
    }

    pub fn joint(&self, joint_type: JointType) -> Option<&Joint> {
        self.joints.get(&joint_type)
    }

    pub fn position(&self, joint_type: JointType) -> Option<Vec3> {
        self.joint(joint_type).map(|j| j.position)
    }

    pub fn head(&self) -> Option<&Joint> {
        self.joint(JointType::Head)
    }

    /// Joint positions scaled into scene units plus bone lines, for drawing.
    pub fn skeleton(&self) -> SkeletonView {
        let mut points: Vec<SkeletonPoint> = self
            .joints
            .values()
            .map(|j| SkeletonPoint {
                joint_type: j.joint_type,
                position: j.position * SCENE_SCALE,
                color: j.tracking_state.color(),
            })
            .collect();
        points.sort_by_key(|p| p.joint_type);

        let bones = points
            .iter()
            .filter_map(|p| {
                let parent = self.joint(p.joint_type.parent()?)?;
                Some(BoneLine {
                    from: p.position,
                    to: parent.position * SCENE_SCALE,
                    from_color: p.color,
                    to_color: parent.tracking_state.color(),
                })
            })
            .collect();

        SkeletonView { tracking_id: self.tracking_id, points, bones }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SkeletonView — render data for one body
// ════════════════════════════════════════════════════════════════════════════

/// Sensor meters → scene units.
pub const SCENE_SCALE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPoint {
    pub joint_type: JointType,
    pub position: Vec3,
    pub color: u32,
}

/// A line from a joint to its parent, colored at each end by tracking state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneLine {
    pub from: Vec3,
    pub to: Vec3,
    pub from_color: u32,
    pub to_color: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonView {
    pub tracking_id: u64,
    pub points: Vec<SkeletonPoint>,
    pub bones: Vec<BoneLine>,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
