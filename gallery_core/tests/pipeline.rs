//! End-to-end frames through `Installation`.

use gallery_core::body::Body;
use gallery_core::pose::{standing_body, swipe_pose};
use gallery_core::{Cue, Installation, InstallationConfig, NavResponse, Range, SwipeDirection};
use glam::Vec3;

const DT: f32 = 1.0 / 30.0;

fn installation() -> Installation {
    match Installation::new(InstallationConfig::default()) {
        Ok(i) => i,
        Err(e) => panic!("default config rejected: {e}"),
    }
}

fn visitor(id: u64, x: f32, z: f32) -> Body {
    standing_body(id, Vec3::new(x, 0.6, z))
}

// ── multiple visitors ─────────────────────────────────────────────────────

#[test]
fn second_visitor_forces_full_blur_until_alone_again() {
    let mut inst = installation();

    inst.process_frame(Some(&[visitor(1, 0.0, 2.5)]), DT);
    assert_eq!(inst.output().aperture, 20.0);
    assert_eq!(inst.output().crowd_opacity, 0);

    let report = inst.process_frame(Some(&[visitor(1, 0.0, 2.5), visitor(2, 0.4, 3.0)]), DT);
    assert_eq!(report.bodies.appeared, vec![2]);
    assert_eq!(inst.output().aperture, 1.0);
    assert_eq!(inst.output().crowd_opacity, 255);

    // the controlling visitor drifts into the back margin: aperture stays pinned
    inst.process_frame(Some(&[visitor(1, 0.0, 3.9), visitor(2, 0.4, 3.0)]), DT);
    assert_eq!(inst.output().aperture, 1.0);
    assert!(inst.output().out_of_range_opacity > 0);

    let report = inst.process_frame(Some(&[visitor(1, 0.0, 2.5)]), DT);
    assert_eq!(report.bodies.lost, vec![2]);
    assert_eq!(inst.output().aperture, 20.0);
    assert_eq!(inst.output().crowd_opacity, 0);
    assert_eq!(inst.output().out_of_range_opacity, 0);
}

#[test]
fn control_passes_to_next_lowest_id() {
    let mut inst = installation();
    inst.process_frame(Some(&[visitor(4, 0.5, 2.0), visitor(8, -0.5, 2.0)]), DT);
    assert_eq!(inst.controlling(), Some(4));
    assert!(inst.output().camera_x > 0.0);

    inst.process_frame(Some(&[visitor(8, -0.5, 2.0)]), DT);
    assert_eq!(inst.controlling(), Some(8));
    assert!(inst.output().camera_x < 0.0);
}

// ── swipe → navigation ────────────────────────────────────────────────────

#[test]
fn right_swipe_slides_to_next_picture() {
    let mut inst = installation();

    let first = inst.process_frame(Some(&[swipe_pose(1, SwipeDirection::Right)]), DT);
    assert_eq!(first.cues, vec![Cue::LightOn]);
    assert!(inst.gallery().light_on(0));

    let mut accepted = None;
    for _ in 0..3 {
        let report = inst.process_frame(Some(&[swipe_pose(1, SwipeDirection::Right)]), DT);
        if !report.navigation.is_empty() {
            accepted = Some(report);
        }
    }
    let Some(report) = accepted else { panic!("swipe not recognized") };
    assert_eq!(report.swipes, vec![SwipeDirection::Right]);
    assert_eq!(report.navigation, vec![NavResponse::Accepted { from: 0, to: 1 }]);
    assert!(report.cues.is_empty(), "outgoing light goes off silently");
    assert!(!inst.gallery().light_on(0));
    assert!(inst.gallery().in_transit());

    let camera_x = inst.output().camera_x;
    let mut arrived = None;
    for _ in 0..200 {
        let report = inst.process_frame(Some(&[visitor(1, 0.8, 2.5)]), DT);
        if inst.gallery().in_transit() {
            assert_eq!(inst.output().camera_x, camera_x, "camera frozen while sliding");
        }
        if report.arrived.is_some() {
            arrived = report.arrived;
            break;
        }
    }
    assert_eq!(arrived, Some(1));
    assert_eq!(inst.gallery_position(), Vec3::new(-20.0, 0.0, 0.0));

    let report = inst.process_frame(Some(&[visitor(1, 0.8, 2.5)]), DT);
    assert_eq!(report.cues, vec![Cue::LightOn]);
    assert!(inst.gallery().light_on(1));
    assert_ne!(inst.output().camera_x, camera_x);
}

#[test]
fn left_swipe_on_first_picture_does_nothing() {
    let mut inst = installation();
    let mut responses = Vec::new();
    for _ in 0..4 {
        let report = inst.process_frame(Some(&[swipe_pose(1, SwipeDirection::Left)]), DT);
        responses.extend(report.navigation);
    }
    assert_eq!(responses, vec![NavResponse::AtBoundary]);
    assert_eq!(inst.gallery().index(), 0);
    assert!(!inst.gallery().in_transit());
}

// ── missing frames ────────────────────────────────────────────────────────

#[test]
fn missing_body_frame_freezes_the_slide() {
    let mut inst = installation();
    for _ in 0..4 {
        inst.process_frame(Some(&[swipe_pose(1, SwipeDirection::Right)]), DT);
    }
    assert!(inst.gallery().in_transit());
    inst.process_frame(Some(&[visitor(1, 0.0, 2.5)]), DT);

    let position = inst.gallery_position();
    let output = *inst.output();
    for _ in 0..10 {
        let report = inst.process_frame(None, DT);
        assert!(report.skipped);
    }
    assert_eq!(inst.gallery_position(), position);
    assert_eq!(*inst.output(), output);
}

#[test]
fn empty_room_keeps_sliding() {
    let mut inst = installation();
    for _ in 0..4 {
        inst.process_frame(Some(&[swipe_pose(1, SwipeDirection::Right)]), DT);
    }
    let start = inst.gallery_position();
    let report = inst.process_frame(Some(&[]), DT);
    assert_eq!(report.range, None);
    assert!(inst.gallery_position().x < start.x);
}

#[test]
fn margin_reported_for_controlling_head() {
    let mut inst = installation();
    let report = inst.process_frame(Some(&[visitor(1, -1.1, 2.5)]), DT);
    assert_eq!(report.range, Some(Range::Left));
    assert!(inst.output().aperture < 20.0);
}
