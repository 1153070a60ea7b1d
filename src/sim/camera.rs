//! Third-person chase camera owned by a player controller
//!
//! Presentation only. The simulation reads back a single value: the
//! camera's forward axis, which is the view direction for missile lock-on.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use super::transform::Transform;
use crate::tuning::CameraTuning;
use crate::{ease_in_out_cubic, lerp, FORWARD, UP};

#[derive(Debug, Clone)]
pub struct CameraRig {
    pub location: Vec3,
    pub rotation: Quat,
    /// Smoothed up vector (follows ship roll)
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    rearview_enabled: bool,
    /// Teleport onto the target next update
    snap: bool,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            up: UP,
            fov: 77.0,
            rearview_enabled: false,
            snap: true,
        }
    }
}

impl CameraRig {
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    pub fn is_rearview(&self) -> bool {
        self.rearview_enabled
    }

    /// Jump straight behind the next followed ship instead of easing
    pub fn request_snap(&mut self) {
        self.snap = true;
    }

    pub fn update(
        &mut self,
        ship: &Transform,
        throttle: f32,
        rearview: bool,
        dt: f32,
        tuning: &CameraTuning,
    ) {
        let throttle_ratio = ease_in_out_cubic(throttle);
        let smooth_move_speed = lerp(tuning.move_speed.x, tuning.move_speed.y, throttle_ratio);
        let up_distance = lerp(tuning.up_range.x, tuning.up_range.y, throttle_ratio);

        let up = ship.up();
        let forward = ship.forward();
        let mut target_location = ship.location + up * up_distance;

        if rearview {
            // Linear in throttle, reads better than eased
            let distance = lerp(
                tuning.rearview_distance.x,
                tuning.rearview_distance.y,
                throttle.clamp(0.0, 1.0),
            );
            target_location += forward * distance;
            self.location = target_location;
            self.rotation = (Quat::from_axis_angle(up, PI) * ship.rotation).normalize();
            self.rearview_enabled = true;
        } else {
            let distance = lerp(tuning.backward.x, tuning.backward.y, throttle_ratio);
            target_location -= forward * distance;

            if self.rearview_enabled || self.snap {
                self.location = target_location;
                self.rotation = ship.rotation;
                self.rearview_enabled = false;
                self.snap = false;
            } else {
                let move_t = (dt * smooth_move_speed).min(1.0);
                let rotation_t = (dt * tuning.rotation_speed).min(1.0);
                self.location = self.location.lerp(target_location, move_t);
                self.rotation = self.rotation.lerp(ship.rotation, rotation_t).normalize();
            }
        }

        self.up = self.up.lerp(up, (dt * tuning.rotation_speed).min(1.0));
        self.fov = lerp(tuning.fov.x, tuning.fov.y, throttle_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_snaps_behind_ship() {
        let tuning = CameraTuning::default();
        let mut camera = CameraRig::default();
        let ship = Transform::from_location(Vec3::new(100.0, 0.0, 0.0));

        camera.update(&ship, 0.0, false, 1.0 / 60.0, &tuning);

        let expected = ship.location + UP * tuning.up_range.x - FORWARD * tuning.backward.x;
        assert!(camera.location.abs_diff_eq(expected, 1e-4));
        assert!(camera.forward().abs_diff_eq(FORWARD, 1e-5));
        assert_eq!(camera.fov, tuning.fov.x);
    }

    #[test]
    fn test_rearview_looks_backward_then_snaps_back() {
        let tuning = CameraTuning::default();
        let mut camera = CameraRig::default();
        let ship = Transform::default();

        camera.update(&ship, 0.5, true, 1.0 / 60.0, &tuning);
        assert!(camera.is_rearview());
        assert!(camera.forward().abs_diff_eq(-FORWARD, 1e-4));

        camera.update(&ship, 0.5, false, 1.0 / 60.0, &tuning);
        assert!(!camera.is_rearview());
        assert!(camera.forward().abs_diff_eq(FORWARD, 1e-4));
    }

    #[test]
    fn test_follow_eases_toward_target() {
        let tuning = CameraTuning::default();
        let mut camera = CameraRig::default();
        let mut ship = Transform::default();
        camera.update(&ship, 0.0, false, 1.0 / 60.0, &tuning);

        ship.location = Vec3::new(50.0, 0.0, 0.0);
        let before = camera.location;
        camera.update(&ship, 0.0, false, 1.0 / 60.0, &tuning);

        let target = ship.location + UP * tuning.up_range.x - FORWARD * tuning.backward.x;
        assert!(camera.location.distance(target) < before.distance(target));
        assert!(camera.location.distance(target) > 1.0);
    }
}
