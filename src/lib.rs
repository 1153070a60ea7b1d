//! Spaceship - arcade space-combat simulation core
//!
//! Core modules:
//! - `sim`: Ship/controller possession, health and damage, weapons, tick loop
//! - `tuning`: Data-driven game balance
//! - `hud`: Presentation-side subscribers (hit markers, kill feed)
//! - `error`: Setup-time error types

pub mod error;
pub mod hud;
pub mod sim;
pub mod tuning;

pub use error::{SimError, SimResult};
pub use tuning::Tuning;

use glam::{Mat3, Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Local split-screen player cap
    pub const MAX_PLAYERS: usize = 4;

    /// Player ship colors (0xRRGGBBAA)
    pub const PLAYER_COLORS: [u32; 5] = [
        0xF2CD13FF, // Yellow
        0xFF6978FF, // Bright pink
        0xB1EDE8FF, // Light blue
        0x3E2F5BFF, // Violet
        0x26B6A6FF, // Duck blue
    ];

    pub const COLOR_WHITE: u32 = 0xFFFFFFFF;
}

/// Local forward axis (ships fly along +X)
pub const FORWARD: Vec3 = Vec3::X;
/// Local right axis
pub const RIGHT: Vec3 = Vec3::NEG_Y;
/// Local and world up axis
pub const UP: Vec3 = Vec3::Z;

/// Move `current` toward `target` by at most `step`
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Remap `value` from `[in_min, in_max]` to `[out_min, out_max]` (unclamped)
#[inline]
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Rotation whose forward axis points along `direction`, rolled so its up
/// axis leans toward `up`.
///
/// Falls back to another reference axis when `direction` and `up` are
/// parallel, and to identity for a zero direction.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let mut right = forward.cross(up);
    if right.length_squared() < 1e-6 {
        right = forward.cross(FORWARD);
        if right.length_squared() < 1e-6 {
            right = forward.cross(RIGHT);
        }
    }
    let right = right.normalize();
    let up = right.cross(forward);

    // Columns are where the local X (forward), Y (-right) and Z (up) land
    Quat::from_mat3(&Mat3::from_cols(forward, -right, up)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_clamps_at_target() {
        assert_eq!(approach(0.0, 1.0, 0.25), 0.25);
        assert_eq!(approach(0.9, 1.0, 0.25), 1.0);
        assert_eq!(approach(1.2, 0.0, 0.5), 0.7);
        assert_eq!(approach(0.1, 0.0, 0.5), 0.0);
    }

    #[test]
    fn test_look_rotation_identity_for_forward() {
        let rotation = look_rotation(FORWARD, UP);
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_look_rotation_points_forward_axis() {
        let direction = Vec3::new(1.0, 2.0, -0.5).normalize();
        let rotation = look_rotation(direction, UP);
        assert!((rotation * FORWARD).abs_diff_eq(direction, 1e-4));
        // Up axis stays on the world-up side
        assert!((rotation * UP).dot(UP) > 0.0);
    }

    #[test]
    fn test_look_rotation_degenerate_up() {
        let rotation = look_rotation(UP, UP);
        assert!((rotation * FORWARD).abs_diff_eq(UP, 1e-4));
        assert!(rotation.is_normalized());
    }

    #[test]
    fn test_remap_and_easing() {
        assert!((remap(0.75, 0.5, 1.0, 0.0, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }
}
