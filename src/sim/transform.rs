//! Location/rotation/scale with ship-local axes

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{FORWARD, RIGHT, UP};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * RIGHT
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * UP
    }

    /// Reset to origin with identity rotation (scale is kept)
    pub fn reset(&mut self) {
        self.location = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
    }
}
