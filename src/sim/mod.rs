//! Space combat simulation
//!
//! Ships, controllers, weapons and effects all live in [`GameState`] and
//! advance only through [`tick`]. Randomness comes from the state's seeded
//! RNG and entities are visited in id order, so a seed and an input script
//! replay identically. Nothing here touches rendering or platform code.

pub mod camera;
pub mod collision;
pub mod controller;
pub mod event;
pub mod explosion;
pub mod health;
pub mod missile;
pub mod players;
mod possession;
pub mod projectile;
pub mod registry;
pub mod scheduler;
pub mod ship;
pub mod state;
pub mod tick;
pub mod transform;

pub use camera::CameraRig;
pub use collision::{Collider, Physics, Ray, RayHit, RayParams, SpherePhysics};
pub use controller::{
    ActionState, AiBrain, ControlInputs, Controller, ControllerKind, PlayerBrain, PossessionChange,
    WeaponCommand,
};
pub use event::{Event, ListenerId};
pub use explosion::Explosion;
pub use health::{DamageInfo, DamageResult, HealthComponent};
pub use missile::{GuidedMissile, MissileStep, TargetView};
pub use players::PlayerManager;
pub use projectile::{Projectile, ProjectileStep};
pub use registry::{ControllerId, EntityId, ShipId, ShipRegistry};
pub use scheduler::{DeferredAction, ScheduledTask, Scheduler};
pub use ship::{Ship, ShipState};
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use transform::Transform;
