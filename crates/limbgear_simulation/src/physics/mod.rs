//! Physics substrate
//!
//! Что armor подсистема потребляет от физики:
//! - коллайдеры (`PhysicalObject`, sharp flag)
//! - pairwise ignore (`IgnoredPairs`)
//! - rigid joints (`LimbJoint`)
//! - render sort order (`SortingOrder`)
//! - grip collaborator (`Grip`)
//! - contact events (`ContactEvent`)
//!
//! Rapier подключается через `rapier_bridge` (hooks + event forwarding).

pub mod collision_filter;
pub mod events;
pub mod grip;
pub mod rapier_bridge;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod rapier_bridge_tests;

// Re-export основных типов
pub use collision_filter::*;
pub use events::*;
pub use grip::*;
pub use rapier_bridge::{rapier_physics_plugin, ArmorContactFilter, PhysicsBridgePlugin};
