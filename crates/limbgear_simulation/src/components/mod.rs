//! ECS Components для armor entity
//!
//! Организация:
//! - armor: ArmorPiece + ArmorState (state machine брони)
//! - limb: LimbSite, Wearers (exclusivity markers), humanoid spawn helper

pub mod armor;
pub mod limb;

// Re-exports для удобного импорта
pub use armor::*;
pub use limb::*;
