//! Armor module — attachment state machine + collision filtering
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Physics шлёт `ContactEvent` (Started/Stopped)
//! - Host шлёт `DetachArmorIntent`
//! - Системы мутируют броню только через `ArmorRig`
//! - Наружу уходят notification events (`ArmorAttached`, `ArmorPunctured`, ...)
//!
//! **FixedUpdate порядок (один шаг):**
//! 1. `ArmorSet::Restore` — deserialization hook
//! 2. `ArmorSet::Contacts` — collision callbacks шага
//! 3. `ArmorSet::Suppression` — armor ↔ armor re-evaluation
//! 4. `ArmorSet::Timers` — detach grace timers
//! 5. `ArmorSet::Intents` — user detach (timer стартует со следующего шага)
//!
//! **Destroy:** observers на `OnRemove` (`ArmorPiece`, `PhysicalObject`)
//! чистят markers, grips и `IgnoredPairs` без timer.

use bevy::prelude::*;

pub mod contacts;
pub mod detach;
pub mod events;
pub mod restore;
pub mod rig;
pub mod suppression;

#[cfg(test)]
mod suppression_tests;

// Re-exports
pub use contacts::*;
pub use detach::*;
pub use events::*;
pub use restore::*;
pub use rig::*;
pub use suppression::*;

use crate::category::CategoryRegistry;
use crate::components::ArmorPiece;
use crate::config::ArmorConfig;
use crate::physics::{ContactEvent, Grip, IgnoredPairs, PhysicalObject};
use crate::DeterministicRng;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmorSet {
    Restore,
    Contacts,
    Suppression,
    Timers,
    Intents,
}

/// Armor plugin (state machine + collision filtering)
pub struct ArmorPlugin;

impl Plugin for ArmorPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources (не перетираем уже вставленные host'ом)
            .init_resource::<ArmorConfig>()
            .init_resource::<CategoryRegistry>()
            .init_resource::<IgnoredPairs>()
            .init_resource::<ArmorCatalog>()
            .init_resource::<DeterministicRng>()
            // Events
            .add_event::<ContactEvent>()
            .add_event::<DetachArmorIntent>()
            .add_event::<ArmorAttached>()
            .add_event::<ArmorDetached>()
            .add_event::<ArmorDetachCompleted>()
            .add_event::<ArmorPunctured>()
            .add_event::<AttachRejected>()
            .add_event::<ArmorUsageError>()
            // Destroy cleanup
            .add_observer(release_destroyed_armor)
            .add_observer(forget_destroyed_collider)
            // Systems (FixedUpdate, строгий порядок)
            .configure_sets(
                FixedUpdate,
                (
                    ArmorSet::Restore,
                    ArmorSet::Contacts,
                    ArmorSet::Suppression,
                    ArmorSet::Timers,
                    ArmorSet::Intents,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    resolve_restored_wearers.in_set(ArmorSet::Restore),
                    process_armor_contacts.in_set(ArmorSet::Contacts),
                    reevaluate_suppression.in_set(ArmorSet::Suppression),
                    advance_detach_timers.in_set(ArmorSet::Timers),
                    process_detach_intents.in_set(ArmorSet::Intents),
                )
                    .chain(),
            );
    }
}

/// Броня уничтожена (despawn): release как мгновенный detach
fn release_destroyed_armor(
    trigger: Trigger<OnRemove, ArmorPiece>,
    armor: Query<&ArmorPiece>,
    mut rig: ArmorRig,
) {
    let entity = trigger.target();
    let Ok(piece) = armor.get(entity) else {
        return;
    };
    rig.release(entity, piece);
}

/// Коллайдер уничтожен: убрать его из ignore пар и grip списков
fn forget_destroyed_collider(
    trigger: Trigger<OnRemove, PhysicalObject>,
    mut ignored: ResMut<IgnoredPairs>,
    mut grips: Query<&mut Grip>,
) {
    let entity = trigger.target();
    ignored.forget(entity);
    for mut grip in grips.iter_mut() {
        grip.forget(entity);
    }
}
