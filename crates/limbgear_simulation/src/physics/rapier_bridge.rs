//! Rapier bridge: ECS armor state ↔ bevy_rapier3d
//!
//! Направление данных:
//! - Rapier → ECS: `CollisionEvent` → `ContactEvent`
//! - ECS → Rapier: `LimbJoint` → `ImpulseJoint`, puncture → `Sensor`
//! - `IgnoredPairs` читается в physics hooks (contact + intersection filter)
//!
//! Rapier работает в fixed schedule (`in_fixed_schedule`), поэтому события
//! шага N доходят до armor систем на шаге N+1.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::SolverFlags;

use super::{ContactEvent, IgnoredPairs, LimbJoint, PhysicalObject};
use crate::armor::ArmorSet;
use crate::components::ArmorPiece;

/// Physics hooks: отбрасывает пары из `IgnoredPairs`
#[derive(SystemParam)]
pub struct ArmorContactFilter<'w> {
    ignored: Res<'w, IgnoredPairs>,
}

impl BevyPhysicsHooks for ArmorContactFilter<'_> {
    fn filter_contact_pair(&self, context: PairFilterContextView) -> Option<SolverFlags> {
        if self.ignored.is_ignored(context.collider1(), context.collider2()) {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }

    fn filter_intersection_pair(&self, context: PairFilterContextView) -> bool {
        !self.ignored.is_ignored(context.collider1(), context.collider2())
    }
}

/// Rapier plugin с armor contact filter (fixed schedule)
pub fn rapier_physics_plugin() -> RapierPhysicsPlugin<ArmorContactFilter<'static>> {
    RapierPhysicsPlugin::<ArmorContactFilter<'static>>::default().in_fixed_schedule()
}

/// Коллайдеры участвуют в hooks и шлют collision events
pub fn enable_contact_hooks(
    mut commands: Commands,
    objects: Query<Entity, Added<PhysicalObject>>,
) {
    for entity in objects.iter() {
        commands.entity(entity).try_insert((
            ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR,
            ActiveEvents::COLLISION_EVENTS,
        ));
    }
}

/// Rapier `CollisionEvent` → `ContactEvent`
pub fn forward_rapier_collisions(
    mut collisions: EventReader<CollisionEvent>,
    mut contacts: EventWriter<ContactEvent>,
) {
    for event in collisions.read() {
        let contact = match event {
            CollisionEvent::Started(a, b, _) => ContactEvent::Started(*a, *b),
            CollisionEvent::Stopped(a, b, _) => ContactEvent::Stopped(*a, *b),
        };
        contacts.write(contact);
    }
}

/// `LimbJoint` → `ImpulseJoint` (FixedJoint к телу limb)
pub fn sync_limb_joints(
    mut commands: Commands,
    mut removed: RemovedComponents<LimbJoint>,
    added: Query<(Entity, &LimbJoint), Changed<LimbJoint>>,
    impulse_joints: Query<(), With<ImpulseJoint>>,
) {
    // Сначала remove: detach + re-attach на одном шаге даёт remove → insert
    for entity in removed.read() {
        if impulse_joints.contains(entity) {
            commands.entity(entity).remove::<ImpulseJoint>();
        }
    }

    for (entity, joint) in added.iter() {
        commands
            .entity(entity)
            .try_insert(ImpulseJoint::new(joint.body, FixedJointBuilder::new()));
    }
}

/// Пробитая броня → `Sensor` (коллайдер перестаёт блокировать)
pub fn sync_puncture_sensors(
    mut commands: Commands,
    armor: Query<(Entity, &ArmorPiece, Has<Sensor>), Changed<ArmorPiece>>,
) {
    for (entity, piece, is_sensor) in armor.iter() {
        match (piece.is_punctured(), is_sensor) {
            (true, false) => {
                commands.entity(entity).try_insert(Sensor);
            }
            (false, true) => {
                commands.entity(entity).remove::<Sensor>();
            }
            _ => {}
        }
    }
}

/// Bridge systems (без самого RapierPhysicsPlugin — его добавляет host)
pub struct PhysicsBridgePlugin;

impl Plugin for PhysicsBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CollisionEvent>()
            .add_systems(
                FixedUpdate,
                (enable_contact_hooks, forward_rapier_collisions)
                    .chain()
                    .before(ArmorSet::Restore),
            )
            .add_systems(
                FixedUpdate,
                (sync_limb_joints, sync_puncture_sensors).after(ArmorSet::Intents),
            );
    }
}
