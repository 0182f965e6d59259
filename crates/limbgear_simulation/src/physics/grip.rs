//! Grip collaborator (руки, которые могут держать предметы)
//!
//! Надетая броня не должна "хвататься" как свободный предмет, поэтому её
//! коллайдер добавляется в `colliders_to_ignore` grip'ов того же тела.

use bevy::prelude::*;

use super::IgnoredPairs;

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Grip {
    pub colliders_to_ignore: Vec<Entity>,
}

impl Grip {
    /// Добавляет коллайдер (без дублей)
    pub fn add(&mut self, collider: Entity) {
        if !self.colliders_to_ignore.contains(&collider) {
            self.colliders_to_ignore.push(collider);
        }
    }

    /// Убирает коллайдер. true если он был в списке.
    pub fn forget(&mut self, collider: Entity) -> bool {
        let before = self.colliders_to_ignore.len();
        self.colliders_to_ignore.retain(|c| *c != collider);
        before != self.colliders_to_ignore.len()
    }

    /// Применяет no-collide между grip entity и списком
    ///
    /// `enabled = false` снимает игнор со всех текущих записей.
    pub fn refresh_no_collide(&self, grip: Entity, ignored: &mut IgnoredPairs, enabled: bool) {
        ignored.ignore_many(grip, &self.colliders_to_ignore, enabled);
    }
}
