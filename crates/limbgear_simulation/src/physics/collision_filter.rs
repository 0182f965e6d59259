//! Physics substrate: коллайдеры, joints, sort order, pairwise ignore
//!
//! ECS — source of truth. Rapier (см. `rapier_bridge`) только читает
//! `IgnoredPairs` в hooks и синхронизирует `LimbJoint` → `ImpulseJoint`.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::config::DEFAULT_SORTING_LAYER;

/// Entity с собственным коллайдером
///
/// `sharp` — объект может пробить броню (ножи, шипы, стекло).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PhysicalObject {
    pub sharp: bool,
}

impl PhysicalObject {
    pub fn sharp() -> Self {
        Self { sharp: true }
    }
}

/// Rigid joint: armor ↔ limb body
///
/// Существует ⇔ броня в состоянии `Attached`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct LimbJoint {
    pub body: Entity,
}

/// Render sort layer + order
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct SortingOrder {
    pub layer: String,
    pub order: i32,
}

impl Default for SortingOrder {
    fn default() -> Self {
        Self {
            layer: DEFAULT_SORTING_LAYER.to_string(),
            order: 0,
        }
    }
}

impl SortingOrder {
    pub fn new(layer: impl Into<String>, order: i32) -> Self {
        Self {
            layer: layer.into(),
            order,
        }
    }

    /// Тот же layer, order сдвинут на `offset`
    pub fn offset_by(&self, offset: i32) -> Self {
        Self {
            layer: self.layer.clone(),
            order: self.order + offset,
        }
    }
}

/// Пары коллайдеров, между которыми контакты игнорируются (resource)
///
/// Пара неупорядоченная: `(a, b)` и `(b, a)` — одна запись.
#[derive(Resource, Debug, Default, Clone)]
pub struct IgnoredPairs {
    pairs: HashSet<(Entity, Entity)>,
}

fn normalize(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl IgnoredPairs {
    /// Включает/выключает игнор. Возвращает true, если состояние изменилось.
    pub fn set(&mut self, a: Entity, b: Entity, ignore: bool) -> bool {
        if a == b {
            return false;
        }
        let key = normalize(a, b);
        if ignore {
            self.pairs.insert(key)
        } else {
            self.pairs.remove(&key)
        }
    }

    pub fn is_ignored(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains(&normalize(a, b))
    }

    /// `subject` против всех `others`
    pub fn ignore_many(&mut self, subject: Entity, others: &[Entity], ignore: bool) {
        for &other in others {
            self.set(subject, other, ignore);
        }
    }

    /// Убирает все пары с участием `entity` (despawn cleanup)
    pub fn forget(&mut self, entity: Entity) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(a, b)| *a != entity && *b != entity);
        before - self.pairs.len()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
