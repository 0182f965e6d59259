//! Armor ↔ armor collision suppression
//!
//! Контакт двух кусков брони регистрирует пару в обоих `SuppressionSet`,
//! решение принимается на следующем fixed шаге:
//!
//! `suppress = A.equipped ∨ B.equipped ∨ compatible(A, B) ∨ A.limb_tag == B.limb_tag`
//!
//! `IgnoredPairs` трогаем только когда фактическое состояние ≠ желаемому.

use bevy::prelude::*;

use crate::category::{CategoryRegistry, CategoryRelation};
use crate::components::ArmorPiece;
use crate::physics::IgnoredPairs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct SuppressionEntry {
    pub peer: Entity,
    /// Последнее принятое решение
    pub suppressed: bool,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct SuppressionSet {
    entries: Vec<SuppressionEntry>,
}

impl SuppressionSet {
    /// Добавляет peer (порядок регистрации сохраняется, без дублей)
    pub fn register(&mut self, peer: Entity) -> bool {
        if self.contains(peer) {
            return false;
        }
        self.entries.push(SuppressionEntry {
            peer,
            suppressed: false,
        });
        true
    }

    pub fn contains(&self, peer: Entity) -> bool {
        self.entries.iter().any(|entry| entry.peer == peer)
    }

    /// Mark-and-sweep: удаляет все записи с мёртвыми peer за один проход
    pub fn prune(&mut self, mut alive: impl FnMut(Entity) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| alive(entry.peer));
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[SuppressionEntry] {
        &self.entries
    }

    pub fn is_suppressed(&self, peer: Entity) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| entry.peer == peer)
            .map(|entry| entry.suppressed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Правило подавления коллизии между двумя кусками брони
pub fn should_suppress(a: &ArmorPiece, b: &ArmorPiece, relation: &impl CategoryRelation) -> bool {
    a.is_equipped()
        || b.is_equipped()
        || relation.is_compatible(a.category, b.category)
        || a.limb_tag == b.limb_tag
}

/// Per-step re-evaluation всех зарегистрированных пар
pub fn reevaluate_suppression(
    mut ignored: ResMut<IgnoredPairs>,
    categories: Res<CategoryRegistry>,
    mut sets: Query<(Entity, &mut SuppressionSet)>,
    armor: Query<&ArmorPiece>,
) {
    for (entity, mut set) in sets.iter_mut() {
        let Ok(piece) = armor.get(entity) else {
            continue;
        };

        let pruned = set.prune(|peer| armor.contains(peer));
        if pruned > 0 {
            crate::log(&format!(
                "Armor {:?}: pruned {} destroyed suppression peers",
                entity, pruned
            ));
        }

        for entry in set.entries.iter_mut() {
            let Ok(peer) = armor.get(entry.peer) else {
                continue;
            };

            let suppress = should_suppress(piece, peer, &*categories);
            entry.suppressed = suppress;
            if ignored.is_ignored(entity, entry.peer) != suppress {
                ignored.set(entity, entry.peer, suppress);
            }
        }
    }
}
