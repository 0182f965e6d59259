//! ArmorRig — единственный мутатор armor state machine
//!
//! SystemParam, который собирает всё, что нужно attach/detach:
//! limbs + markers, hierarchy, коллайдеры тела, grips, `IgnoredPairs`, events.
//! Системы (contacts, detach, timers, restore) и cleanup observers
//! вызывают методы rig'а, а не мутируют компоненты напрямую.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::armor::{
    ArmorAttached, ArmorDetachCompleted, ArmorDetached, AttachRejected, DetachTimer, RejectReason,
    SuppressionSet,
};
use crate::category::{CategoryId, CategoryRegistry};
use crate::components::{ArmorPiece, LimbSite, WearerMarker, Wearers};
use crate::config::ArmorConfig;
use crate::error::{self, ArmorError};
use crate::physics::{Grip, IgnoredPairs, LimbJoint, PhysicalObject, SortingOrder};

#[derive(SystemParam)]
pub struct ArmorRig<'w, 's> {
    commands: Commands<'w, 's>,
    ignored: ResMut<'w, IgnoredPairs>,
    categories: Res<'w, CategoryRegistry>,
    config: Res<'w, ArmorConfig>,
    limbs: Query<
        'w,
        's,
        (
            Entity,
            &'static LimbSite,
            &'static mut Wearers,
            Option<&'static SortingOrder>,
        ),
    >,
    parents: Query<'w, 's, &'static ChildOf>,
    /// Коллайдеры тел (броня исключена, её пары ведёт SuppressionSet)
    body_parts: Query<'w, 's, Entity, (With<PhysicalObject>, Without<ArmorPiece>)>,
    grips: Query<'w, 's, (Entity, &'static mut Grip)>,
    suppression: Query<'w, 's, &'static mut SuppressionSet>,
    attached: EventWriter<'w, ArmorAttached>,
    detached: EventWriter<'w, ArmorDetached>,
    completed: EventWriter<'w, ArmorDetachCompleted>,
    rejected: EventWriter<'w, AttachRejected>,
}

impl ArmorRig<'_, '_> {
    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn is_limb(&self, entity: Entity) -> bool {
        self.limbs.contains(entity)
    }

    /// Самый верхний предок (root articulated body)
    pub fn body_root(&self, entity: Entity) -> Entity {
        let mut current = entity;
        while let Ok(child_of) = self.parents.get(current) {
            current = child_of.parent();
        }
        current
    }

    /// Limb с tag'ом под тем же root. Несколько кандидатов → наименьший Entity.
    pub fn resolve_site(&self, root: Entity, tag: &str) -> Option<Entity> {
        self.limbs
            .iter()
            .filter(|(entity, site, _, _)| site.tag == tag && self.body_root(*entity) == root)
            .map(|(entity, ..)| entity)
            .min()
    }

    /// Все коллайдеры тела (sorted), кроме брони
    pub fn body_colliders(&self, root: Entity) -> Vec<Entity> {
        let mut colliders: Vec<Entity> = self
            .body_parts
            .iter()
            .filter(|entity| self.body_root(*entity) == root)
            .collect();
        colliders.sort();
        colliders
    }

    /// Броня, уже надетая на тело (по markers всех limbs под root)
    pub fn worn_armor(&self, root: Entity) -> Vec<Entity> {
        let mut worn: Vec<Entity> = self
            .limbs
            .iter()
            .filter(|(entity, ..)| self.body_root(*entity) == root)
            .flat_map(|(_, _, wearers, _)| wearers.iter().map(|marker| marker.armor))
            .collect();
        worn.sort();
        worn.dedup();
        worn
    }

    /// Регистрирует пару броня ↔ броня в обоих `SuppressionSet`
    pub fn register_armor_pair(&mut self, a: Entity, b: Entity) {
        if let Ok(mut set) = self.suppression.get_mut(a) {
            set.register(b);
        }
        if let Ok(mut set) = self.suppression.get_mut(b) {
            set.register(a);
        }
    }

    /// Совместимый marker на limb (exclusivity)
    pub fn occupant(&self, site: Entity, category: CategoryId) -> Option<Entity> {
        let (_, _, wearers, _) = self.limbs.get(site).ok()?;
        wearers
            .find_compatible(category, &*self.categories)
            .map(|marker| marker.armor)
    }

    /// Контакт Unequipped брони с limb: resolve → exclusivity → exactness → attach
    ///
    /// Отказ — не ошибка: пишется `AttachRejected`, состояние не меняется.
    pub fn try_attach(&mut self, armor: Entity, piece: &mut ArmorPiece, touched: Entity) -> bool {
        let root = self.body_root(touched);

        let Some(site) = self.resolve_site(root, &piece.limb_tag) else {
            crate::log(&format!(
                "Armor {:?}: body {:?} has no '{}' limb, skip",
                armor, root, piece.limb_tag
            ));
            self.reject(armor, touched, RejectReason::MissingSite);
            return false;
        };

        if let Some(by) = self.occupant(site, piece.category) {
            crate::log(&format!(
                "Armor {:?}: '{}' {:?} already occupied by {:?}",
                armor, piece.limb_tag, site, by
            ));
            self.reject(armor, touched, RejectReason::Occupied { by });
            return false;
        }

        if piece.require_exact_limb_site {
            let touched_tag = self.limbs.get(touched).ok().map(|(_, limb, ..)| limb.tag.as_str());
            if touched_tag != Some(piece.limb_tag.as_str()) {
                self.reject(armor, touched, RejectReason::InexactContact { touched });
                return false;
            }
        }

        self.attach(armor, piece, site);
        true
    }

    /// Attach (без проверок). Порядок side effects важен.
    pub fn attach(&mut self, armor: Entity, piece: &mut ArmorPiece, site: Entity) {
        let root = self.body_root(site);
        let colliders = self.body_colliders(root);
        let worn: Vec<Entity> = self
            .worn_armor(root)
            .into_iter()
            .filter(|peer| *peer != armor)
            .collect();

        // 1. bind
        piece.bind(site, colliders.clone());

        // 2. align + reparent
        self.commands
            .entity(armor)
            .insert((Transform::IDENTITY, ChildOf(site)));

        // 3. коллизия со всем телом, включая уже надетую броню
        self.ignored.ignore_many(armor, &colliders, true);
        for peer in &worn {
            self.ignored.set(armor, *peer, true);
            self.register_armor_pair(armor, *peer);
        }

        // 4. joint
        self.commands.entity(armor).insert(LimbJoint { body: site });

        // 5. exclusivity marker + 6. sort order
        let mut tag = String::new();
        if let Ok((_, limb, mut wearers, sorting)) = self.limbs.get_mut(site) {
            tag = limb.tag.clone();
            wearers.install(WearerMarker {
                category: piece.category,
                armor,
                armor_name: piece.asset_name.clone(),
                source: piece.asset_source,
            });
            let sorting = sorting.cloned().unwrap_or_default();
            self.commands
                .entity(armor)
                .insert(sorting.offset_by(piece.sorting_offset));
        }

        // 7. grips того же тела не должны хватать надетую броню
        for (grip_entity, mut grip) in self.grips.iter_mut() {
            if body_root_of(&self.parents, grip_entity) != root {
                continue;
            }
            grip.refresh_no_collide(grip_entity, &mut self.ignored, false);
            grip.add(armor);
            grip.refresh_no_collide(grip_entity, &mut self.ignored, true);
        }

        crate::log_info(&format!(
            "✅ Armor {:?} ('{}') attached to {} {:?} ({} colliders, {} worn pieces suppressed)",
            armor,
            piece.asset_name,
            tag,
            site,
            colliders.len(),
            worn.len()
        ));
        self.attached.write(ArmorAttached {
            armor,
            site,
            category: piece.category,
        });
    }

    /// Detach: только из `Attached`, иначе usage error
    pub fn detach(
        &mut self,
        armor: Entity,
        piece: &mut ArmorPiece,
        timer: &mut DetachTimer,
        world_transform: Option<&GlobalTransform>,
    ) -> error::Result<()> {
        let site = match (piece.is_attached(), piece.attached_site()) {
            (true, Some(site)) => site,
            _ => {
                return Err(ArmorError::NotAttached {
                    armor,
                    state: piece.state(),
                })
            }
        };

        // 1. joint + sort order
        let mut entity = self.commands.entity(armor);
        entity.remove::<(LimbJoint, ChildOf)>();
        entity.insert(SortingOrder::new(self.config.default_sorting_layer.clone(), 0));
        // 3. снова свободное тело: позиция в мире сохраняется
        if let Some(global) = world_transform {
            entity.insert(global.compute_transform());
        }

        // 2. marker
        if let Ok((_, _, mut wearers, _)) = self.limbs.get_mut(site) {
            wearers.remove_for(armor);
        }

        for (_, mut grip) in self.grips.iter_mut() {
            grip.forget(armor);
        }

        // 4. Detaching + timer. Коллизия с телом остаётся подавленной (5)
        piece.begin_detach();
        timer.arm();

        crate::log_info(&format!(
            "🔓 Armor {:?} detached from {:?}, grace {:.1}s",
            armor, site, self.config.detach_grace_secs
        ));
        self.detached.write(ArmorDetached { armor, site });
        Ok(())
    }

    /// Конец grace period: восстановить коллизию, `Unequipped`
    pub fn finish_detach(&mut self, armor: Entity, piece: &mut ArmorPiece) {
        let Some(former_site) = piece.attached_site() else {
            return;
        };
        let colliders = piece.finish_detach();
        self.ignored.ignore_many(armor, &colliders, false);

        // Limb мог быть уничтожен за время grace period
        if self.limbs.contains(former_site) {
            let root = self.body_root(former_site);
            for (grip_entity, grip) in self.grips.iter() {
                if body_root_of(&self.parents, grip_entity) != root {
                    continue;
                }
                grip.refresh_no_collide(grip_entity, &mut self.ignored, false);
                grip.refresh_no_collide(grip_entity, &mut self.ignored, true);
            }
        }

        crate::log_info(&format!(
            "🛡️ Armor {:?} collision with former limb {:?} restored ({} colliders)",
            armor,
            former_site,
            colliders.len()
        ));
        self.completed.write(ArmorDetachCompleted { armor, former_site });
    }

    /// Броня уничтожена: мгновенный release без timer
    pub fn release(&mut self, armor: Entity, piece: &ArmorPiece) {
        if !piece.is_equipped() {
            return;
        }

        self.ignored.ignore_many(armor, piece.limb_colliders(), false);
        if let Some(site) = piece.attached_site() {
            if let Ok((_, _, mut wearers, _)) = self.limbs.get_mut(site) {
                wearers.remove_for(armor);
            }
        }
        for (_, mut grip) in self.grips.iter_mut() {
            grip.forget(armor);
        }

        crate::log(&format!(
            "🗑️ Armor {:?} destroyed while {:?}, markers released",
            armor,
            piece.state()
        ));
    }

    /// Restore hook: spawn брони из template и attach к limb
    pub fn spawn_attached(&mut self, template: &ArmorPiece, site: Entity) -> Entity {
        let armor = self.commands.spawn_empty().id();
        let mut piece = template.clone();
        self.attach(armor, &mut piece, site);
        self.commands.entity(armor).insert(piece);
        armor
    }

    fn reject(&mut self, armor: Entity, touched: Entity, reason: RejectReason) {
        self.rejected.write(AttachRejected {
            armor,
            touched,
            reason,
        });
    }
}

/// Root без заимствования всего rig (для циклов по `grips`)
fn body_root_of(parents: &Query<&ChildOf>, entity: Entity) -> Entity {
    let mut current = entity;
    while let Ok(child_of) = parents.get(current) {
        current = child_of.parent();
    }
    current
}
