//! ArmorPiece — надеваемая экипировка
//!
//! State machine: `Unequipped → Attached → Detaching → Unequipped`.
//! Переходы делает только `ArmorRig` (pub(crate) методы ниже), остальной код
//! читает состояние через getters.
//!
//! Инвариант: `attached_site.is_some() ⇔ state ∈ {Attached, Detaching}`.

use bevy::prelude::*;

use crate::armor::{AssetSource, DetachTimer, SuppressionSet};
use crate::category::CategoryId;
use crate::physics::{PhysicalObject, SortingOrder};

/// Sorting offset брони относительно limb
pub const BODY_ARMOR_SORTING_OFFSET: i32 = 3;
pub const CLOTHING_SORTING_OFFSET: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ArmorState {
    #[default]
    Unequipped,
    Attached,
    Detaching,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(PhysicalObject, SortingOrder, SuppressionSet, DetachTimer, Transform)]
pub struct ArmorPiece {
    /// Tag limb site, к которому крепится броня ("Head", "UpperBody", ...)
    pub limb_tag: String,
    /// [0, 1]: вероятность НЕ пробиться при sharp контакте
    pub stab_resistance: f32,
    pub sorting_offset: i32,
    pub category: CategoryId,
    /// Контакт должен быть именно с `limb_tag`, а не с другой частью тела
    pub require_exact_limb_site: bool,
    /// Имя asset'а (для save/restore)
    pub asset_name: String,
    pub asset_source: AssetSource,

    state: ArmorState,
    attached_site: Option<Entity>,
    /// Коллайдеры тела, с которыми подавлена коллизия на время attach
    limb_colliders: Vec<Entity>,
    punctured: bool,
}

impl ArmorPiece {
    pub fn custom(
        category: CategoryId,
        limb_tag: impl Into<String>,
        stab_resistance: f32,
        sorting_offset: i32,
        require_exact_limb_site: bool,
    ) -> Self {
        Self {
            limb_tag: limb_tag.into(),
            stab_resistance: stab_resistance.clamp(0.0, 1.0),
            sorting_offset,
            category,
            require_exact_limb_site,
            asset_name: String::new(),
            asset_source: AssetSource::default(),
            state: ArmorState::Unequipped,
            attached_site: None,
            limb_colliders: Vec::new(),
            punctured: false,
        }
    }

    pub fn body_armor(limb_tag: impl Into<String>, stab_resistance: f32, require_exact: bool) -> Self {
        Self::custom(
            CategoryId::BODY_ARMOR,
            limb_tag,
            stab_resistance,
            BODY_ARMOR_SORTING_OFFSET,
            require_exact,
        )
    }

    /// Одежда не защищает от проколов (stab = 0)
    pub fn clothing(limb_tag: impl Into<String>, require_exact: bool) -> Self {
        Self::custom(
            CategoryId::CLOTHING,
            limb_tag,
            0.0,
            CLOTHING_SORTING_OFFSET,
            require_exact,
        )
    }

    pub fn with_asset(mut self, name: impl Into<String>, source: AssetSource) -> Self {
        self.asset_name = name.into();
        self.asset_source = source;
        self
    }

    pub fn state(&self) -> ArmorState {
        self.state
    }

    pub fn attached_site(&self) -> Option<Entity> {
        self.attached_site
    }

    /// Надета или ещё в grace period после detach
    pub fn is_equipped(&self) -> bool {
        self.state != ArmorState::Unequipped
    }

    pub fn is_attached(&self) -> bool {
        self.state == ArmorState::Attached
    }

    pub fn is_punctured(&self) -> bool {
        self.punctured
    }

    pub fn limb_colliders(&self) -> &[Entity] {
        &self.limb_colliders
    }

    pub fn invariant_holds(&self) -> bool {
        self.attached_site.is_some() == self.is_equipped()
    }

    // ========================================================================
    // Transitions (только ArmorRig)
    // ========================================================================

    pub(crate) fn bind(&mut self, site: Entity, limb_colliders: Vec<Entity>) {
        debug_assert_eq!(self.state, ArmorState::Unequipped);
        self.state = ArmorState::Attached;
        self.attached_site = Some(site);
        self.limb_colliders = limb_colliders;
    }

    /// Attached → Detaching. false если переход невозможен.
    pub(crate) fn begin_detach(&mut self) -> bool {
        if self.state != ArmorState::Attached {
            return false;
        }
        self.state = ArmorState::Detaching;
        true
    }

    /// Detaching → Unequipped, возвращает коллайдеры для восстановления коллизии
    pub(crate) fn finish_detach(&mut self) -> Vec<Entity> {
        debug_assert_eq!(self.state, ArmorState::Detaching);
        self.state = ArmorState::Unequipped;
        self.attached_site = None;
        std::mem::take(&mut self.limb_colliders)
    }

    /// true если флаг изменился
    pub(crate) fn set_punctured(&mut self, punctured: bool) -> bool {
        let changed = self.punctured != punctured;
        self.punctured = punctured;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let vest = ArmorPiece::body_armor("UpperBody", 0.8, false);
        assert_eq!(vest.category, CategoryId::BODY_ARMOR);
        assert_eq!(vest.sorting_offset, 3);

        let shirt = ArmorPiece::clothing("UpperBody", true);
        assert_eq!(shirt.category, CategoryId::CLOTHING);
        assert_eq!(shirt.stab_resistance, 0.0);
        assert_eq!(shirt.sorting_offset, 2);
        assert!(shirt.require_exact_limb_site);
    }

    #[test]
    fn test_stab_resistance_clamped() {
        assert_eq!(ArmorPiece::body_armor("Head", 1.7, false).stab_resistance, 1.0);
        assert_eq!(ArmorPiece::body_armor("Head", -0.2, false).stab_resistance, 0.0);
    }

    #[test]
    fn test_transition_cycle_keeps_invariant() {
        let mut world = World::new();
        let site = world.spawn_empty().id();
        let collider = world.spawn_empty().id();

        let mut piece = ArmorPiece::body_armor("Head", 0.5, false);
        assert!(piece.invariant_holds());
        assert!(!piece.begin_detach(), "Unequipped не может detach");

        piece.bind(site, vec![site, collider]);
        assert_eq!(piece.state(), ArmorState::Attached);
        assert_eq!(piece.attached_site(), Some(site));
        assert!(piece.invariant_holds());

        assert!(piece.begin_detach());
        assert_eq!(piece.state(), ArmorState::Detaching);
        assert!(piece.is_equipped());
        assert!(!piece.is_attached());
        assert!(piece.invariant_holds());

        let restored = piece.finish_detach();
        assert_eq!(restored, vec![site, collider]);
        assert_eq!(piece.state(), ArmorState::Unequipped);
        assert_eq!(piece.attached_site(), None);
        assert!(piece.limb_colliders().is_empty());
        assert!(piece.invariant_holds());
    }

    #[test]
    fn test_puncture_flag_reports_change() {
        let mut piece = ArmorPiece::body_armor("Head", 0.5, false);
        assert!(piece.set_punctured(true));
        assert!(!piece.set_punctured(true));
        assert!(piece.set_punctured(false));
        assert!(!piece.is_punctured());
    }
}
