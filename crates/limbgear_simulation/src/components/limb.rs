//! Limb sites — части тела, на которые крепится броня
//!
//! Тело = root entity + limbs через `ChildOf`. Каждый limb — отдельный
//! коллайдер (`PhysicalObject`) с tag'ом и списком `Wearers`.

use bevy::prelude::*;

use crate::armor::AssetSource;
use crate::category::{CategoryId, CategoryRelation};
use crate::physics::{Grip, PhysicalObject, SortingOrder};

/// Стандартные tag'и limbs
pub mod limb_tags {
    // Human / android
    pub const HEAD: &str = "Head";
    pub const UPPER_BODY: &str = "UpperBody";
    pub const MIDDLE_BODY: &str = "MiddleBody";
    pub const LOWER_BODY: &str = "LowerBody";
    pub const UPPER_ARM_FRONT: &str = "UpperArmFront";
    pub const LOWER_ARM_FRONT: &str = "LowerArmFront";
    pub const UPPER_ARM_BACK: &str = "UpperArm";
    pub const LOWER_ARM_BACK: &str = "LowerArm";
    pub const UPPER_LEG_FRONT: &str = "UpperLegFront";
    pub const LOWER_LEG_FRONT: &str = "LowerLegFront";
    pub const FOOT_FRONT: &str = "FootFront";
    pub const UPPER_LEG_BACK: &str = "UpperLeg";
    pub const LOWER_LEG_BACK: &str = "LowerLeg";
    pub const FOOT_BACK: &str = "Foot";

    pub const HUMANOID: [&str; 14] = [
        HEAD,
        UPPER_BODY,
        MIDDLE_BODY,
        LOWER_BODY,
        UPPER_ARM_FRONT,
        LOWER_ARM_FRONT,
        UPPER_ARM_BACK,
        LOWER_ARM_BACK,
        UPPER_LEG_FRONT,
        LOWER_LEG_FRONT,
        FOOT_FRONT,
        UPPER_LEG_BACK,
        LOWER_LEG_BACK,
        FOOT_BACK,
    ];

    // Gorse (четвероногие)
    pub const GORSE_BODY: &str = "body";
    pub const GORSE_RIGHT_UPPER_LEG_FRONT: &str = "right upper leg";
    pub const GORSE_RIGHT_BOTTOM_LEG_FRONT: &str = "right bottom leg";
    pub const GORSE_LEFT_UPPER_LEG_FRONT: &str = "left upper leg";
    pub const GORSE_LEFT_BOTTOM_LEG_FRONT: &str = "left bottom leg";
    pub const GORSE_RIGHT_UPPER_LEG_BACK: &str = "right upper leg background";
    pub const GORSE_RIGHT_BOTTOM_LEG_BACK: &str = "right bottom leg background";
    pub const GORSE_LEFT_UPPER_LEG_BACK: &str = "left upper leg background";
    pub const GORSE_LEFT_BOTTOM_LEG_BACK: &str = "left bottom leg background";

    pub const GORSE: [&str; 9] = [
        GORSE_BODY,
        GORSE_RIGHT_UPPER_LEG_FRONT,
        GORSE_RIGHT_BOTTOM_LEG_FRONT,
        GORSE_LEFT_UPPER_LEG_FRONT,
        GORSE_LEFT_BOTTOM_LEG_FRONT,
        GORSE_RIGHT_UPPER_LEG_BACK,
        GORSE_RIGHT_BOTTOM_LEG_BACK,
        GORSE_LEFT_UPPER_LEG_BACK,
        GORSE_LEFT_BOTTOM_LEG_BACK,
    ];
}

/// Часть тела, на которую можно надеть броню
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Wearers, PhysicalObject, SortingOrder, Transform)]
pub struct LimbSite {
    pub tag: String,
}

impl LimbSite {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Запись "категория X занимает этот limb"
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct WearerMarker {
    pub category: CategoryId,
    pub armor: Entity,
    pub armor_name: String,
    pub source: AssetSource,
}

/// Exclusivity markers на limb
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Wearers {
    markers: Vec<WearerMarker>,
}

impl Wearers {
    /// Первый marker, совместимый с `category`
    pub fn find_compatible(
        &self,
        category: CategoryId,
        relation: &impl CategoryRelation,
    ) -> Option<&WearerMarker> {
        self.markers
            .iter()
            .find(|marker| relation.is_compatible(marker.category, category))
    }

    pub fn install(&mut self, marker: WearerMarker) {
        self.markers.push(marker);
    }

    pub fn remove_for(&mut self, armor: Entity) -> Option<WearerMarker> {
        let index = self.markers.iter().position(|m| m.armor == armor)?;
        Some(self.markers.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WearerMarker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Заспавненный humanoid
#[derive(Debug, Clone)]
pub struct Humanoid {
    pub root: Entity,
    /// В порядке `limb_tags::HUMANOID`
    pub limbs: Vec<Entity>,
}

impl Humanoid {
    pub fn limb(&self, tag: &str) -> Option<Entity> {
        limb_tags::HUMANOID
            .iter()
            .position(|t| *t == tag)
            .and_then(|index| self.limbs.get(index).copied())
    }
}

/// Спавнит humanoid: root + 14 limbs (плоско под root), grip на обеих кистях
pub fn spawn_humanoid(world: &mut World, position: Vec3) -> Humanoid {
    let root = world
        .spawn((Name::new("Humanoid"), Transform::from_translation(position)))
        .id();

    let limbs = limb_tags::HUMANOID
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            let mut limb = world.spawn((
                Name::new(*tag),
                LimbSite::new(*tag),
                SortingOrder::new("Bodies", index as i32),
                Transform::from_xyz(0.0, -(index as f32) * 0.25, 0.0),
                ChildOf(root),
            ));
            if *tag == limb_tags::LOWER_ARM_FRONT || *tag == limb_tags::LOWER_ARM_BACK {
                limb.insert(Grip::default());
            }
            limb.id()
        })
        .collect();

    Humanoid { root, limbs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRegistry;

    fn marker(world: &mut World, category: CategoryId) -> WearerMarker {
        WearerMarker {
            category,
            armor: world.spawn_empty().id(),
            armor_name: "Vest".into(),
            source: AssetSource::Catalog,
        }
    }

    #[test]
    fn test_find_compatible_uses_relation() {
        let mut world = World::new();
        let registry = CategoryRegistry::default();

        let mut wearers = Wearers::default();
        wearers.install(marker(&mut world, CategoryId::CLOTHING));

        assert!(wearers.find_compatible(CategoryId::CLOTHING, &registry).is_some());
        assert!(wearers.find_compatible(CategoryId::WEARER, &registry).is_some());
        assert!(wearers.find_compatible(CategoryId::BODY_ARMOR, &registry).is_none());
    }

    #[test]
    fn test_remove_for_armor() {
        let mut world = World::new();
        let first = marker(&mut world, CategoryId::CLOTHING);
        let second = marker(&mut world, CategoryId::BODY_ARMOR);
        let second_armor = second.armor;

        let mut wearers = Wearers::default();
        wearers.install(first);
        wearers.install(second);

        let removed = wearers.remove_for(second_armor).unwrap();
        assert_eq!(removed.category, CategoryId::BODY_ARMOR);
        assert_eq!(wearers.len(), 1);
        assert!(wearers.remove_for(second_armor).is_none());
    }

    #[test]
    fn test_spawn_humanoid_layout() {
        let mut world = World::new();
        let body = spawn_humanoid(&mut world, Vec3::ZERO);

        assert_eq!(body.limbs.len(), 14);
        let head = body.limb(limb_tags::HEAD).unwrap();
        assert_eq!(world.get::<LimbSite>(head).unwrap().tag, "Head");
        assert_eq!(world.get::<ChildOf>(head).unwrap().parent(), body.root);
        assert!(world.get::<Wearers>(head).is_some(), "required component");

        let hand = body.limb(limb_tags::LOWER_ARM_BACK).unwrap();
        assert!(world.get::<Grip>(hand).is_some());
        assert!(body.limb("Tail").is_none());
    }
}
