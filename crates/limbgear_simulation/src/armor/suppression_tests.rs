//! Tests for armor ↔ armor collision suppression.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;

    use super::super::suppression::{should_suppress, SuppressionSet};
    use crate::category::{CategoryId, CategoryRegistry};
    use crate::components::{limb_tags, spawn_humanoid, ArmorPiece};
    use crate::physics::{ContactEvent, IgnoredPairs};
    use crate::{create_headless_app, ArmorSimulationPlugin};

    fn armor_app() -> App {
        let mut app = create_headless_app(42);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 64.0)))
            .add_plugins(ArmorSimulationPlugin::default());
        app.update();
        app
    }

    fn touch(app: &mut App, a: Entity, b: Entity) {
        app.world_mut().send_event(ContactEvent::Started(a, b));
        app.update();
    }

    fn ignored(app: &App, a: Entity, b: Entity) -> bool {
        app.world().resource::<IgnoredPairs>().is_ignored(a, b)
    }

    #[test]
    fn test_rule_loose_unrelated_pieces_collide() {
        let registry = CategoryRegistry::default();
        let helmet = ArmorPiece::body_armor("Head", 0.5, false);
        let boot = ArmorPiece::clothing("FootFront", false);

        assert!(!should_suppress(&helmet, &boot, &registry));
        assert!(!should_suppress(&boot, &helmet, &registry));
    }

    #[test]
    fn test_rule_same_tag_or_compatible_suppresses() {
        let registry = CategoryRegistry::default();
        let helmet = ArmorPiece::body_armor("Head", 0.5, false);
        let hood = ArmorPiece::clothing("Head", false);
        let greave = ArmorPiece::body_armor("LowerLegFront", 0.5, false);

        assert!(should_suppress(&helmet, &hood, &registry), "same limb tag");
        assert!(should_suppress(&helmet, &greave, &registry), "same category");
    }

    #[test]
    fn test_rule_equipped_piece_suppresses() {
        let mut world = World::new();
        let site = world.spawn_empty().id();
        let registry = CategoryRegistry::default();

        let mut helmet = ArmorPiece::body_armor("Head", 0.5, false);
        let boot = ArmorPiece::clothing("FootFront", false);
        helmet.bind(site, Vec::new());

        assert!(should_suppress(&helmet, &boot, &registry));
        helmet.begin_detach();
        assert!(should_suppress(&boot, &helmet, &registry), "Detaching тоже считается");
    }

    #[test]
    fn test_prune_removes_all_dead_peers_in_one_pass() {
        let mut world = World::new();
        let peers: Vec<Entity> = (0..5).map(|_| world.spawn_empty().id()).collect();

        let mut set = SuppressionSet::default();
        for peer in &peers {
            set.register(*peer);
        }
        assert!(!set.register(peers[0]));

        let dead = [peers[1], peers[2], peers[4]];
        let pruned = set.prune(|peer| !dead.contains(&peer));

        assert_eq!(pruned, 3);
        let remaining: Vec<Entity> = set.entries().iter().map(|e| e.peer).collect();
        assert_eq!(remaining, vec![peers[0], peers[3]]);
    }

    #[test]
    fn test_unrelated_loose_pair_keeps_colliding() {
        let mut app = armor_app();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let boot = app.world_mut().spawn(ArmorPiece::clothing("FootFront", false)).id();

        touch(&mut app, helmet, boot);

        assert!(!ignored(&app, helmet, boot));
        let set = app.world().get::<SuppressionSet>(helmet).unwrap();
        assert_eq!(set.is_suppressed(boot), Some(false));
    }

    #[test]
    fn test_pair_suppressed_once_piece_is_worn() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let head = body.limb(limb_tags::HEAD).unwrap();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let boot = app.world_mut().spawn(ArmorPiece::clothing("FootFront", false)).id();

        touch(&mut app, helmet, boot);
        assert!(!ignored(&app, helmet, boot));

        touch(&mut app, helmet, head);
        assert!(ignored(&app, helmet, boot));
        assert_eq!(
            app.world().get::<SuppressionSet>(boot).unwrap().is_suppressed(helmet),
            Some(true)
        );
    }

    #[test]
    fn test_attach_suppresses_armor_already_worn_on_body() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let head = body.limb(limb_tags::HEAD).unwrap();
        let upper = body.limb(limb_tags::UPPER_BODY).unwrap();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let cape = app.world_mut().spawn(ArmorPiece::clothing("UpperBody", false)).id();

        touch(&mut app, helmet, head);
        touch(&mut app, cape, upper);

        // Тот же шаг, без armor ↔ armor контакта
        assert!(ignored(&app, cape, helmet));
        assert!(app.world().get::<SuppressionSet>(cape).unwrap().contains(helmet));
        assert!(app.world().get::<SuppressionSet>(helmet).unwrap().contains(cape));

        // Следующий шаг: re-evaluation оставляет пару подавленной
        app.update();
        assert!(ignored(&app, cape, helmet));
    }

    #[test]
    fn test_pieces_attached_on_same_step_ignore_each_other() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let head = body.limb(limb_tags::HEAD).unwrap();
        let upper = body.limb(limb_tags::UPPER_BODY).unwrap();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let cape = app.world_mut().spawn(ArmorPiece::clothing("UpperBody", false)).id();

        app.world_mut().send_event(ContactEvent::Started(helmet, head));
        app.world_mut().send_event(ContactEvent::Started(cape, upper));
        app.update();

        assert!(ignored(&app, cape, helmet));
    }

    #[test]
    fn test_armor_on_other_body_not_suppressed_by_attach() {
        let mut app = armor_app();
        let wearer = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let other = spawn_humanoid(app.world_mut(), Vec3::X * 5.0);
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let cape = app.world_mut().spawn(ArmorPiece::clothing("UpperBody", false)).id();

        touch(&mut app, helmet, other.limb(limb_tags::HEAD).unwrap());
        touch(&mut app, cape, wearer.limb(limb_tags::UPPER_BODY).unwrap());

        assert!(!ignored(&app, cape, helmet));
        assert!(!app.world().get::<SuppressionSet>(cape).unwrap().contains(helmet));
    }

    #[test]
    fn test_compatible_loose_pair_suppressed_next_step() {
        let mut app = armor_app();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let greave = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("LowerLegFront", 0.5, false))
            .id();

        touch(&mut app, greave, helmet);

        assert!(ignored(&app, helmet, greave));
    }

    #[test]
    fn test_mod_category_pair_uses_registry() {
        let mut app = armor_app();
        let cape = app
            .world_mut()
            .resource_mut::<CategoryRegistry>()
            .register("Cape", CategoryId::CLOTHING)
            .unwrap();
        let cape_piece = app
            .world_mut()
            .spawn(ArmorPiece::custom(cape, "UpperBody", 0.0, 1, false))
            .id();
        let scarf = app.world_mut().spawn(ArmorPiece::clothing("Head", false)).id();

        touch(&mut app, cape_piece, scarf);

        // Cape ⊂ Clothing → совместимы
        assert!(ignored(&app, cape_piece, scarf));
    }

    #[test]
    fn test_destroyed_peer_pruned_and_pair_forgotten() {
        let mut app = armor_app();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();
        let hood = app.world_mut().spawn(ArmorPiece::clothing("Head", false)).id();

        touch(&mut app, helmet, hood);
        assert!(ignored(&app, helmet, hood));

        app.world_mut().despawn(hood);
        app.update();

        assert!(app.world().get::<SuppressionSet>(helmet).unwrap().is_empty());
        assert!(app.world().resource::<IgnoredPairs>().is_empty());
    }
}
