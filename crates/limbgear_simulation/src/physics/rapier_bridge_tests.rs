//! Tests for the rapier bridge (без RapierPhysicsPlugin: только ECS sync).

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;
    use bevy_rapier3d::prelude::*;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    use crate::armor::DetachArmorIntent;
    use crate::components::{limb_tags, spawn_humanoid, ArmorPiece, ArmorState};
    use crate::physics::{ContactEvent, PhysicalObject};
    use crate::{create_headless_app, ArmorSimulationPlugin};

    fn armor_app() -> App {
        let mut app = create_headless_app(42);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 64.0)))
            .add_plugins(ArmorSimulationPlugin::default());
        app.update();
        app
    }

    #[test]
    fn test_rapier_collision_drives_attach() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let upper = body.limb(limb_tags::UPPER_BODY).unwrap();
        let vest = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("UpperBody", 0.8, false))
            .id();

        app.world_mut()
            .send_event(CollisionEvent::Started(vest, upper, CollisionEventFlags::empty()));
        app.update();

        let piece = app.world().get::<ArmorPiece>(vest).unwrap();
        assert_eq!(piece.state(), ArmorState::Attached);
        let joint = app.world().get::<ImpulseJoint>(vest).unwrap();
        assert_eq!(joint.parent, upper);
    }

    #[test]
    fn test_detach_removes_impulse_joint() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let head = body.limb(limb_tags::HEAD).unwrap();
        let helmet = app
            .world_mut()
            .spawn(ArmorPiece::body_armor("Head", 0.5, false))
            .id();

        app.world_mut().send_event(ContactEvent::Started(helmet, head));
        app.update();
        assert!(app.world().get::<ImpulseJoint>(helmet).is_some());

        app.world_mut().send_event(DetachArmorIntent { armor: helmet });
        app.update();

        assert!(app.world().get::<ImpulseJoint>(helmet).is_none());
        assert_eq!(
            app.world().get::<ArmorPiece>(helmet).unwrap().state(),
            ArmorState::Detaching
        );
    }

    #[test]
    fn test_puncture_toggles_sensor() {
        let mut app = armor_app();
        let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
        let upper = body.limb(limb_tags::UPPER_BODY).unwrap();
        let shirt = app.world_mut().spawn(ArmorPiece::clothing("UpperBody", false)).id();
        let knife = app.world_mut().spawn(PhysicalObject::sharp()).id();

        app.world_mut().send_event(ContactEvent::Started(shirt, upper));
        app.update();
        assert!(app.world().get::<Sensor>(shirt).is_none());

        // Одежда: stab 0 → любой roll > 0 пробивает
        app.world_mut()
            .send_event(CollisionEvent::Started(knife, shirt, CollisionEventFlags::empty()));
        app.update();
        assert!(app.world().get::<Sensor>(shirt).is_some());

        app.world_mut()
            .send_event(CollisionEvent::Stopped(knife, shirt, CollisionEventFlags::empty()));
        app.update();
        assert!(app.world().get::<Sensor>(shirt).is_none());
    }

    #[test]
    fn test_physical_objects_get_contact_hooks() {
        let mut app = armor_app();
        let knife = app.world_mut().spawn(PhysicalObject::sharp()).id();

        app.update();

        let hooks = app.world().get::<ActiveHooks>(knife).unwrap();
        assert!(hooks.contains(ActiveHooks::FILTER_CONTACT_PAIRS));
        assert!(app.world().get::<ActiveEvents>(knife).is_some());
    }
}
