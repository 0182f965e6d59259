//! Headless симуляция LIMBGEAR
//!
//! Humanoid + шлем + бронежилет: attach, прокол ножом, detach и grace period.
//! Контакты подаются напрямую (без Rapier), fixed clock 64Hz.
//! Первый аргумент (опционально) — путь к TOML config.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use limbgear_simulation::{
    create_headless_app, limb_tags, log_error, log_info, spawn_humanoid, ArmorConfig, ArmorPiece,
    ArmorSimulationPlugin, ContactEvent, DetachArmorIntent, IgnoredPairs, PhysicalObject,
};

fn load_config() -> ArmorConfig {
    let Some(path) = std::env::args().nth(1) else {
        return ArmorConfig::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| ArmorConfig::from_toml_str(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => config,
        Err(error) => {
            log_error(&format!("❌ Config {}: {}, using defaults", path, error));
            ArmorConfig::default()
        }
    }
}

fn step(app: &mut App, steps: usize) {
    for _ in 0..steps {
        app.update();
    }
}

fn main() {
    let config = load_config();
    let seed = config.rng_seed;
    println!("Starting LIMBGEAR headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / config.fixed_hz,
    )))
    .add_plugins(ArmorSimulationPlugin::with_config(config.clone()));
    app.update();

    let body = spawn_humanoid(app.world_mut(), Vec3::ZERO);
    let (Some(head), Some(upper)) = (
        body.limb(limb_tags::HEAD),
        body.limb(limb_tags::UPPER_BODY),
    ) else {
        log_error("❌ Humanoid spawned without Head/UpperBody");
        return;
    };

    let helmet = app
        .world_mut()
        .spawn((Name::new("Helmet"), ArmorPiece::body_armor("Head", 0.9, true)))
        .id();
    let vest = app
        .world_mut()
        .spawn((Name::new("Vest"), ArmorPiece::body_armor("UpperBody", 0.3, false)))
        .id();
    let knife = app
        .world_mut()
        .spawn((Name::new("Knife"), PhysicalObject::sharp()))
        .id();

    // Attach
    app.world_mut().send_event(ContactEvent::Started(helmet, head));
    app.world_mut().send_event(ContactEvent::Started(vest, upper));
    step(&mut app, 1);

    // Нож по жилету, пока контакт не закончится
    for attempt in 0..5 {
        app.world_mut().send_event(ContactEvent::Started(knife, vest));
        step(&mut app, 1);
        let punctured = app
            .world()
            .get::<ArmorPiece>(vest)
            .is_some_and(|piece| piece.is_punctured());
        log_info(&format!("Knife attempt {}: vest punctured = {}", attempt, punctured));
        app.world_mut().send_event(ContactEvent::Stopped(knife, vest));
        step(&mut app, 1);
    }

    // Detach шлема и grace period
    app.world_mut().send_event(DetachArmorIntent { armor: helmet });
    let grace_steps = (config.detach_grace_secs as f64 * config.fixed_hz).ceil() as usize;
    for tick in 0..=grace_steps {
        step(&mut app, 1);
        if tick % 64 == 0 {
            let suppressed = app.world().resource::<IgnoredPairs>().is_ignored(helmet, head);
            log_info(&format!("Tick {}: helmet ↔ head suppressed = {}", tick, suppressed));
        }
    }

    for (name, armor) in [("Helmet", helmet), ("Vest", vest)] {
        if let Some(piece) = app.world().get::<ArmorPiece>(armor) {
            println!("{}: {:?} (site {:?})", name, piece.state(), piece.attached_site());
        }
    }

    println!("Simulation complete!");
}
