//! LIMBGEAR Simulation Core
//!
//! ECS-симуляция брони на Bevy 0.16: надевание на части тела, exclusivity
//! категорий, armor ↔ armor collision filtering, проколы.
//!
//! LAYERED ARCHITECTURE:
//! - ECS = source of truth (armor state, markers, ignore pairs)
//! - Physics (Rapier) = contacts + joints, подключается через `physics::rapier_bridge`

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod armor;
pub mod category;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use armor::{
    ArmorAttached, ArmorCatalog, ArmorDetachCompleted, ArmorDetached, ArmorPlugin, ArmorPunctured,
    ArmorRig, ArmorSet, ArmorUsageError, AssetSource, AttachRejected, DetachArmorIntent,
    DetachTimer, RejectReason, RestoredWearer, SavedWearer, SuppressionSet,
};
pub use category::{CategoryId, CategoryRegistry, CategoryRelation};
pub use components::*;
pub use config::ArmorConfig;
pub use error::ArmorError;
pub use logger::*;
pub use physics::{ContactEvent, Grip, IgnoredPairs, LimbJoint, PhysicalObject, SortingOrder};

/// Главный plugin симуляции (armor + physics bridge)
///
/// Config задаёт fixed rate и seed. Если `DeterministicRng` уже вставлен
/// (например `create_headless_app(seed)`), он не перетирается.
#[derive(Default)]
pub struct ArmorSimulationPlugin {
    pub config: ArmorConfig,
}

impl ArmorSimulationPlugin {
    pub fn with_config(config: ArmorConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ArmorSimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(error) => {
                log_error(&format!("❌ ArmorSimulationPlugin: {}, using defaults", error));
                ArmorConfig::default()
            }
        };

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.rng_seed));
        }

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.fixed_hz))
            .insert_resource(config)
            // Подсистемы
            .add_plugins((ArmorPlugin, physics::PhysicsBridgePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform [0, 1)
    pub fn roll(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(ArmorConfig::default().rng_seed)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(config::DEFAULT_FIXED_HZ)); // 64Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
