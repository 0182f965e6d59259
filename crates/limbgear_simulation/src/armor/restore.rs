//! Save/restore wearer markers
//!
//! Persisted state брони на limb — тройка (category name, armor name, source).
//! При загрузке сцены host вешает `RestoredWearer` на limb, система
//! находит template в `ArmorCatalog`, спавнит броню, надевает её и убирает marker.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ArmorRig, ArmorUsageError};
use crate::category::CategoryRegistry;
use crate::components::{ArmorPiece, Wearers};
use crate::error::ArmorError;

/// Откуда asset: обычный каталог или custom-spawnable реестр модов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AssetSource {
    #[default]
    Catalog,
    Custom,
}

/// Сохранённый wearer marker
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct SavedWearer {
    pub category: String,
    pub armor_name: String,
    #[serde(default)]
    pub source: AssetSource,
}

/// Marker на limb после загрузки сцены (одноразовый)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct RestoredWearer(pub SavedWearer);

/// Репозиторий spawnable брони (resource, отдельный namespace на source)
#[derive(Resource, Debug, Default, Clone)]
pub struct ArmorCatalog {
    templates: HashMap<(AssetSource, String), ArmorPiece>,
}

impl ArmorCatalog {
    /// Регистрирует template. Имя и source записываются в сам piece.
    pub fn register(&mut self, name: impl Into<String>, source: AssetSource, template: ArmorPiece) {
        let name = name.into();
        let template = template.with_asset(name.clone(), source);
        self.templates.insert((source, name), template);
    }

    pub fn find(&self, name: &str, source: AssetSource) -> Option<&ArmorPiece> {
        self.templates.get(&(source, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Markers limb'а в persisted форме
pub fn saved_wearers(wearers: &Wearers, categories: &CategoryRegistry) -> Vec<SavedWearer> {
    wearers
        .iter()
        .filter_map(|marker| {
            let category = categories.name(marker.category)?;
            Some(SavedWearer {
                category: category.to_string(),
                armor_name: marker.armor_name.clone(),
                source: marker.source,
            })
        })
        .collect()
}

/// Deserialization hook: `RestoredWearer` → spawn + attach, marker удаляется всегда
pub fn resolve_restored_wearers(
    mut commands: Commands,
    restored: Query<(Entity, &RestoredWearer)>,
    catalog: Res<ArmorCatalog>,
    mut rig: ArmorRig,
    mut errors: EventWriter<ArmorUsageError>,
) {
    for (limb, RestoredWearer(saved)) in restored.iter() {
        commands.entity(limb).remove::<RestoredWearer>();

        let category = match rig.categories().lookup(&saved.category) {
            Ok(category) => category,
            Err(error) => {
                crate::log_error(&format!("❌ Restore on {:?} failed: {}", limb, error));
                errors.write(ArmorUsageError { error });
                continue;
            }
        };

        let Some(template) = catalog.find(&saved.armor_name, saved.source) else {
            let error = ArmorError::AssetNotFound {
                name: saved.armor_name.clone(),
                origin: saved.source,
            };
            crate::log_error(&format!("❌ Restore on {:?} failed: {}", limb, error));
            errors.write(ArmorUsageError { error });
            continue;
        };

        if !rig.is_limb(limb) {
            crate::log_warning(&format!(
                "⚠️ RestoredWearer on {:?} which is not a limb, discarded",
                limb
            ));
            continue;
        }

        if let Some(occupant) = rig.occupant(limb, category) {
            crate::log(&format!(
                "Restore on {:?}: '{}' already worn by {:?}, skip",
                limb, saved.category, occupant
            ));
            continue;
        }

        let mut template = template.clone();
        template.category = category;
        let armor = rig.spawn_attached(&template, limb);
        crate::log(&format!(
            "♻️ Restored '{}' ({:?}) as {:?} on {:?}",
            saved.armor_name, saved.source, armor, limb
        ));
    }
}
