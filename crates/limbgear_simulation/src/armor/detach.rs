//! Detach: user intent + grace period timer
//!
//! Timer тикает только в FixedUpdate (cooperative per-step), никаких
//! асинхронных таймеров. Отменить начатый detach нельзя.

use bevy::prelude::*;

use super::{ArmorRig, ArmorUsageError, DetachArmorIntent};
use crate::components::ArmorPiece;
use crate::config::ArmorConfig;
use crate::error::ArmorError;

/// Grace period после detach
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DetachTimer {
    /// 0 ≤ elapsed ≤ grace
    pub elapsed: f32,
    pub active: bool,
}

impl DetachTimer {
    pub fn arm(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn disarm(&mut self) {
        self.active = false;
    }

    /// +delta. true ровно на том шаге, где elapsed достиг `grace`.
    pub fn tick(&mut self, delta: f32, grace: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed = (self.elapsed + delta).min(grace);
        self.elapsed >= grace
    }
}

/// Обработка `DetachArmorIntent`
///
/// Detach не надетой брони = usage error: log_error + `ArmorUsageError`.
pub fn process_detach_intents(
    mut intents: EventReader<DetachArmorIntent>,
    mut rig: ArmorRig,
    mut armor: Query<(&mut ArmorPiece, &mut DetachTimer, Option<&GlobalTransform>)>,
    mut errors: EventWriter<ArmorUsageError>,
) {
    for intent in intents.read() {
        let result = match armor.get_mut(intent.armor) {
            Ok((mut piece, mut timer, global)) => {
                rig.detach(intent.armor, &mut piece, &mut timer, global)
            }
            Err(_) => Err(ArmorError::NotArmor(intent.armor)),
        };

        if let Err(error) = result {
            crate::log_error(&format!("❌ DetachArmorIntent rejected: {}", error));
            errors.write(ArmorUsageError { error });
        }
    }
}

/// Advance timers, по истечении grace — восстановление коллизии
pub fn advance_detach_timers(
    time: Res<Time<Fixed>>,
    config: Res<ArmorConfig>,
    mut rig: ArmorRig,
    mut armor: Query<(Entity, &mut ArmorPiece, &mut DetachTimer)>,
) {
    let delta = time.delta_secs();

    for (entity, mut piece, mut timer) in armor.iter_mut() {
        if !timer.tick(delta, config.detach_grace_secs) {
            continue;
        }
        timer.disarm();
        rig.finish_detach(entity, &mut piece);
    }
}
