//! Armor events
//!
//! # Architecture
//!
//! **Intents (вход):**
//! - `DetachArmorIntent` → снять надетую броню (context menu "Detach armor")
//!
//! **Notifications (выход):**
//! - `ArmorAttached` / `ArmorDetached` / `ArmorDetachCompleted` — переходы state machine
//! - `ArmorPunctured` — sharp объект пробил броню
//! - `AttachRejected` — контакт с limb не привёл к attach (и почему)
//! - `ArmorUsageError` — нарушение контракта (например detach не надетой брони)

use bevy::prelude::*;

use crate::category::CategoryId;
use crate::error::ArmorError;

/// Снять броню
///
/// # Flow
/// 1. Удалить joint, сбросить sort order
/// 2. Убрать exclusivity marker с limb
/// 3. Unparent, броня снова свободное тело
/// 4. `Detaching` + grace timer (коллизия с телом подавлена ещё N секунд)
#[derive(Event, Clone, Debug)]
pub struct DetachArmorIntent {
    pub armor: Entity,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ArmorAttached {
    pub armor: Entity,
    pub site: Entity,
    pub category: CategoryId,
}

/// Броня снята, grace period начался
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ArmorDetached {
    pub armor: Entity,
    pub site: Entity,
}

/// Grace period закончился, коллизия с телом восстановлена
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ArmorDetachCompleted {
    pub armor: Entity,
    pub former_site: Entity,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ArmorPunctured {
    pub armor: Entity,
    pub by: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// На теле нет limb с нужным tag'ом
    MissingSite,
    /// Limb уже занят совместимой категорией
    Occupied { by: Entity },
    /// `require_exact_limb_site`, а контакт был с другой частью тела
    InexactContact { touched: Entity },
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct AttachRejected {
    pub armor: Entity,
    pub touched: Entity,
    pub reason: RejectReason,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ArmorUsageError {
    pub error: ArmorError,
}
