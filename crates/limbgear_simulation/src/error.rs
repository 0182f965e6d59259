//! Ошибки armor подсистемы
//!
//! Usage errors (нарушение контракта вызывающим) — возвращаются как `Err`,
//! система логирует их через `log_error` и пишет `ArmorUsageError` event.
//! Missing limb site — НЕ ошибка (ожидаемый исход для нестандартных тел).

use bevy::prelude::*;
use thiserror::Error;

use crate::armor::AssetSource;
use crate::components::ArmorState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArmorError {
    #[error("armor {armor:?} cannot detach while {state:?}")]
    NotAttached { armor: Entity, state: ArmorState },

    #[error("entity {0:?} is not an armor piece")]
    NotArmor(Entity),

    #[error("unknown wearer category: {0}")]
    UnknownCategory(String),

    #[error("wearer category already registered: {0}")]
    DuplicateCategory(String),

    #[error("armor asset not found: {name} ({origin:?})")]
    AssetNotFound { name: String, origin: AssetSource },

    #[error("invalid armor config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, ArmorError>;
