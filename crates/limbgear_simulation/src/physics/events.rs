//! Contact events (physics → ECS)
//!
//! Источник: rapier bridge в игре, прямой `EventWriter` в headless тестах.

use bevy::prelude::*;

/// Начало/конец контакта двух коллайдеров
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Started(Entity, Entity),
    Stopped(Entity, Entity),
}

impl ContactEvent {
    pub fn entities(&self) -> (Entity, Entity) {
        match *self {
            ContactEvent::Started(a, b) | ContactEvent::Stopped(a, b) => (a, b),
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, ContactEvent::Started(..))
    }
}
