//! Contact handling: attach / armor pair registration / puncture
//!
//! `Started(a, b)` обрабатывается для каждой стороны, которая является бронёй:
//! 1. other = limb, броня `Unequipped` → `ArmorRig::try_attach`
//! 2. other = броня → регистрация пары в обоих `SuppressionSet`
//! 3. иначе: надетая броня + sharp объект + roll > stab_resistance → puncture
//!
//! `Stopped(a, b)` безусловно снимает puncture с обеих сторон.

use bevy::prelude::*;

use super::{ArmorPunctured, ArmorRig};
use crate::components::{ArmorPiece, ArmorState};
use crate::physics::{ContactEvent, PhysicalObject};
use crate::DeterministicRng;

pub fn process_armor_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut rig: ArmorRig,
    mut armor: Query<&mut ArmorPiece>,
    objects: Query<&PhysicalObject>,
    mut rng: ResMut<DeterministicRng>,
    mut punctured: EventWriter<ArmorPunctured>,
) {
    for contact in contacts.read() {
        let (a, b) = contact.entities();

        if !contact.is_started() {
            for entity in [a, b] {
                if let Ok(mut piece) = armor.get_mut(entity) {
                    if piece.set_punctured(false) {
                        crate::log(&format!("Armor {:?}: sharp contact ended, blocking again", entity));
                    }
                }
            }
            continue;
        }

        for (subject, other) in [(a, b), (b, a)] {
            if !armor.contains(subject) {
                continue;
            }
            let other_is_limb = rig.is_limb(other);
            let other_is_armor = armor.contains(other);
            let Ok(mut piece) = armor.get_mut(subject) else {
                continue;
            };

            // 1. limb
            if other_is_limb && piece.state() == ArmorState::Unequipped {
                rig.try_attach(subject, &mut piece, other);
                continue;
            }

            // 2. другая броня: решение на следующем шаге
            if other_is_armor {
                rig.register_armor_pair(subject, other);
                continue;
            }

            // 3. generic object: roll только для реальных кандидатов
            let sharp = objects.get(other).is_ok_and(|object| object.sharp);
            if !piece.is_attached() || !sharp || piece.is_punctured() {
                continue;
            }
            let roll = rng.roll();
            if roll > piece.stab_resistance {
                piece.set_punctured(true);
                crate::log_info(&format!(
                    "🗡️ Armor {:?} punctured by {:?} (roll {:.3} > stab {:.2})",
                    subject, other, roll, piece.stab_resistance
                ));
                punctured.write(ArmorPunctured { armor: subject, by: other });
            }
        }
    }
}
