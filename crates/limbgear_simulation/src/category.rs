//! Wearer categories — открытая иерархия типов экипировки
//!
//! Категории регистрируются в runtime (моды добавляют свои), ядро не знает
//! их заранее. Вопрос "совместимы ли X и Y" задаётся через `CategoryRelation`.
//!
//! Совместимость: `A == B ∨ A ⊂ B ∨ B ⊂ A ∨ declared(A, B)`.
//! Declared links хранятся неупорядоченно → отношение симметрично.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ArmorError, Result};

/// Handle категории в `CategoryRegistry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

impl CategoryId {
    /// Корень иерархии (любой wearer)
    pub const WEARER: CategoryId = CategoryId(0);
    pub const BODY_ARMOR: CategoryId = CategoryId(1);
    pub const CLOTHING: CategoryId = CategoryId(2);
}

/// Capability query: совместимы ли две категории
pub trait CategoryRelation {
    fn is_compatible(&self, a: CategoryId, b: CategoryId) -> bool;
}

#[derive(Debug, Clone)]
struct CategoryInfo {
    name: String,
    parent: Option<CategoryId>,
}

/// Реестр категорий (resource)
#[derive(Resource, Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<CategoryInfo>,
    by_name: HashMap<String, CategoryId>,
    declared: HashSet<(CategoryId, CategoryId)>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        let mut registry = Self {
            categories: Vec::new(),
            by_name: HashMap::new(),
            declared: HashSet::new(),
        };
        // Порядок регистрации = значения констант CategoryId
        registry.insert("ArmorWearer", None);
        registry.insert("BodyArmor", Some(CategoryId::WEARER));
        registry.insert("Clothing", Some(CategoryId::WEARER));
        registry
    }
}

impl CategoryRegistry {
    fn insert(&mut self, name: &str, parent: Option<CategoryId>) -> CategoryId {
        let id = CategoryId(self.categories.len() as u32);
        self.categories.push(CategoryInfo {
            name: name.to_string(),
            parent,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn contains(&self, id: CategoryId) -> bool {
        (id.0 as usize) < self.categories.len()
    }

    /// Регистрирует новую категорию под `parent`
    pub fn register(&mut self, name: impl Into<String>, parent: CategoryId) -> Result<CategoryId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ArmorError::DuplicateCategory(name));
        }
        if !self.contains(parent) {
            return Err(ArmorError::UnknownCategory(format!("{:?}", parent)));
        }
        Ok(self.insert(&name, Some(parent)))
    }

    /// То же что `register`, но parent задан именем
    pub fn register_named(&mut self, name: impl Into<String>, parent: &str) -> Result<CategoryId> {
        let parent = self.lookup(parent)?;
        self.register(name, parent)
    }

    /// Явная cross-family совместимость (например мод делает "Cape" ~ "Clothing")
    pub fn declare_compatible(&mut self, a: CategoryId, b: CategoryId) -> Result<()> {
        for id in [a, b] {
            if !self.contains(id) {
                return Err(ArmorError::UnknownCategory(format!("{:?}", id)));
            }
        }
        self.declared.insert((a.min(b), a.max(b)));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<CategoryId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ArmorError::UnknownCategory(name.to_string()))
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.categories.get(id.0 as usize).map(|info| info.name.as_str())
    }

    pub fn parent(&self, id: CategoryId) -> Option<CategoryId> {
        self.categories.get(id.0 as usize).and_then(|info| info.parent)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        (0..self.categories.len() as u32).map(CategoryId)
    }

    /// `child` равен `ancestor` или лежит под ним в дереве
    pub fn is_subtype_of(&self, child: CategoryId, ancestor: CategoryId) -> bool {
        let mut current = Some(child);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl CategoryRelation for CategoryRegistry {
    fn is_compatible(&self, a: CategoryId, b: CategoryId) -> bool {
        a == b
            || self.is_subtype_of(a, b)
            || self.is_subtype_of(b, a)
            || self.declared.contains(&(a.min(b), a.max(b)))
    }
}
