//! Category id to YOLO class index mapping.
//!
//! The mapping is built once from the category list and then shared by the
//! label converter and the manifest writer, so class indices in label files
//! and the manifest `names` table always agree.

use std::collections::HashMap;

use log::warn;

use crate::error::PrepError;
use crate::ir::{Category, CategoryId, ClassId};

#[derive(Clone, Debug, PartialEq)]
struct ClassEntry {
    class_id: ClassId,
    name: String,
}

/// Remap table `category_id -> category_id - 1`.
///
/// Lookups of ids that are not in the table yield [`ClassId::UNKNOWN`].
#[derive(Clone, Debug, Default)]
pub struct ClassMap {
    entries: Vec<ClassEntry>,
    by_category: HashMap<CategoryId, ClassId>,
    missing_ids: u64,
}

impl ClassMap {
    /// Builds the table, keeping the order in which categories are listed.
    ///
    /// # Errors
    /// Category id 0 would map onto the unknown sentinel and ids above
    /// `i64::MAX` have no class index; both are rejected with
    /// [`PrepError::InvalidCategoryId`]. Repeated ids are rejected with
    /// [`PrepError::DuplicateCategoryId`]. Gaps in the id range are accepted
    /// and logged, leaving the class range sparse.
    pub fn from_categories(categories: &[Category]) -> Result<Self, PrepError> {
        let mut entries = Vec::with_capacity(categories.len());
        let mut by_category = HashMap::with_capacity(categories.len());
        let mut max_id = 0u64;

        for category in categories {
            let Some(class_id) = ClassId::from_category(category.id) else {
                return Err(PrepError::InvalidCategoryId { id: category.id });
            };
            if by_category.insert(category.id, class_id).is_some() {
                return Err(PrepError::DuplicateCategoryId(category.id));
            }

            max_id = max_id.max(category.id.as_u64());
            entries.push(ClassEntry {
                class_id,
                name: category.name.clone(),
            });
        }

        // Ids are unique and all in 1..=max_id.
        let missing_ids = max_id - entries.len() as u64;
        if missing_ids > 0 {
            warn!(
                "category ids are not contiguous from 1; {} id(s) missing, class indices will be sparse",
                missing_ids
            );
        }

        Ok(Self {
            entries,
            by_category,
            missing_ids,
        })
    }

    /// Class index for a category, or [`ClassId::UNKNOWN`] if it is not listed.
    pub fn class_for(&self, category_id: CategoryId) -> ClassId {
        self.by_category
            .get(&category_id)
            .copied()
            .unwrap_or(ClassId::UNKNOWN)
    }

    /// Returns true if the category id is in the table.
    pub fn contains(&self, category_id: CategoryId) -> bool {
        self.by_category.contains_key(&category_id)
    }

    /// `(class index, name)` pairs in category list order.
    pub fn names(&self) -> impl Iterator<Item = (ClassId, &str)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.class_id, entry.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many ids in `1..=max_id` have no category.
    pub fn missing_category_count(&self) -> u64 {
        self.missing_ids
    }
}
