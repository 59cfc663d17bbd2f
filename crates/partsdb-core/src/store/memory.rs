use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::PartStore;
use crate::error::{PartsError, Result};
use crate::types::{Category, NewCategory, NewPart, Part, PartListing, PartUpdate};

#[derive(Default)]
struct Inner {
    categories: BTreeMap<i32, Category>,
    parts: BTreeMap<i32, Part>,
    last_category_id: i32,
    last_sequence_number: i32,
}

/// In-process store with the same semantics as [`super::PgStore`].
///
/// Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive, then bytewise; matches `ORDER BY lower(x), x` in PgStore.
fn name_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[async_trait]
impl PartStore for MemoryStore {
    async fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut list: Vec<Category> = inner
            .categories
            .values()
            .filter(|c| include_inactive || c.is_active)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            name_order(&a.display_name, &b.display_name).then_with(|| a.id.cmp(&b.id))
        });
        Ok(list)
    }

    async fn get_category(&self, id: i32) -> Result<Category> {
        let inner = self.inner.read().await;
        inner
            .categories
            .get(&id)
            .cloned()
            .ok_or(PartsError::CategoryNotFound(id))
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category> {
        let mut inner = self.inner.write().await;
        inner.last_category_id += 1;
        let category = Category {
            id: inner.last_category_id,
            display_name: new.display_name,
            description: new.description,
            is_active: true,
        };
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn set_category_active(&self, id: i32, active: bool) -> Result<Category> {
        let mut inner = self.inner.write().await;
        let category = inner
            .categories
            .get_mut(&id)
            .ok_or(PartsError::CategoryNotFound(id))?;
        category.is_active = active;
        Ok(category.clone())
    }

    async fn parts_in_category(&self, category_id: i32) -> Result<Vec<PartListing>> {
        let inner = self.inner.read().await;
        let mut list: Vec<PartListing> = inner
            .parts
            .values()
            .filter(|p| p.category_id == category_id && p.is_active)
            .map(|p| PartListing {
                sequence_number: p.sequence_number,
                name: p.name.clone(),
                description: p.description.clone(),
            })
            .collect();
        list.sort_by(|a, b| {
            name_order(&a.name, &b.name)
                .then_with(|| a.sequence_number.cmp(&b.sequence_number))
        });
        Ok(list)
    }

    async fn get_part(&self, sequence_number: i32) -> Result<Part> {
        let inner = self.inner.read().await;
        inner
            .parts
            .get(&sequence_number)
            .cloned()
            .ok_or(PartsError::PartNotFound(sequence_number))
    }

    async fn first_category(&self) -> Result<Option<Category>> {
        let inner = self.inner.read().await;
        Ok(inner.categories.values().next().cloned())
    }

    async fn first_part(&self) -> Result<Option<Part>> {
        let inner = self.inner.read().await;
        Ok(inner.parts.values().next().cloned())
    }

    async fn insert_part(&self, new: NewPart) -> Result<Part> {
        let mut inner = self.inner.write().await;
        if !inner.categories.contains_key(&new.category_id) {
            return Err(PartsError::CategoryNotFound(new.category_id));
        }
        inner.last_sequence_number += 1;
        let now = Utc::now();
        let part = Part {
            sequence_number: inner.last_sequence_number,
            name: new.name,
            category_id: new.category_id,
            value: new.value,
            reference: new.reference,
            footprint: new.footprint,
            symbol_id: new.symbol_id,
            description: new.description,
            datasheet: new.datasheet,
            keywords: new.keywords,
            fields: new.fields,
            exclude_from_bom: new.exclude_from_bom,
            exclude_from_board: new.exclude_from_board,
            exclude_from_sim: new.exclude_from_sim,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.parts.insert(part.sequence_number, part.clone());
        Ok(part)
    }

    async fn update_part(&self, sequence_number: i32, update: PartUpdate) -> Result<Part> {
        let mut inner = self.inner.write().await;
        let current = inner
            .parts
            .get(&sequence_number)
            .ok_or(PartsError::PartNotFound(sequence_number))?;
        if update.name.as_ref().is_some_and(|n| *n != current.name) {
            return Err(PartsError::PartNameImmutable(sequence_number));
        }
        if let Some(cid) = update.category_id {
            if !inner.categories.contains_key(&cid) {
                return Err(PartsError::CategoryNotFound(cid));
            }
        }
        let part = inner
            .parts
            .get_mut(&sequence_number)
            .ok_or(PartsError::PartNotFound(sequence_number))?;
        update.apply_to(part);
        part.updated_at = Utc::now();
        Ok(part.clone())
    }

    async fn set_part_active(&self, sequence_number: i32, active: bool) -> Result<Part> {
        let mut inner = self.inner.write().await;
        let part = inner
            .parts
            .get_mut(&sequence_number)
            .ok_or(PartsError::PartNotFound(sequence_number))?;
        part.is_active = active;
        part.updated_at = Utc::now();
        Ok(part.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resistor(name: &str, category_id: i32) -> NewPart {
        NewPart {
            name: name.into(),
            category_id,
            value: "10k".into(),
            footprint: "Resistor_SMD:R_0805_2012Metric".into(),
            symbol_id: "Device:R".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn categories_sorted_and_filtered() {
        let store = MemoryStore::new();
        store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let caps = store.insert_category(NewCategory::new("Capacitors")).await.unwrap();
        store.insert_category(NewCategory::new("Diodes")).await.unwrap();
        store.set_category_active(caps.id, false).await.unwrap();

        let active = store.list_categories(false).await.unwrap();
        let names: Vec<_> = active.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["Diodes", "Resistors"]);

        let all = store.list_categories(true).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].display_name, "Capacitors");
    }

    #[tokio::test]
    async fn insert_part_requires_category() {
        let store = MemoryStore::new();
        let err = store.insert_part(resistor("R1", 99)).await.unwrap_err();
        assert!(matches!(err, PartsError::CategoryNotFound(99)));
    }

    #[tokio::test]
    async fn parts_in_category_sorted_and_active_only() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let other = store.insert_category(NewCategory::new("Other")).await.unwrap();
        store.insert_part(resistor("R_b", cat.id)).await.unwrap();
        let a = store.insert_part(resistor("R_a", cat.id)).await.unwrap();
        let c = store.insert_part(resistor("R_c", cat.id)).await.unwrap();
        store.insert_part(resistor("X", other.id)).await.unwrap();
        store.set_part_active(c.sequence_number, false).await.unwrap();

        let list = store.parts_in_category(cat.id).await.unwrap();
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["R_a", "R_b"]);
        assert_eq!(list[0].sequence_number, a.sequence_number);

        assert!(store.parts_in_category(1234).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inactive_part_still_resolves() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let p = store.insert_part(resistor("R1", cat.id)).await.unwrap();
        store.set_part_active(p.sequence_number, false).await.unwrap();
        let got = store.get_part(p.sequence_number).await.unwrap();
        assert!(!got.is_active);
    }

    #[tokio::test]
    async fn rename_is_rejected() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let p = store.insert_part(resistor("R1", cat.id)).await.unwrap();

        let err = store
            .update_part(
                p.sequence_number,
                PartUpdate {
                    name: Some("R2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PartsError::PartNameImmutable(_)));
        assert_eq!(store.get_part(p.sequence_number).await.unwrap().name, "R1");
    }

    #[tokio::test]
    async fn update_touches_updated_at() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let p = store.insert_part(resistor("R1", cat.id)).await.unwrap();

        let updated = store
            .update_part(
                p.sequence_number,
                PartUpdate {
                    name: Some("R1".into()),
                    value: Some("22k".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.value, "22k");
        assert!(updated.updated_at >= p.updated_at);
        assert_eq!(updated.created_at, p.created_at);
    }

    #[tokio::test]
    async fn update_unknown_part_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_part(5, PartUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PartsError::PartNotFound(5)));
    }

    #[tokio::test]
    async fn update_checks_part_before_category() {
        let store = MemoryStore::new();
        let err = store
            .update_part(
                42,
                PartUpdate {
                    category_id: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PartsError::PartNotFound(42)));
    }

    #[tokio::test]
    async fn update_to_missing_category_is_rejected() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let p = store.insert_part(resistor("R1", cat.id)).await.unwrap();
        let err = store
            .update_part(
                p.sequence_number,
                PartUpdate {
                    category_id: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PartsError::CategoryNotFound(7)));
    }

    #[tokio::test]
    async fn update_clears_datasheet() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("Resistors")).await.unwrap();
        let mut new = resistor("R1", cat.id);
        new.datasheet = Some("https://example.com/r.pdf".into());
        let p = store.insert_part(new).await.unwrap();

        let updated = store
            .update_part(
                p.sequence_number,
                PartUpdate {
                    datasheet: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.datasheet, None);
    }

    #[tokio::test]
    async fn names_sort_case_insensitively() {
        let store = MemoryStore::new();
        let cat = store.insert_category(NewCategory::new("resistors")).await.unwrap();
        store.insert_category(NewCategory::new("Capacitors")).await.unwrap();
        for name in ["b", "C", "A"] {
            store.insert_part(resistor(name, cat.id)).await.unwrap();
        }

        let parts = store.parts_in_category(cat.id).await.unwrap();
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "b", "C"]);

        let cats = store.list_categories(false).await.unwrap();
        let names: Vec<_> = cats.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["Capacitors", "resistors"]);
    }

    #[tokio::test]
    async fn first_rows_use_lowest_id() {
        let store = MemoryStore::new();
        assert!(store.first_category().await.unwrap().is_none());
        assert!(store.first_part().await.unwrap().is_none());
        let a = store.insert_category(NewCategory::new("Z")).await.unwrap();
        store.insert_category(NewCategory::new("A")).await.unwrap();
        assert_eq!(store.first_category().await.unwrap().unwrap().id, a.id);
    }
}
