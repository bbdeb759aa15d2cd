//! In-process repository with the same observable semantics as [`super::PgRepository`].
//! Useful for tests and prototypes; data lives only as long as the value.

use super::{explicit_id, sort_field, Repository};
use crate::entity::{to_row, Entity};
use crate::error::AppError;
use crate::filter::{compare_values, Specification};
use crate::paging::{PageRequest, SortDirection};
use crate::response::Page;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Store<E> {
    rows: BTreeMap<i64, E>,
    next_id: i64,
}

impl<E: Entity> Store<E> {
    fn put(&mut self, mut entity: E) -> E {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                entity.set_id(id);
                id
            }
        };
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.rows.insert(id, entity.clone());
        entity
    }
}

/// Cloning shares the underlying store.
pub struct MemoryRepository<E> {
    store: Arc<RwLock<Store<E>>>,
}

impl<E> Clone for MemoryRepository<E> {
    fn clone(&self) -> Self {
        MemoryRepository {
            store: Arc::clone(&self.store),
        }
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        MemoryRepository {
            store: Arc::new(RwLock::new(Store {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError> {
        Ok(self.store.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>, AppError> {
        Ok(self.store.read().await.rows.values().cloned().collect())
    }

    async fn find_filtered(&self, spec: &Specification, page: &PageRequest) -> Result<Page<E>, AppError> {
        let field = sort_field::<E>(page)?;
        let mut matched = Vec::new();
        for entity in self.store.read().await.rows.values() {
            let row = to_row(entity)?;
            if spec.matches(&row) {
                let key = row.get(field.name).cloned().unwrap_or(Value::Null);
                matched.push((key, entity.clone()));
            }
        }
        // Stable sort over id order; nulls last ascending and first descending, as PostgreSQL does.
        matched.sort_by(|(a, _), (b, _)| {
            let ord = match (a.is_null(), b.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare_values(field.kind, a, b).unwrap_or(Ordering::Equal),
            };
            match page.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        let total = matched.len() as u64;
        let content = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.size as usize)
            .map(|(_, e)| e)
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn save(&self, entity: E) -> Result<E, AppError> {
        explicit_id(&entity)?;
        Ok(self.store.write().await.put(entity))
    }

    async fn save_all(&self, entities: Vec<E>) -> Result<Vec<E>, AppError> {
        for entity in &entities {
            explicit_id(entity)?;
        }
        let mut store = self.store.write().await;
        Ok(entities.into_iter().map(|e| store.put(e)).collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.store.write().await.rows.remove(&id);
        Ok(())
    }

    async fn delete_all_by_id(&self, ids: &[i64]) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        for id in ids {
            store.rows.remove(id);
        }
        Ok(())
    }
}
