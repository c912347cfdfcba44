//! Template selection and caching
//!
//! Resolves the candidate template rows for a `(product type, style)` pair
//! down to exactly one formula per component, and memoizes the resolved
//! set. The cache is read-many/write-rarely: entries are immutable once
//! inserted and the same `Arc` is handed out on every hit, so resolved
//! sets are safely shared across calculations.

use crate::store::TemplateStore;
use ahash::{AHashMap, AHashSet};
use fence_bom_core::FormulaTemplate;
use std::sync::{Arc, RwLock};

/// Selects and caches formula template sets.
pub struct TemplateCatalog<S: TemplateStore> {
    store: S,
    cache: RwLock<AHashMap<String, Arc<Vec<FormulaTemplate>>>>,
}

impl<S: TemplateStore> TemplateCatalog<S> {
    /// Create a catalog over a template store
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: RwLock::new(AHashMap::new()),
        }
    }

    /// Load the resolved template set for a product type and optional
    /// style: exactly one template per component code.
    ///
    /// A cache hit returns the identical `Arc` without touching the store.
    /// A fetch failure is logged and yields an empty, *uncached* set, so a
    /// later call may retry; every component then computes as "no
    /// formula" and the caller sees zero results rather than an error.
    pub fn load(&self, product_type_id: &str, style_id: Option<&str>) -> Arc<Vec<FormulaTemplate>> {
        let key = format!("{}:{}", product_type_id, style_id.unwrap_or("all"));

        // a poisoned lock only means another calculation panicked mid-insert;
        // the map itself is still usable
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Arc::clone(cached);
        }

        let rows = match self.store.fetch_active(product_type_id) {
            Ok(rows) => rows,
            Err(e) => {
                log::error!(
                    "template fetch failed for product type '{}': {}",
                    product_type_id,
                    e
                );
                return Arc::new(Vec::new());
            }
        };

        let resolved = Arc::new(select_templates(rows, style_id));

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // another calculation may have raced us here; keep the first entry
        // so repeated loads stay pointer-identical
        Arc::clone(cache.entry(key).or_insert(resolved))
    }
}

/// Resolve candidate rows down to one template per component.
///
/// Rows are walked in descending priority. A component whose
/// style-specific template has been accepted is locked: later rows for it
/// are skipped outright. A row is accepted when it is generic or matches
/// the requested style. The accepted rows are then deduplicated per
/// component, keeping the highest priority and preferring the
/// style-specific row on a priority tie.
fn select_templates(
    mut rows: Vec<FormulaTemplate>,
    style_id: Option<&str>,
) -> Vec<FormulaTemplate> {
    rows.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut style_locked: AHashSet<String> = AHashSet::new();
    let mut accepted: Vec<FormulaTemplate> = Vec::new();

    for row in rows {
        if style_locked.contains(&row.component_code) {
            continue;
        }
        match (&row.product_style_id, style_id) {
            (None, _) => accepted.push(row),
            (Some(row_style), Some(requested)) if row_style == requested => {
                style_locked.insert(row.component_code.clone());
                accepted.push(row);
            }
            _ => {}
        }
    }

    // dedupe per component: highest priority wins, style-specific wins ties
    let mut order: Vec<String> = Vec::new();
    let mut best: AHashMap<String, FormulaTemplate> = AHashMap::new();
    for row in accepted {
        match best.get(&row.component_code) {
            None => {
                order.push(row.component_code.clone());
                best.insert(row.component_code.clone(), row);
            }
            Some(current) => {
                let wins = row.priority > current.priority
                    || (row.priority == current.priority
                        && !row.is_generic()
                        && current.is_generic());
                if wins {
                    best.insert(row.component_code.clone(), row);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|code| best.remove(&code))
        .collect()
}
