//! Catalog provider — read access for renderers and wizard steps.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub photo_ref: Option<String>,
    pub available: bool,
}

/// A catalog entry before an id is assigned (admin wizard output).
#[derive(Debug, Clone)]
pub struct NewCatalogItem {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub photo_ref: Option<String>,
}

/// Read/insert access to the product catalog.
///
/// The core never mutates existing items; `insert` exists only for the
/// admin add-item wizard.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All items currently available for sale.
    async fn list_available(&self) -> Vec<CatalogItem>;

    /// Look up one item by id.
    async fn get(&self, id: i64) -> Option<CatalogItem>;

    /// Insert a new item, assigning the next id.
    async fn insert(&self, item: NewCatalogItem) -> CatalogItem;
}

/// In-memory catalog with sequential ids.
pub struct InMemoryCatalog {
    items: RwLock<Vec<CatalogItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Catalog pre-loaded with the standard sample bouquets.
    pub fn with_samples() -> Self {
        let catalog = Self::new();
        let samples = [
            ("Classic Roses", "A dozen long-stem red roses", dec!(2500), "roses"),
            ("Tulip Mix", "Seasonal tulips in mixed colors", dec!(1800), "tulips"),
            ("Birthday Bouquet", "Bright mix of roses, chrysanthemums and alstroemeria", dec!(2000), "mixed"),
            ("Peony Dream", "Lush pink peonies", dec!(3200), "peonies"),
            ("White Classic", "White roses and eustoma", dec!(2800), "roses"),
        ];
        {
            let mut items = catalog.items.try_write().expect("fresh catalog lock");
            for (i, (name, description, price, category)) in samples.into_iter().enumerate() {
                items.push(CatalogItem {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    description: description.to_string(),
                    price,
                    category: Some(category.to_string()),
                    photo_ref: None,
                    available: true,
                });
            }
        }
        catalog
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_available(&self) -> Vec<CatalogItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| item.available)
            .cloned()
            .collect()
    }

    async fn get(&self, id: i64) -> Option<CatalogItem> {
        self.items.read().await.iter().find(|i| i.id == id).cloned()
    }

    async fn insert(&self, item: NewCatalogItem) -> CatalogItem {
        let mut items = self.items.write().await;
        let id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let item = CatalogItem {
            id,
            name: item.name,
            description: item.description,
            price: item.price,
            category: item.category,
            photo_ref: item.photo_ref,
            available: true,
        };
        items.push(item.clone());
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn samples_are_listed() {
        let catalog = InMemoryCatalog::with_samples();
        let items = catalog.list_available().await;
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i.available));
    }

    #[tokio::test]
    async fn insert_assigns_next_id() {
        let catalog = InMemoryCatalog::with_samples();
        let inserted = catalog
            .insert(NewCatalogItem {
                name: "Orchid".into(),
                description: "Single orchid stem".into(),
                price: dec!(900),
                category: None,
                photo_ref: None,
            })
            .await;
        assert_eq!(inserted.id, 6);
        assert_eq!(catalog.get(6).await.unwrap().name, "Orchid");
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.get(99).await.is_none());
    }
}
