use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Catalog record as supplied by the product service. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub stock_quantity: u32,
}

impl CatalogEntity {
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Parse a JSON array of catalog records
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntity>> {
    let entities: Vec<CatalogEntity> = serde_json::from_str(json)?;
    if let Some(blank) = entities.iter().position(|e| e.id.trim().is_empty()) {
        return Err(StoreError::Catalog(format!("entity #{blank} has an empty id")));
    }
    Ok(entities)
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogEntity>> {
    let json = std::fs::read_to_string(path)?;
    parse_catalog(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_fields() {
        let json = r#"[{
            "id": "p-1",
            "name": "Ribeye",
            "category": "Meat & Seafood",
            "price": 18.5,
            "imageUrl": "https://cdn.example/ribeye.jpg",
            "stockQuantity": 4
        }]"#;
        let entities = parse_catalog(json).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].image_url, "https://cdn.example/ribeye.jpg");
        assert_eq!(entities[0].stock_quantity, 4);
        assert!(entities[0].is_in_stock());
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"[{"id": "x", "name": "Bread", "category": "Bakery", "price": 2.0}]"#;
        let entities = parse_catalog(json).unwrap();
        assert_eq!(entities[0].image_url, "");
        assert!(!entities[0].is_in_stock());
    }

    #[test]
    fn rejects_blank_ids() {
        let json = r#"[{"id": " ", "name": "Milk", "category": "Dairy", "price": 1.0}]"#;
        assert!(matches!(parse_catalog(json), Err(StoreError::Catalog(_))));
    }
}
