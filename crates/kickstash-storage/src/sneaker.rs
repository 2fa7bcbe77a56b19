//! Sneaker record

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sneaker {
    /// Row id. Assigned by storage on first insert.
    pub id: i64,
    pub name: String,
    pub brand: String,
    /// Price in minor currency units.
    pub price: i64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl Sneaker {
    /// Sentinel id meaning "not yet persisted; generate a new id".
    pub const UNASSIGNED_ID: i64 = 0;

    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        price: i64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Self::UNASSIGNED_ID,
            name: name.into(),
            brand: brand.into(),
            price,
            image_url: image_url.into(),
        }
    }

    /// The fixed record written by the demo "add" action.
    pub fn demo() -> Self {
        Self::new(
            "Air Jordan 1",
            "Nike",
            25000,
            "https://i.imgur.com/ZcLLrkY.jpg",
        )
    }

    pub fn is_persisted(&self) -> bool {
        self.id != Self::UNASSIGNED_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sneaker_is_unassigned() {
        let sneaker = Sneaker::new("Dunk Low", "Nike", 12000, "https://example.com/dunk.jpg");
        assert_eq!(sneaker.id, Sneaker::UNASSIGNED_ID);
        assert!(!sneaker.is_persisted());
    }

    #[test]
    fn test_demo_record() {
        let demo = Sneaker::demo();
        assert_eq!(demo.name, "Air Jordan 1");
        assert_eq!(demo.brand, "Nike");
        assert_eq!(demo.price, 25000);
        assert_eq!(demo.image_url, "https://i.imgur.com/ZcLLrkY.jpg");
        assert!(!demo.is_persisted());
    }

    #[test]
    fn test_serde_field_name() {
        let json = serde_json::to_value(Sneaker::demo()).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("image_url").is_none());
    }
}
