//! Item documents.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// An item offered on the marketplace.
///
/// Items are created once and never updated or deleted. A user's `listings`
/// refer to items by [`ItemId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Item {
    /// Store-generated id.
    pub id: ItemId,
    pub title: String,
    pub description: String,
    /// Image URL or path.
    pub image: String,
    pub price: f64,
    /// Free-form status or condition label (e.g. "used").
    pub stat: String,
}

/// Fields supplied when creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub stat: String,
}

impl NewItem {
    /// Attach a store-generated id, producing the stored document.
    #[must_use]
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            title: self.title,
            description: self.description,
            image: self.image,
            price: self.price,
            stat: self.stat,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_into_item_keeps_every_field() {
        let id = ItemId::generate();
        let item = NewItem {
            title: "Bike".to_string(),
            description: "Road bike".to_string(),
            image: "/img/bike.png".to_string(),
            price: 100.0,
            stat: "used".to_string(),
        }
        .into_item(id);

        assert_eq!(item.id, id);
        assert_eq!(item.title, "Bike");
        assert_eq!(item.description, "Road bike");
        assert_eq!(item.image, "/img/bike.png");
        assert!((item.price - 100.0).abs() < f64::EPSILON);
        assert_eq!(item.stat, "used");
    }

    #[test]
    fn test_item_json_shape() {
        let item = NewItem {
            title: "Lamp".to_string(),
            description: "Desk lamp".to_string(),
            image: String::new(),
            price: 12.5,
            stat: "new".to_string(),
        }
        .into_item(ItemId::generate());

        let value = serde_json::to_value(&item).unwrap();
        assert!(value["id"].is_string());
        assert_eq!(value["title"], "Lamp");
        assert_eq!(value["price"], 12.5);
    }
}
