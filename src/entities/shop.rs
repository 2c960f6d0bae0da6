use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub whatsapp_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<ShopPhoto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mechanics: Vec<Mechanic>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopPhoto {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub photo_url: String,
    pub display_order: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mechanic {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

impl Shop {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        coordinates: Coordinates,
        whatsapp_number: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            address: None,
            coordinates,
            whatsapp_number: whatsapp_number.into(),
            created_at: now,
            updated_at: now,
            photos: vec![],
            mechanics: vec![],
        }
    }
}
