// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::perfume::Perfume;
use super::Record;

/// Bottle size. The wire encodes these as bare millilitre strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "50")]
    Ml50,
    #[serde(rename = "100")]
    Ml100,
    #[serde(rename = "200")]
    Ml200,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Ml50, Size::Ml100, Size::Ml200];

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Ml50 => "50",
            Size::Ml100 => "100",
            Size::Ml200 => "200",
        }
    }

    pub fn parse(s: &str) -> Option<Size> {
        match s.trim() {
            "50" => Some(Size::Ml50),
            "100" => Some(Size::Ml100),
            "200" => Some(Size::Ml200),
            _ => None,
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ml", self.as_str())
    }
}

/// A stocked bottle. The server nests the full perfume (which in turn
/// nests its brand) in every inventory row it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub size: Size,
    pub perfume: Perfume,
    pub price: f64,
    pub stock: i64,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl Record for InventoryItem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl InventoryItem {
    pub fn perfume_name(&self) -> &str {
        &self.perfume.name
    }

    pub fn brand_name(&self) -> &str {
        &self.perfume.brand.name
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Partial update payload for PUT /inventory/{id}.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}
