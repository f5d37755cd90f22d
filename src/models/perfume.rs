// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::brand::Brand;
use super::Record;

/// A product row. The server nests the full owning brand in every perfume
/// it returns; the nested copy is read-only and mutations reference the
/// brand by bare id instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perfume {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub brand: Brand,
    #[serde(default)]
    pub logo: Option<String>,
}

impl Record for Perfume {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Perfume {
    pub fn brand_name(&self) -> &str {
        &self.brand.name
    }
}

/// Creation payload for POST /perfumes.
///
/// `imageUrl` goes out as an explicit `null` when absent; the server
/// rejects payloads where the key is missing entirely.
#[derive(Debug, Clone, Serialize)]
pub struct NewPerfume {
    pub name: String,
    pub description: String,
    #[serde(rename = "brandId")]
    pub brand_id: i64,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Partial update payload for PUT /perfumes/{id}.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerfumePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "brandId", skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
