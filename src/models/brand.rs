// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl Record for Brand {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Brand {
    pub fn logo_display(&self) -> String {
        self.logo
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or("-")
            .to_string()
    }
}

/// Creation payload for POST /brands.
#[derive(Debug, Clone, Serialize)]
pub struct NewBrand {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Partial update payload for PUT /brands/{id}. Absent fields are omitted
/// from the wire so the server keeps their current values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}
