//! Per-tab content rendering.

pub mod brands;
pub mod inventory;
pub mod perfumes;
