//! Data models for the perfume store API.
//!
//! This module contains the data structures used to represent
//! server-held records and their mutation payloads:
//!
//! - `Brand`, `NewBrand`, `BrandPatch`: perfume houses
//! - `Perfume`, `NewPerfume`, `PerfumePatch`: products, each embedding its `Brand`
//! - `InventoryItem`, `InventoryPatch`, `Size`: stocked bottles with price and count

pub mod brand;
pub mod inventory;
pub mod perfume;

pub use brand::{Brand, BrandPatch, NewBrand};
pub use inventory::{InventoryItem, InventoryPatch, Size};
pub use perfume::{NewPerfume, Perfume, PerfumePatch};

/// Integer identity shared by every server-held record.
///
/// Row reconciliation matches on this id: update replaces the element with
/// the same id, delete removes it, create refuses to append a duplicate.
pub trait Record {
    fn id(&self) -> i64;
}
