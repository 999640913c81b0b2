//! Reconciling import engine
//!
//! Merges batches of loosely-structured collection records into the
//! store without duplicating natural-key entities. Wineries and
//! varietals upsert by exact name; wines always create, resolving
//! their winery/varietal/tag references by name and creating bare
//! entities for names the store doesn't know yet.
//!
//! Per-record store errors never abort a batch. Each is recorded as
//! `"<name>: <message>"` and processing continues.

mod collection;
mod varietals;
mod wineries;
mod wines;

pub use collection::{import_collection, summarize_errors, CollectionImportResult};
pub use varietals::{import_varietals, VarietalImportInput, VarietalImportResult};
pub use wineries::{import_wineries, WineryImportInput, WineryImportResult};
pub use wines::{import_wine, import_wines, WineImportInput, WineImportResult};
