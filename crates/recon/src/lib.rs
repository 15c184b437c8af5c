//! `stockdiff-recon`: multi-snapshot inventory reconciliation engine.
//!
//! Pure engine crate: receives pre-parsed sheet tables, returns aggregated
//! and filtered delta rows. No CLI or IO dependencies.

pub mod aggregate;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod join;
pub mod model;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{AggregatedRow, CanonicalRow, ReconResult, SheetTable, Snapshot};
