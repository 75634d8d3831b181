//! Norwegian Continental Shelf field production, prepared for a dashboard.
//!
//! Field outlines (zipped shapefile), yearly production per field and the
//! national yearly totals are loaded once and turned into:
//!
//! - a wide table with one row per field and one column per selected year,
//! - that table joined with the field outlines, ordered by field name,
//! - regional totals per year for the share-of-national chart.
//!
//! [`dashboard::Dashboard`] owns the result and answers per-year lookups.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod output;
pub mod reports;
pub mod schema;
pub mod types;
pub mod util;
pub mod wrangle;

pub use config::PipelineConfig;
pub use dashboard::Dashboard;
pub use error::PipelineError;
