//! Neighborhood-level census aggregation.
//!
//! Load a census table once with [`data::loader::load_file`], pick
//! neighborhoods with a [`FilterSelection`], and derive the figures a
//! dashboard displays through the pure functions in [`engine`] or a
//! [`Session`].

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod session;

pub use config::LoaderConfig;
pub use data::filter::FilterSelection;
pub use data::model::{CellValue, Dataset, RawRecord};
pub use error::{AggregationError, Diagnostic, LoadError};
pub use session::{derive_report, DashboardReport, NeighborhoodReport, Session};
