//! Data models shared by the collector, the archive and the chart builder
//!
//! Prices are parsed once into [`Price`] and never handled as text again.

pub mod instrument;
pub mod price;
pub mod series;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use instrument::InstrumentSet;
pub use price::Price;
pub use series::{Direction, ExtremumTrack, PlotPoint, PlottedSeries};
pub use snapshot::{Observation, Quote, SnapshotRecord};
