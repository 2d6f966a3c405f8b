//! Biodiversity tools for Nate.
//!
//! - [`source`]: the `DataSource` trait and its iNaturalist implementation
//! - [`tools`]: the tools registered with the conversation session
//! - [`plot`]: where histogram output goes

pub mod plot;
pub mod source;
pub mod tools;

pub use plot::{PlotSink, TextPlotSink};
pub use source::{DataSource, INaturalistClient, ObservationQuery};
pub use tools::builtin_registry;
