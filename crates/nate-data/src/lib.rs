//! In-memory tabular data for Nate.
//!
//! Tools produce and consume named [`DataArtifact`]s held in an
//! [`ArtifactStore`]. Each artifact wraps a typed, column-oriented
//! [`Table`] that the query engine can project, filter and sort without
//! building any intermediate expression strings.

pub mod artifact;
pub mod histogram;
pub mod load;
pub mod query;
pub mod table;

pub use artifact::{ArtifactStore, DataArtifact};
pub use histogram::{Histogram, HistogramBin};
pub use query::{
    read_artifact, run_query, CompareOp, Predicate, QueryResult, SortDirection, SortKey,
    TableQuery, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use table::{Cell, Column, ColumnType, Table, TableError};
