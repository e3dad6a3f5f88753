//! nlbcheck-ca library interface
//!
//! Checks every unread book in a set of export CSVs against the library
//! catalogue and writes one ranked availability report per input file.
//! Exposes the pipeline pieces for integration testing.

pub mod aggregate;
pub mod checker;
pub mod client;
pub mod filter;
pub mod input;
pub mod isbn;
pub mod pool;
pub mod report;
pub mod schema;

pub use checker::AvailabilityChecker;
pub use client::{CatalogueClient, CatalogueError, NlbClient};
pub use pool::{CancelFlag, WorkerPool};
