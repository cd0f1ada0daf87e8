//! Root of the `homeinspect-core` library.
//!
//! Owns the inspection object graph (sections, subsections, comments,
//! results), bootstraps it from the backend, and hands UI adapters a
//! query/mutation API plus an event stream.

// Library code reports through tracing; only the binary writes to the terminal.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod state;
mod store;

pub use catalog::Catalog;
pub use config::InspectConfig;
pub use error::LookupError;
pub use error::Result;
pub use error::StoreError;
pub use ledger::ResultLedger;
pub use state::InspectionState;
pub use store::InspectionStore;
pub use store::StartedStore;
pub use store::StoreCounts;

pub use homeinspect_backend_client::BackendClient;
pub use homeinspect_protocol::StoreEvent;
pub use homeinspect_utils_readiness::ReadinessState;
