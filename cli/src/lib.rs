//! Terminal adapter for the inspection store.
//!
//! Stands in for the checklist UI: it bootstraps an [`InspectionStore`],
//! renders the hierarchy, and drives mutations from typed commands.
//!
//! [`InspectionStore`]: homeinspect_core::InspectionStore

pub mod backend_args;
pub mod dump_cmd;
pub mod session_cmd;

pub use backend_args::BackendArgs;
pub use dump_cmd::DumpArgs;
