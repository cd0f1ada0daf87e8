//! Shared types for the home-inspection sync core.
//!
//! - [`models`]: the in-memory domain entities owned by the store
//! - [`wire`]: JSON payloads exchanged with the inspection backend
//! - [`events`]: change notifications broadcast to UI adapters

pub mod events;
mod lenient;
pub mod models;
pub mod wire;

pub use events::StoreEvent;
pub use models::Comment;
pub use models::CommentId;
pub use models::InspectionResult;
pub use models::ResultId;
pub use models::Section;
pub use models::SectionId;
pub use models::SubSection;
pub use models::SubSectionId;
