pub mod event;
pub mod response;

pub use event::{Event, MissingParameters};
pub use response::{HealthResponse, MessageResponse};
