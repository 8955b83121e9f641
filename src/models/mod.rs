pub mod event;
pub mod intent;
pub mod status;

pub use event::{EventSeverity, StackEvent, STACK_RESOURCE_TYPE};
pub use intent::Intent;
pub use status::StackStatus;
