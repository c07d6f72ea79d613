mod health;
pub mod reply;
pub mod router;
pub mod state;

pub use reply::ApiReply;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
