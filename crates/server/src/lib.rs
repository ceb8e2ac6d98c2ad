pub mod errors;
pub mod events;
pub mod server;
pub mod session_handle;
pub mod session_loop;
pub mod types;
mod view;

pub use errors::ServerError;
pub use events::EventBuffer;
pub use server::SessionServer;
pub use session_handle::SessionHandle;
pub use types::{EventBatch, EventCursor, ServerConfig, SessionStatus, StampedEvent};
