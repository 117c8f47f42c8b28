pub mod manager;
pub mod store;
pub mod types;

pub use manager::SessionManager;
pub use store::{Generation, SessionStore};
pub use types::{AddressingMode, Exchange, SessionConfig, SessionHistory, SessionKey};
