pub mod dispatch;
pub mod relay;
pub mod status;

pub use relay::Relay;
