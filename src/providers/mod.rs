pub mod http_client;
pub mod openai;
pub mod response;
pub mod scrub;
pub mod traits;

pub use openai::OpenAiProvider;
pub use response::{GenerationParams, MessageRole, ProviderMessage, ProviderResponse};
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
