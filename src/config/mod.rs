pub mod schema;

pub use schema::{
    CompletionConfig, Config, ENV_CHAT_ID, ENV_OPENAI_TOKEN, ENV_TELEGRAM_TOKEN, TelegramConfig,
};
