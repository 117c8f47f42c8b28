mod assembler;
mod builder;

pub use assembler::PromptAssembler;
pub use builder::{DEFAULT_SYSTEM_PROMPT, build_messages, render_history};
