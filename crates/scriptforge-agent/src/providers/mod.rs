pub mod openai_compatible;
pub mod scripted;

pub use openai_compatible::OpenAICompatibleClient;
pub use scripted::ScriptedClient;
