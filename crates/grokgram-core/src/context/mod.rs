mod history;
pub mod system_prompt;

pub use history::{HistoryStore, InMemoryHistory};
pub use system_prompt::{default_system_prompt, resolve_system_prompt};
