pub mod error;
pub mod constants;
pub mod llm;
pub mod context;
pub mod delivery;
pub mod conversation;
pub mod config;

// Re-export key types
pub use error::GrokgramError;
pub use llm::{ChatId, Completion, CompletionProvider, CompletionRequest, GrokClient, Message, MessageId, Role};
pub use context::{HistoryStore, InMemoryHistory};
pub use delivery::{
    split_response, split_text, DeliveryPipeline, DeliveryReport, Formatting, MessageSender,
    OperatorNotifier, OutgoingMessage, SendError, Split, SplitWarning, UnitState,
};
pub use conversation::{classify, ControlCommand, Inbound, InboundMessage, ModelVariant, Orchestrator, Outcome};
pub use config::Settings;
