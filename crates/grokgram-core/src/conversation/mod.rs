mod command;
mod orchestrator;

pub use command::{classify, ControlCommand, Inbound, ModelVariant};
pub use orchestrator::{InboundMessage, Orchestrator, Outcome};
