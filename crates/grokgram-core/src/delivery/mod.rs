mod splitter;
mod sender;
mod notify;
mod pipeline;

pub use splitter::{split_response, split_text, Split, SplitWarning};
pub use sender::{Formatting, MessageSender, OutgoingMessage, SendError};
pub use notify::OperatorNotifier;
pub use pipeline::{DeliveryPipeline, DeliveryReport, UnitState};
