use crate::constants::{commands, models::FAST_PREFIX};

/// Control texts answered without the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Clear,
}

/// Which configured model a completion should go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelVariant {
    #[default]
    Default,
    Fast,
}

/// An inbound text after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Control(ControlCommand),
    Completion { model: ModelVariant, text: String },
}

/// Classify an inbound text once, before anything else looks at it.
///
/// Only the exact literals `/start` and `/clear` are commands. A leading
/// `fast.` selects the fast model and is stripped from the query.
pub fn classify(text: &str) -> Inbound {
    match text {
        commands::START => Inbound::Control(ControlCommand::Start),
        commands::CLEAR => Inbound::Control(ControlCommand::Clear),
        _ => match text.strip_prefix(FAST_PREFIX) {
            Some(rest) => Inbound::Completion {
                model: ModelVariant::Fast,
                text: rest.to_string(),
            },
            None => Inbound::Completion {
                model: ModelVariant::Default,
                text: text.to_string(),
            },
        },
    }
}
