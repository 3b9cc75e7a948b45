mod traits;
mod grok;

pub use traits::*;
pub use grok::GrokClient;
