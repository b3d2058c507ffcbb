//! Public types for the Termsum API.

mod completion;
mod message;
mod request;

pub(crate) use completion::ErrorEnvelope;
pub use completion::{Choice, ChoiceMessage, CompletionRequest, CompletionResponse};
pub use message::{Message, Role};
pub use request::SummarizeRequest;
