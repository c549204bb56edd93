pub mod action;
pub mod provider;
pub mod search;

pub use action::Action;
pub use provider::{ChatMessage, Provider, Role};
pub use search::SearchClient;
