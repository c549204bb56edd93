pub mod agent;
pub mod config;
pub mod expr;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{Agent, AgentLoop, ActionRegistry, ContextBuilder, Conversation, RunReport, Terminal};
pub use config::*;
pub use expr::{EvalError, evaluate};
pub use providers::*;
pub use traits::*;
