pub mod context;
pub mod conversation;
pub mod loop_;
pub mod parser;
pub mod registry;

pub use context::{ADVISOR_PREAMBLE, ContextBuilder, prepare_messages};
pub use conversation::Conversation;
pub use loop_::{Agent, AgentLoop, DEFAULT_MAX_TURNS, RunReport, Step, Terminal, TurnEvent, classify};
pub use parser::{ActionInvocation, extract_action, parse_answer};
pub use registry::{ActionKind, ActionRegistry};
