use crate::agent::ActionRegistry;
use crate::traits::{ChatMessage, Role};
use std::fmt::Write;

/// Default persona: a university admissions advisor.
pub const ADVISOR_PREAMBLE: &str = "You are a university admissions advisor. You help students understand entry requirements, application steps and how their qualifications compare with course offers.

UCAS tariff (points per grade):
- A-level: A* = 56, A = 48, B = 40, C = 32, D = 24, E = 16
- AS-level: A = 20, B = 16, C = 12, D = 10, E = 6
Use the ucas_points action to total a set of grades rather than adding them yourself, and search for a course's current entry requirements before comparing them with a student's points.";

const PROTOCOL: &str = "You operate in a strict ReAct loop of Thought, Action, PAUSE, Observation.
At the end of the loop you output an Answer.
Use Thought to describe your thoughts about the question you have been asked.
Use Action to run one of the actions available to you - then return PAUSE.
Observation will be the result of running those actions.

Write an action on its own line as `Action: <action>: <input>` and emit at most one action per turn.
When you know the answer, start your response with `Answer:` and do not include an action.

Formatting for Answer:
- Lead with the direct answer in one or two sentences, then add supporting detail.
- Show the figures behind any calculation.
- Include 2–4 citations as `[title](url)` at the end when the answer relies on search results.

Error handling:
- If an Observation starts with `Error calculating:`, fix the expression and try again.
- If a search fails or returns no results, rephrase the query once, then answer with what you know and say what could not be verified.
- Never invent an Observation and never name an action that is not listed below.";

const EXAMPLE_SESSION: &str = "Example session:

Question: What is the population of Paris?
Thought: I should search for information about Paris's population
Action: search: What is the current population of Paris, France?
PAUSE

You will be called again with this:

Observation: [Search results about Paris population]

You then output:

Answer: Based on the search results, Paris has a population of approximately 2.2 million people.";

/// Renders the ReAct system prompt from the registered actions.
pub struct ContextBuilder {
    preamble: Option<String>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self { preamble: None }
    }

    /// Extra instructions placed ahead of the protocol, e.g. a persona.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    pub fn build_system_prompt(&self, registry: &ActionRegistry) -> String {
        let mut parts = vec![];

        if let Some(preamble) = self.preamble.as_deref()
            && !preamble.trim().is_empty()
        {
            parts.push(preamble.trim().to_string());
        }

        parts.push(PROTOCOL.to_string());
        parts.push(Self::action_instructions(registry));
        parts.push(EXAMPLE_SESSION.to_string());

        parts.join("\n\n")
    }

    fn action_instructions(registry: &ActionRegistry) -> String {
        let mut instructions = String::from("Your available actions are:\n");

        for action in registry.actions() {
            let _ = write!(
                instructions,
                "\n{name}:\ne.g. Action: {name}: {example}\n{description}\n",
                name = action.name(),
                example = action.example(),
                description = action.description()
            );
        }

        instructions.trim_end().to_string()
    }
}

/// Shapes the history for a backend.
///
/// Backends without a distinct system role get every system message folded
/// into the first user turn instead; the stored conversation is untouched.
pub fn prepare_messages(messages: &[ChatMessage], supports_system_role: bool) -> Vec<ChatMessage> {
    if supports_system_role {
        return messages.to_vec();
    }

    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let mut prepared: Vec<ChatMessage> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect();

    if system.is_empty() {
        return prepared;
    }

    let system = system.join("\n\n");
    match prepared.iter_mut().find(|m| m.role == Role::User) {
        Some(first_user) => {
            first_user.content = format!("{}\n\n{}", system, first_user.content);
        }
        None => prepared.insert(0, ChatMessage::user(system)),
    }

    prepared
}
