use crate::agent::context::prepare_messages;
use crate::agent::parser::{extract_action, parse_answer};
use crate::agent::registry::{ActionKind, ActionRegistry};
use crate::agent::Conversation;
use crate::traits::{ChatMessage, Provider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

pub const DEFAULT_MAX_TURNS: usize = 5;

const OBSERVATION_PREFIX: &str = "Observation: ";

/// How a run ended. No terminal state resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Answer(String),
    /// The response held neither an action nor an answer.
    Stalled { response: String },
    UnknownAction { name: String, argument: String },
    MaxTurnsReached { max_turns: usize },
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Answer(answer) => write!(f, "{answer}"),
            Self::Stalled { .. } => write!(f, "No action taken and no clear answer"),
            Self::UnknownAction { name, argument } => {
                write!(f, "Unknown action: {name}: {argument}")
            }
            Self::MaxTurnsReached { max_turns } => {
                write!(f, "Max turns reached ({max_turns})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub terminal: Terminal,
    /// Model calls made during the run.
    pub turns: usize,
}

impl RunReport {
    pub fn answer(&self) -> Option<&str> {
        match &self.terminal {
            Terminal::Answer(answer) => Some(answer),
            _ => None,
        }
    }
}

/// What the loop does with one model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Dispatch { kind: ActionKind, argument: String },
    Finish(Terminal),
}

/// Decides the transition for a single response.
pub fn classify(response: &str, registry: &ActionRegistry) -> Step {
    if let Some(invocation) = extract_action(response) {
        return match registry.resolve(&invocation.name) {
            Some(kind) => Step::Dispatch {
                kind,
                argument: invocation.argument,
            },
            None => Step::Finish(Terminal::UnknownAction {
                name: invocation.name,
                argument: invocation.argument,
            }),
        };
    }

    match parse_answer(response) {
        Some(answer) => Step::Finish(Terminal::Answer(answer.to_string())),
        None => Step::Finish(Terminal::Stalled {
            response: response.to_string(),
        }),
    }
}

/// Progress reported while a run is in flight.
#[derive(Debug, Clone, Copy)]
pub enum TurnEvent<'a> {
    Response {
        turn: usize,
        text: &'a str,
    },
    Observation {
        turn: usize,
        action: ActionKind,
        argument: &'a str,
        observation: &'a str,
    },
}

/// A model handle plus the conversation it owns.
pub struct Agent {
    provider: Arc<dyn Provider>,
    conversation: Conversation,
    supports_system_role: bool,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>, conversation: Conversation) -> Self {
        let supports_system_role = provider.supports_system_role();
        Self {
            provider,
            conversation,
            supports_system_role,
        }
    }

    pub fn with_system_role_support(mut self, supported: bool) -> Self {
        self.supports_system_role = supported;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_conversation(self) -> Conversation {
        self.conversation
    }

    /// Calls the model with the history plus `message`, then records both
    /// as a user/assistant pair. A failed call leaves the log untouched.
    pub async fn send(&mut self, message: &str) -> Result<String> {
        let mut pending = self.conversation.messages().to_vec();
        pending.push(ChatMessage::user(message));

        let messages = prepare_messages(&pending, self.supports_system_role);
        let response = self.provider.chat(&messages).await?;

        self.conversation.push_user(message);
        self.conversation.push_assistant(response.clone());
        Ok(response)
    }
}

pub struct AgentLoop {
    registry: Arc<ActionRegistry>,
    max_turns: usize,
}

impl AgentLoop {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self {
            registry,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub async fn run(&self, question: &str, agent: &mut Agent) -> Result<RunReport> {
        self.run_with(question, agent, |_| {}).await
    }

    /// Drives the Thought/Action/Observation loop until a terminal state.
    ///
    /// `Err` is returned only when the model call itself fails; every other
    /// outcome is a [`Terminal`].
    pub async fn run_with<F>(
        &self,
        question: &str,
        agent: &mut Agent,
        mut on_event: F,
    ) -> Result<RunReport>
    where
        F: FnMut(TurnEvent<'_>) + Send,
    {
        let span = info_span!("react_run", run_id = %uuid::Uuid::new_v4());

        async move {
            let mut next_prompt = question.to_string();

            for turn in 1..=self.max_turns {
                let response = agent.send(&next_prompt).await.inspect_err(|e| {
                    error!(turn, "Model call failed: {}", e);
                })?;
                on_event(TurnEvent::Response {
                    turn,
                    text: &response,
                });

                match classify(&response, &self.registry) {
                    Step::Dispatch { kind, argument } => {
                        debug!(turn, action = %kind, %argument, "Dispatching action");
                        let observation = self.registry.invoke(kind, &argument).await;
                        on_event(TurnEvent::Observation {
                            turn,
                            action: kind,
                            argument: &argument,
                            observation: &observation,
                        });
                        next_prompt = format!("{OBSERVATION_PREFIX}{observation}");
                    }
                    Step::Finish(terminal) => {
                        match &terminal {
                            Terminal::Answer(_) => info!(turn, "Answer reached"),
                            Terminal::UnknownAction { name, .. } => {
                                warn!(turn, action = %name, "Unknown action")
                            }
                            _ => warn!(turn, "No action taken and no clear answer"),
                        }
                        return Ok(RunReport {
                            terminal,
                            turns: turn,
                        });
                    }
                }
            }

            warn!(max_turns = self.max_turns, "Max turns reached");
            Ok(RunReport {
                terminal: Terminal::MaxTurnsReached {
                    max_turns: self.max_turns,
                },
                turns: self.max_turns,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatMessage, Role, SearchClient};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned responses, repeating the last one once exhausted.
    struct ScriptedProvider {
        responses: Vec<String>,
        system_role: bool,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Arc<Self> {
            Self::build(responses, true)
        }

        fn build(responses: &[&str], system_role: bool) -> Arc<Self> {
            Arc::new(Self {
                responses: responses.iter().map(|r| r.to_string()).collect(),
                system_role,
                calls: Mutex::new(vec![]),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_prompt(&self, call: usize) -> ChatMessage {
            self.calls.lock().unwrap()[call].last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len().min(self.responses.len() - 1);
            calls.push(messages.to_vec());
            Ok(self.responses[idx].clone())
        }

        fn supports_system_role(&self) -> bool {
            self.system_role
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
            anyhow::bail!("503 Service Unavailable")
        }
    }

    #[derive(Default)]
    struct CountingSearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchClient for CountingSearch {
        fn name(&self) -> &str {
            "counting"
        }

        async fn search(&self, query: &str) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({
                "results": [{"title": format!("About {query}"), "url": "https://example.ac.uk"}]
            }))
        }
    }

    fn setup(max_turns: usize) -> (AgentLoop, Arc<CountingSearch>) {
        let search = Arc::new(CountingSearch::default());
        let registry = Arc::new(ActionRegistry::new(search.clone()));
        (AgentLoop::new(registry).with_max_turns(max_turns), search)
    }

    fn agent(provider: Arc<ScriptedProvider>) -> Agent {
        Agent::new(provider, Conversation::with_system("system prompt"))
    }

    #[tokio::test]
    async fn answer_on_first_turn() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::new(&["Answer: 42"]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("What is 6 * 7?", &mut agent).await.unwrap();

        assert_eq!(report.terminal, Terminal::Answer("42".into()));
        assert_eq!(report.answer(), Some("42"));
        assert_eq!(report.turns, 1);
        assert_eq!(agent.conversation().len(), 3);
    }

    #[tokio::test]
    async fn lookup_then_answer_takes_two_turns() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::new(&[
            "Thought: I need the collie's weight\nAction: average_dog_weight: Border Collie\nPAUSE",
            "Answer: 57 lbs",
        ]);
        let mut agent = agent(provider.clone());

        let report = agent_loop
            .run("2 dogs, 20 lbs and 37 lbs, total?", &mut agent)
            .await
            .unwrap();

        assert_eq!(report.terminal, Terminal::Answer("57 lbs".into()));
        assert_eq!(report.turns, 2);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            provider.last_prompt(1),
            ChatMessage::user("Observation: a Border Collies average weight is 37 lbs")
        );
    }

    #[tokio::test]
    async fn max_turns_stops_before_an_extra_call() {
        let (agent_loop, _) = setup(2);
        let provider = ScriptedProvider::new(&["Thought: keep going\nAction: calculate: 1 + 1\nPAUSE"]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("loop forever", &mut agent).await.unwrap();

        assert_eq!(report.terminal, Terminal::MaxTurnsReached { max_turns: 2 });
        assert_eq!(report.turns, 2);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn text_without_action_or_answer_stalls() {
        let (agent_loop, _) = setup(2);
        let provider = ScriptedProvider::new(&["Thought: I am not sure what to do"]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("?", &mut agent).await.unwrap();

        assert_eq!(
            report.terminal,
            Terminal::Stalled {
                response: "Thought: I am not sure what to do".into()
            }
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_action_halts_without_invoking_anything() {
        let (agent_loop, search) = setup(5);
        let provider = ScriptedProvider::new(&["Action: delete_files: /\nPAUSE"]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("clean up", &mut agent).await.unwrap();

        assert_eq!(
            report.terminal,
            Terminal::UnknownAction {
                name: "delete_files".into(),
                argument: "/".into()
            }
        );
        assert_eq!(report.turns, 1);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_result_is_fed_back() {
        let (agent_loop, search) = setup(3);
        let provider = ScriptedProvider::new(&[
            "Thought: look up entry requirements\nAction: search: site:*.ac.uk \"Computer Science\" entry requirements\nPAUSE",
            "Answer: Consider BBB-ABB courses.",
        ]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("Find CS options around BBB", &mut agent).await.unwrap();

        assert_eq!(report.answer(), Some("Consider BBB-ABB courses."));
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            provider.last_prompt(1).content,
            "Observation: 1. About site:*.ac.uk \"Computer Science\" entry requirements (https://example.ac.uk)"
        );
    }

    #[tokio::test]
    async fn calculation_errors_are_recoverable() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::new(&[
            "Action: calculate: 10 / 0",
            "Action: calculate: (48 + 40 + 32)",
            "Answer: Your UCAS total is 120.",
        ]);
        let mut agent = agent(provider.clone());

        let report = agent_loop.run("total?", &mut agent).await.unwrap();

        assert_eq!(report.answer(), Some("Your UCAS total is 120."));
        assert_eq!(report.turns, 3);
        assert_eq!(
            provider.last_prompt(1).content,
            "Observation: Error calculating: division by zero"
        );
        assert_eq!(provider.last_prompt(2).content, "Observation: 120.0");
    }

    #[tokio::test]
    async fn only_first_action_line_is_dispatched() {
        let (agent_loop, search) = setup(5);
        let provider = ScriptedProvider::new(&[
            "Action: calculate: 2 + 2\nAction: search: ignored",
            "Answer: 4",
        ]);
        let mut agent = agent(provider.clone());

        agent_loop.run("2 + 2?", &mut agent).await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.last_prompt(1).content, "Observation: 4.0");
    }

    #[tokio::test]
    async fn each_turn_appends_exactly_two_messages() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::new(&[
            "Action: calculate: 1",
            "Action: calculate: 2",
            "Answer: done",
        ]);
        let mut agent = agent(provider.clone());
        let before = agent.conversation().len();

        let report = agent_loop.run("go", &mut agent).await.unwrap();

        assert_eq!(agent.conversation().len(), before + 2 * report.turns);
        let roles: Vec<Role> = agent.conversation().messages()[before..]
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn system_prompt_folded_for_providers_without_system_role() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::build(&["Answer: ok"], false);
        let mut agent = agent(provider.clone());

        agent_loop.run("hello", &mut agent).await.unwrap();

        let sent = provider.calls.lock().unwrap()[0].clone();
        assert_eq!(sent, vec![ChatMessage::user("system prompt\n\nhello")]);
        assert_eq!(agent.conversation().messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn model_failure_is_returned_as_error() {
        let (agent_loop, _) = setup(5);
        let mut agent = Agent::new(Arc::new(FailingProvider), Conversation::new());

        let err = agent_loop.run("q", &mut agent).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn failed_call_leaves_conversation_untouched() {
        let mut agent = Agent::new(
            Arc::new(FailingProvider),
            Conversation::with_system("system prompt"),
        );

        assert!(agent.send("first").await.is_err());
        assert!(agent.send("second").await.is_err());

        let conversation = agent.into_conversation();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn pending_question_reaches_the_model() {
        let provider = ScriptedProvider::new(&["Answer: 4"]);
        let mut agent = agent(provider.clone());

        agent.send("What is 2 + 2?").await.unwrap();

        assert_eq!(provider.last_prompt(0), ChatMessage::user("What is 2 + 2?"));
        assert_eq!(provider.calls.lock().unwrap()[0].len(), 2);
        assert_eq!(agent.conversation().len(), 3);
    }

    #[tokio::test]
    async fn events_report_each_turn() {
        let (agent_loop, _) = setup(5);
        let provider = ScriptedProvider::new(&["Action: calculate: 3 * 3", "Answer: 9"]);
        let mut agent = agent(provider);
        let mut seen = vec![];

        agent_loop
            .run_with("3 * 3?", &mut agent, |event| match event {
                TurnEvent::Response { turn, .. } => seen.push(format!("response {turn}")),
                TurnEvent::Observation {
                    turn, observation, ..
                } => seen.push(format!("observation {turn}: {observation}")),
            })
            .await
            .unwrap();

        assert_eq!(seen, vec!["response 1", "observation 1: 9.0", "response 2"]);
    }

    #[test]
    fn classify_prefers_action_over_answer() {
        let registry = ActionRegistry::new(Arc::new(CountingSearch::default()));
        assert_eq!(
            classify("Answer: soon\nAction: calculate: 1 + 1", &registry),
            Step::Dispatch {
                kind: ActionKind::Calculate,
                argument: "1 + 1".into()
            }
        );
        assert_eq!(
            classify("Answer: 42", &registry),
            Step::Finish(Terminal::Answer("42".into()))
        );
    }
}
