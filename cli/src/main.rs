use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use rea_core::agent::{
    ActionRegistry, Agent, AgentLoop, ContextBuilder, Conversation, RunReport, Terminal,
    TurnEvent,
};
use rea_core::config::{self, Config};
use rea_core::{evaluate, providers};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
mod chat;
mod onboard;

#[derive(Parser)]
#[command(name = "rea")]
#[command(about = "rea - a Thought/Action/Observation/Answer agent", long_about = None)]
struct Cli {
    /// Print every turn, action and observation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    /// Ask a single question
    Ask {
        question: String,
        #[arg(long)]
        max_turns: Option<usize>,
        /// Load and save the conversation in this JSON file
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Interactive session sharing one conversation
    Chat {
        #[arg(long)]
        max_turns: Option<usize>,
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Evaluate an arithmetic expression with the calculate action's evaluator
    Calc { expression: String },
}

struct Session {
    agent_loop: AgentLoop,
    agent: Agent,
    history: Option<PathBuf>,
}

impl Session {
    fn build(config: &Config, max_turns: Option<usize>, history: Option<PathBuf>) -> Result<Self> {
        let provider = providers::create_provider(config)?;
        let search = providers::create_search(config)?;
        let registry = Arc::new(ActionRegistry::new(search));

        let system_prompt = ContextBuilder::new()
            .with_preamble(config.preamble())
            .build_system_prompt(&registry);
        let history = history.or_else(|| config.history_file.clone());
        let conversation = match &history {
            Some(path) => Conversation::load_or_new(path, &system_prompt)?,
            None => Conversation::with_system(&system_prompt),
        };

        let mut agent = Agent::new(provider, conversation);
        if let Some(supported) = config.supports_system_role {
            agent = agent.with_system_role_support(supported);
        }

        let agent_loop =
            AgentLoop::new(registry).with_max_turns(max_turns.unwrap_or(config.max_turns));

        Ok(Self {
            agent_loop,
            agent,
            history,
        })
    }

    async fn ask(&mut self, question: &str, verbose: bool) -> Result<RunReport> {
        let report = self
            .agent_loop
            .run_with(question, &mut self.agent, move |event| {
                if verbose {
                    print_event(event);
                }
            })
            .await?;

        if let Some(path) = &self.history {
            self.agent.conversation().save(path)?;
        }

        Ok(report)
    }
}

fn print_event(event: TurnEvent<'_>) {
    match event {
        TurnEvent::Response { turn, text } => {
            println!("{}", style(format!("--- Turn {} ---", turn)).dim());
            println!("{}", text);
        }
        TurnEvent::Observation {
            action,
            argument,
            observation,
            ..
        } => {
            println!("{} {}('{}')", style("Action:").cyan(), action, argument);
            println!("{} {}\n", style("Observation:").cyan(), observation);
        }
    }
}

fn print_report(report: &RunReport) {
    match &report.terminal {
        Terminal::Answer(answer) => println!("{}", answer),
        Terminal::Stalled { response } => {
            eprintln!(
                "{} No action taken and no clear answer. Stopping.",
                style("!").yellow()
            );
            eprintln!("{}", style(response).dim());
        }
        Terminal::UnknownAction { .. } => {
            eprintln!("{} {}", style("✗").red(), report.terminal);
        }
        Terminal::MaxTurnsReached { .. } => {
            eprintln!("{} {}", style("!").yellow(), report.terminal);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat {
                max_turns: None,
                history: None,
            }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("{} Onboarding failed: {}", style("✗").red(), e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
            println!(
                "{} Saved configuration to {}",
                style("✓").green(),
                config::get_config_path().display()
            );
        }
        Commands::Calc { expression } => match evaluate(&expression) {
            Ok(value) => println!("{:?}", value),
            Err(e) => anyhow::bail!("Error calculating: {}", e),
        },
        Commands::Ask {
            question,
            max_turns,
            history,
        } => {
            let config = config::load_config()?;
            let mut session = Session::build(&config, max_turns, history)?;

            if cli.verbose {
                println!("Question: {}\n", question);
            }
            let report = session.ask(&question, cli.verbose).await?;
            print_report(&report);
        }
        Commands::Chat { max_turns, history } => {
            let config = config::load_config()?;
            let mut session = Session::build(&config, max_turns, history)?;

            println!("{}", style("rea").bold());
            println!("Ask a question (say goodbye or press Ctrl+D to exit):\n");
            use std::io::{self, BufRead};
            let stdin = io::stdin();

            loop {
                print!("> ");
                let _ = io::stdout().flush();

                let mut input = String::new();
                match stdin.lock().read_line(&mut input) {
                    Ok(0) | Err(_) => {
                        println!("\nGoodbye!");
                        break;
                    }
                    Ok(_) => {
                        let input = input.trim();
                        if input.is_empty() {
                            continue;
                        }
                        if chat::is_farewell(input) {
                            println!("Goodbye!");
                            break;
                        }
                        if !chat::is_question(input) {
                            println!(
                                "{} Phrase that as a question, e.g. \"How do I apply?\"\n",
                                style("?").yellow()
                            );
                            continue;
                        }

                        match session.ask(input, cli.verbose).await {
                            Ok(report) => print_report(&report),
                            Err(e) => eprintln!("{} Error: {}", style("✗").red(), e),
                        }

                        println!();
                    }
                }
            }
        }
    }

    Ok(())
}
