//! The interactive chat loop.
//!
//! `ChatSession` owns everything a running conversation needs: the session
//! config and counters, the agent pool, and (depending on mode) the staged
//! flow and the debate team. The loop is strictly sequential: it blocks on
//! user input, and every model call is awaited to completion before the
//! next one starts.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use superchat_core::models::ModelConfig;
use superchat_core::parser::{ParsedInput, parse_input};
use superchat_core::session::SessionConfig;
use superchat_core::staged::{IndividualOutcome, StagedFlow};
use superchat_core::stats::UsageRecord;
use superchat_interaction::error::AgentError;
use superchat_interaction::pool::AgentPool;
use superchat_interaction::prompts::DISCUSSION_PROMPT;
use superchat_interaction::team::Team;

use crate::commands::CommandOutcome;
use crate::display;
use crate::router::{ChatMode, detect_chat_mode};

/// CLI helper for rustyline that provides completion, highlighting, and
/// hints for the chat slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: ["/promote", "/boot", "/restart", "/stats", "/exit"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A running chat session.
pub struct ChatSession {
    pub(crate) config: SessionConfig,
    pub(crate) models: Vec<ModelConfig>,
    pub(crate) pool: AgentPool,
    pub(crate) staged: Option<StagedFlow>,
    pub(crate) team: Option<Team>,
}

impl ChatSession {
    /// Wires up the session from its resolved models and agent pool.
    ///
    /// Staging only applies to multi-agent sessions; a default-flow
    /// multi-agent session gets its full team built immediately, while a
    /// staged one builds the team at the phase transition.
    pub fn new(config: SessionConfig, models: Vec<ModelConfig>, pool: AgentPool) -> Self {
        let multi_agent = models.len() > 1;
        let staged = (multi_agent
            && config.flow_mode() == superchat_core::session::FlowMode::Staged)
            .then(|| StagedFlow::new(pool.display_names()));
        let team = (multi_agent && staged.is_none()).then(|| {
            let all: Vec<usize> = (0..pool.len()).collect();
            pool.build_team(&all)
        });

        Self {
            config,
            models,
            pool,
            staged,
            team,
        }
    }

    pub(crate) fn is_multi_agent(&self) -> bool {
        self.models.len() > 1
    }

    pub(crate) fn chat_mode(&self) -> ChatMode {
        detect_chat_mode(self.is_multi_agent(), self.staged.as_ref())
    }

    /// Runs the chat REPL until `/exit`, Ctrl-C, or end of input.
    pub async fn run(&mut self) -> Result<()> {
        self.print_session_header();

        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper::new()));

        loop {
            let line = match rl.readline(">> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("\nTerminating connection");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {err:?}").red());
                    break;
                }
            };

            let _ = rl.add_history_entry(&line);

            match parse_input(&line) {
                ParsedInput::Empty => {
                    if self.chat_mode().is_team() {
                        println!();
                        self.team_round(DISCUSSION_PROMPT).await;
                    }
                }
                ParsedInput::Command { name, args } => {
                    match self.handle_command(&name, &args).await {
                        CommandOutcome::Exit => break,
                        CommandOutcome::Continue => {}
                    }
                }
                ParsedInput::Message(text) => {
                    println!();
                    self.route_message(&text).await;
                }
            }
        }

        // Reached on /exit, Ctrl-C, and end of input alike.
        self.config.stop();
        Ok(())
    }

    fn print_session_header(&self) {
        if self.is_multi_agent() {
            println!("Starting multi-agent debate with:");
            for agent in self.pool.agents() {
                println!("  {} [{}]", agent.symbol(), agent.label());
            }
        } else if let Some(agent) = self.pool.agent(0) {
            println!("Starting chat with [{}]", agent.label());
        }
        println!();

        if let Some(flow) = &self.staged {
            println!("Status: {}", flow.status_display());
            println!();
        }
    }

    /// Routes a plain message by the current chat mode.
    pub(crate) async fn route_message(&mut self, text: &str) {
        match self.chat_mode() {
            ChatMode::Single => self.single_round(text).await,
            ChatMode::StagedIndividual => self.staged_individual_round(text).await,
            ChatMode::StagedTeam | ChatMode::DefaultTeam => self.team_round(text).await,
        }
    }

    async fn single_round(&mut self, text: &str) {
        let Some((symbol, label)) = self
            .pool
            .agent(0)
            .map(|a| (a.symbol().to_string(), a.label().to_string()))
        else {
            return;
        };

        match self.pool.send(0, text).await {
            Ok((response, usage)) => {
                self.config.record_usage(&usage);
                display::print_agent_response(&symbol, &label, &response);
            }
            Err(err) => report_agent_error(&err),
        }
    }

    pub(crate) async fn staged_individual_round(&mut self, text: &str) {
        let Some(flow) = self.staged.as_mut() else {
            return;
        };

        let first_message = flow.original_prompt().is_none();
        let identity = flow
            .current_agent()
            .map(|(index, _)| index)
            .and_then(|index| self.pool.agent(index))
            .map(|a| (a.symbol().to_string(), a.label().to_string()));

        match flow.handle_individual_message(&mut self.pool, text).await {
            Ok(IndividualOutcome::Accepted {
                response, usage, ..
            }) => {
                if first_message {
                    println!("Status: {}", flow.status_display());
                    println!();
                }
                self.config.record_usage(&usage);
                if let Some((symbol, label)) = identity {
                    display::print_agent_response(&symbol, &label, &response);
                }
            }
            Ok(IndividualOutcome::PhaseExhausted) => {
                println!("No more agents for individual conversations. Use /promote to advance.");
                println!();
            }
            Err(err) => report_agent_error(&err),
        }
    }

    /// Runs one team round: each member replies once, in setup order, to
    /// the shared conversation plus `task`. Usage is accumulated across
    /// the round and recorded once.
    pub(crate) async fn team_round(&mut self, task: &str) {
        let Some(team) = self.team.as_mut() else {
            println!("Team conversation is not ready yet.");
            println!();
            return;
        };

        team.push_user_message(task);

        let mut round_usage = UsageRecord::default();
        for pos in 0..team.len() {
            let (symbol, label) = {
                let member = &team.members()[pos];
                (member.symbol.clone(), member.label.clone())
            };
            match team.reply(pos).await {
                Ok((response, usage)) => {
                    round_usage.absorb(&usage);
                    display::print_agent_response(&symbol, &label, &response);
                }
                Err(err) => report_agent_error(&err),
            }
        }

        if !round_usage.is_empty() {
            self.config.record_usage(&round_usage);
        }
    }
}

/// Prints a model-call failure without ending the session. Quota
/// exhaustion gets a remediation hint; everything else is shown as-is.
pub(crate) fn report_agent_error(err: &AgentError) {
    println!("{}", format!("Error: {err}").red());
    if err.is_quota_exhausted() {
        println!("Add credits at https://openrouter.ai/credits and try again.");
    }
    println!();
}
