//! Slash command handling for the chat loop.

use colored::Colorize;
use superchat_core::staged::AdvanceOutcome;

use crate::chat::ChatSession;
use crate::display;
use crate::router::ChatMode;

/// What the chat loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

impl ChatSession {
    /// Dispatches one slash command. Unknown commands are reported and
    /// leave all state unchanged.
    pub(crate) async fn handle_command(&mut self, name: &str, _args: &[String]) -> CommandOutcome {
        match name {
            "exit" => {
                println!();
                display::print_exit_summary(&self.config.snapshot(), &self.models);
                println!("Terminating connection");
                CommandOutcome::Exit
            }
            "stats" => {
                println!();
                display::print_stats(&self.config.snapshot(), &self.models);
                println!();
                CommandOutcome::Continue
            }
            "promote" => {
                self.handle_advance(true).await;
                CommandOutcome::Continue
            }
            "boot" => {
                self.handle_advance(false).await;
                CommandOutcome::Continue
            }
            "restart" => {
                self.handle_restart();
                CommandOutcome::Continue
            }
            other => {
                println!();
                println!("Unknown command: /{other}");
                println!();
                CommandOutcome::Continue
            }
        }
    }

    /// `/promote` and `/boot`: advance past the current 1:1 agent.
    async fn handle_advance(&mut self, promote: bool) {
        let command = if promote { "/promote" } else { "/boot" };
        if self.chat_mode() != ChatMode::StagedIndividual {
            println!();
            println!("{command} command is only available in staged flow individual phase");
            println!();
            return;
        }

        let verb = if promote { "Promoted" } else { "Booted" };
        let (replay, transition) = {
            let Some(flow) = self.staged.as_mut() else {
                return;
            };
            let previous = flow
                .current_agent()
                .map(|(_, name)| name.to_string())
                .unwrap_or_default();

            let result = if promote {
                flow.promote_current_agent()
            } else {
                flow.boot_current_agent()
            };

            println!();
            match result {
                Err(err) => {
                    println!("{err}");
                    println!();
                    (false, false)
                }
                Ok(AdvanceOutcome::NextAgent {
                    next_index,
                    replay_original,
                    ..
                }) => {
                    let next = flow.display_name(next_index).unwrap_or("?");
                    println!("{verb} {previous}. Next: {next}");
                    println!("Status: {}", flow.status_display());
                    println!();
                    (replay_original, false)
                }
                Ok(AdvanceOutcome::PhaseComplete { promoted_count, .. }) => {
                    if promoted_count == 0 {
                        println!(
                            "{verb} {previous}. No agents promoted - cannot start team debate."
                        );
                        println!();
                        (false, false)
                    } else {
                        println!(
                            "{verb} {previous}. Ready for team debate with {promoted_count} promoted agent(s)."
                        );
                        (false, true)
                    }
                }
            }
        };

        if replay {
            self.replay_original_prompt().await;
        }
        if transition {
            self.transition_to_team().await;
        }
    }

    /// Re-sends the captured original prompt to the next agent so every
    /// agent answers the same opening question.
    async fn replay_original_prompt(&mut self) {
        let Some(prompt) = self
            .staged
            .as_ref()
            .and_then(|flow| flow.original_prompt())
            .map(str::to_string)
        else {
            return;
        };

        println!("{}", format!(">> {prompt}").bright_black());
        println!();
        self.staged_individual_round(&prompt).await;
    }

    /// Attempts the individual-to-team transition and, on success, builds
    /// the debate team over the promoted agents seeded with the assembled
    /// context.
    async fn transition_to_team(&mut self) {
        let Some(flow) = self.staged.as_mut() else {
            return;
        };

        match flow.transition_to_team_phase() {
            Ok(transition) => {
                let mut team = self.pool.build_team(&transition.promoted_indices);
                team.seed_context(transition.assembled_context);
                let count = transition.promoted_indices.len();
                self.team = Some(team);

                println!("Transitioned to team debate phase with {count} agents");
                println!("Status: Team debate phase");
                println!();
            }
            Err(err) => {
                println!("{err}");
                println!();
            }
        }
    }

    /// `/restart`: clear the current agent's transcript and rolling
    /// history so the 1:1 exchange can be redone.
    fn handle_restart(&mut self) {
        if self.chat_mode() != ChatMode::StagedIndividual {
            println!();
            println!("/restart command is only available in staged flow individual phase");
            println!();
            return;
        }

        let result = {
            let Some(flow) = self.staged.as_mut() else {
                return;
            };
            flow.restart_current_agent()
        };

        println!();
        match result {
            Ok((index, name)) => {
                self.pool.clear_agent_history(index);
                println!("Restarted conversation with {name}. Transcript cleared.");
            }
            Err(err) => println!("{err}"),
        }
        println!();
    }
}
