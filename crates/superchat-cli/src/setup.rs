//! Interactive setup loop for configuring a session before chat starts.

use crate::display;
use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use superchat_core::models::ModelRegistry;
use superchat_core::parser::{ParsedInput, parse_input};
use superchat_core::resolver::{ResolveOutcome, resolve_model_from_input};
use superchat_core::session::SessionConfig;

/// Runs the setup REPL until the user starts a session or quits.
///
/// The passed-in config keeps whatever flags (`--flow`, `--voice`) and
/// partially-resolved models the command line produced. Returns `None`
/// when the user exits without starting.
pub fn setup_loop(mut config: SessionConfig, registry: &ModelRegistry) -> Result<Option<SessionConfig>> {
    display::print_banner();
    display::print_session_info(&config);

    println!("Setup Mode - Configure your chat session");
    println!("Commands: /model, /list, /start, /help, /exit");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nTerminating connection");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let _ = rl.add_history_entry(&line);

        match parse_input(&line) {
            ParsedInput::Empty => continue,
            ParsedInput::Message(_) => {
                println!();
                println!("Not in chat mode yet. Use commands to configure session.");
                println!();
            }
            ParsedInput::Command { name, args } => match name.as_str() {
                "exit" => {
                    println!();
                    println!("Terminating connection");
                    return Ok(None);
                }
                "start" => {
                    if !config.is_valid_for_start() {
                        println!();
                        println!("Please select at least one model first using /model");
                        println!();
                        continue;
                    }
                    return Ok(Some(config));
                }
                "help" => print_help(),
                "list" => print_model_list(registry),
                "model" => handle_model_command(&mut config, registry, &args),
                other => {
                    println!();
                    println!("Unknown command: /{other}");
                    println!("Type /help for available commands");
                    println!();
                }
            },
        }
    }
}

fn print_help() {
    println!();
    println!("Available commands:");
    println!("  /model <name> - Add a model to the chat");
    println!("  /list - Show available models");
    println!("  /start - Begin the chat session");
    println!("  /help - Show this help");
    println!("  /exit - Exit superchat");
    println!();
}

fn print_model_list(registry: &ModelRegistry) {
    println!();
    println!("Available models:");
    for model in registry.models() {
        println!(
            "  {} - {} (${}/${} per 1M tokens)",
            model.key,
            model.display_name(),
            model.input_cost,
            model.output_cost
        );
    }
    println!();
}

fn handle_model_command(config: &mut SessionConfig, registry: &ModelRegistry, args: &[String]) {
    if args.is_empty() {
        println!();
        println!("Usage: /model <name>");
        println!("Available models: {}", registry.keys().join(", "));
        println!();
        return;
    }

    let input = args.join(" ");
    match resolve_model_from_input(&input, registry) {
        ResolveOutcome::Selected(key) => {
            let display = registry
                .get(&key)
                .map(|m| m.display_name())
                .unwrap_or_else(|| key.clone());
            println!();
            if config.add_model(key) {
                println!("Added model: {display}");
                display::print_session_info(config);
            } else {
                println!("{}", format!("Model {display} already selected").yellow());
                println!();
            }
        }
        ResolveOutcome::Suggest { message, .. } => {
            println!();
            println!("{message}");
            println!();
        }
        ResolveOutcome::NotFound { message } => {
            println!();
            println!("{message}");
            println!("Available models: {}", registry.keys().join(", "));
            println!();
        }
    }
}
