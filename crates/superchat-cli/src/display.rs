//! Terminal output: banner, session info, response formatting, stats.

use colored::Colorize;
use superchat_core::models::ModelConfig;
use superchat_core::session::SessionConfig;
use superchat_core::stats::{SessionStats, estimate_cost};

const BANNER: &str = r#"
 ______   __  __   ______  ______   ______   ______   __  __   ______   ______
/\  ___\ /\ \/\ \ /\  == \/\  ___\ /\  == \ /\  ___\ /\ \_\ \ /\  __ \ /\__  _\
\ \___  \\ \ \_\ \\ \  _-/\ \  __\ \ \  __< \ \ \____\ \  __ \\ \  __ \\/_/\ \/
 \/\_____\\ \_____\\ \_\   \ \_____\\ \_\ \_\\ \_____\\ \_\ \_\\ \_\ \_\  \ \_\
  \/_____/ \/_____/ \/_/    \/_____/ \/_/ /_/ \/_____/ \/_/\/_/ \/_/\/_/   \/_/
"#;

/// Prints the ASCII art banner.
pub fn print_banner() {
    println!("{}", BANNER.bright_magenta());
}

/// Prints the current session configuration.
pub fn print_session_info(config: &SessionConfig) {
    println!("Session Configuration:");
    if config.models().is_empty() {
        println!("  Models: None selected");
    } else {
        println!("  Models: {}", config.models().join(", "));
    }
    println!();
}

/// Formats one agent response block: `[symbol] label:` header followed by
/// the reply with every line quoted.
pub fn format_agent_response(symbol: &str, label: &str, text: &str) -> String {
    let mut out = format!("[{symbol}] {label}:\n");
    for line in text.lines() {
        out.push_str("> ");
        out.push_str(line);
        out.push('\n');
    }
    if text.is_empty() {
        out.push_str(">\n");
    }
    out
}

/// Prints a formatted agent response: header in magenta, body in blue.
pub fn print_agent_response(symbol: &str, label: &str, text: &str) {
    let block = format_agent_response(symbol, label, text);
    let mut lines = block.lines();
    if let Some(header) = lines.next() {
        println!("{}", header.bright_magenta());
    }
    for line in lines {
        println!("{}", line.bright_blue());
    }
    println!();
}

/// Prints the full statistics block for `/stats`.
pub fn print_stats(stats: &SessionStats, models: &[ModelConfig]) {
    println!("Session Statistics:");
    println!("  Time elapsed: {}", stats.duration);
    println!("  Conversation rounds: {}", stats.conversation_rounds);
    println!();
    println!("Token Usage:");
    println!("  Input tokens:  {}", format_count(stats.total_input_tokens));
    println!("  Output tokens: {}", format_count(stats.total_output_tokens));
    println!("  Total tokens:  {}", format_count(stats.total_tokens));
    println!();
    println!("Estimated Costs:");

    let (total, breakdown) = estimate_cost(stats, models);
    for (label, cost) in &breakdown {
        println!("  {label}: ${cost:.6}");
    }
    println!("  Total cost: ${total:.6}");
}

/// Prints the brief summary shown on `/exit`.
pub fn print_exit_summary(stats: &SessionStats, models: &[ModelConfig]) {
    println!("Session Summary:");
    println!("  Time elapsed: {}", stats.duration);
    println!("  Conversation rounds: {}", stats.conversation_rounds);
    println!("  Total tokens: {}", format_count(stats.total_tokens));

    let (total, _) = estimate_cost(stats, models);
    if total > 0.0 {
        println!("  Total cost: ${total:.6}");
    }
    println!();
}

/// Thousands-separated token count.
fn format_count(value: u64) -> String {
    let digits: Vec<char> = value.to_string().chars().rev().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out.chars().rev().collect()
}
