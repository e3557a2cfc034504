//! Input parsing for REPL commands and chat messages.

/// Classification of a raw line of user input.
///
/// Parsing is total: every string maps to exactly one variant and there is
/// no error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// Empty or whitespace-only input.
    Empty,
    /// A slash command with its whitespace-split arguments.
    Command { name: String, args: Vec<String> },
    /// A plain chat message (trimmed).
    Message(String),
}

/// Parses a raw line into a command, a chat message, or empty input.
///
/// A line whose first non-whitespace character is `/` is a command; the
/// command name is the token directly after the slash and the remaining
/// whitespace-separated tokens are its arguments.
pub fn parse_input(raw: &str) -> ParsedInput {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return ParsedInput::Empty;
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        let mut tokens = rest.split_whitespace();
        let name = tokens.next().unwrap_or("").to_string();
        let args = tokens.map(str::to_string).collect();
        return ParsedInput::Command { name, args };
    }

    ParsedInput::Message(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(parse_input(""), ParsedInput::Empty);
        assert_eq!(parse_input("   \t  "), ParsedInput::Empty);
        assert_eq!(parse_input("\n"), ParsedInput::Empty);
    }

    #[test]
    fn test_command_without_args() {
        assert_eq!(
            parse_input("/exit"),
            ParsedInput::Command {
                name: "exit".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_command_with_args() {
        assert_eq!(
            parse_input("  /model gemini flash  "),
            ParsedInput::Command {
                name: "model".to_string(),
                args: vec!["gemini".to_string(), "flash".to_string()]
            }
        );
    }

    #[test]
    fn test_bare_slash_is_a_command_with_empty_name() {
        assert_eq!(
            parse_input("/"),
            ParsedInput::Command {
                name: String::new(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_message_is_trimmed() {
        assert_eq!(
            parse_input("  what is entropy?  "),
            ParsedInput::Message("what is entropy?".to_string())
        );
    }

    #[test]
    fn test_slash_inside_message_is_not_a_command() {
        assert_eq!(
            parse_input("tcp/ip history"),
            ParsedInput::Message("tcp/ip history".to_string())
        );
    }
}
