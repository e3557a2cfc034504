//! Chat mode detection for message routing.

use superchat_core::staged::StagedFlow;

/// The four ways a plain message can be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// One agent, direct conversation.
    Single,
    /// Staged flow, 1:1 phase.
    StagedIndividual,
    /// Staged flow, shared debate phase.
    StagedTeam,
    /// Multi-agent without staging: every message runs one team round.
    DefaultTeam,
}

impl ChatMode {
    /// Whether this mode runs rounds against a shared team conversation.
    pub fn is_team(self) -> bool {
        matches!(self, Self::StagedTeam | Self::DefaultTeam)
    }
}

/// Picks the mode from the agent count and staged-flow state.
pub fn detect_chat_mode(multi_agent: bool, staged: Option<&StagedFlow>) -> ChatMode {
    if !multi_agent {
        return ChatMode::Single;
    }
    match staged {
        Some(flow) if flow.is_individual_phase() => ChatMode::StagedIndividual,
        Some(_) => ChatMode::StagedTeam,
        None => ChatMode::DefaultTeam,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_agent_wins_regardless_of_flow() {
        assert_eq!(detect_chat_mode(false, None), ChatMode::Single);
    }

    #[test]
    fn test_multi_agent_without_staging_is_default_team() {
        assert_eq!(detect_chat_mode(true, None), ChatMode::DefaultTeam);
    }

    #[test]
    fn test_staged_phases_map_to_modes() {
        let mut flow = StagedFlow::new(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(
            detect_chat_mode(true, Some(&flow)),
            ChatMode::StagedIndividual
        );

        // Drive the flow to the team phase.
        flow.promote_current_agent().unwrap();
        flow.promote_current_agent().unwrap();
        // No transcripts were recorded, so the transition is rejected and
        // the mode stays individual.
        assert!(flow.transition_to_team_phase().is_err());
        assert_eq!(
            detect_chat_mode(true, Some(&flow)),
            ChatMode::StagedIndividual
        );
    }

    #[test]
    fn test_team_mode_predicate() {
        assert!(ChatMode::StagedTeam.is_team());
        assert!(ChatMode::DefaultTeam.is_team());
        assert!(!ChatMode::Single.is_team());
        assert!(!ChatMode::StagedIndividual.is_team());
    }
}
