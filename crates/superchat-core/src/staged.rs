//! Staged chat flow: individual 1:1 conversations followed by a team debate.
//!
//! The flow walks the configured agents in index order. The user talks to
//! one agent at a time, then either promotes it (its transcript joins the
//! team-debate context) or boots it (its transcript is dropped). Once every
//! agent has been processed and at least two were promoted, the flow
//! transitions into the team phase with a single assembled context blob.
//!
//! Every expected precondition violation is a typed [`StagedFlowError`]
//! value; nothing in this module panics on user-driven state.

use crate::naming::display_symbol;
use crate::stats::UsageRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Marker line separating the assembled 1:1 transcripts from the debate.
const TEAM_DEBATE_MARKER: &str = "--- Begin Team Debate ---";

/// Capability to deliver a message to one agent and get its reply.
///
/// Implemented by the agent pool; tests supply scripted mocks.
#[async_trait]
pub trait AgentChannel {
    type Error: Send;

    /// Sends `message` to the agent at `agent_index` and returns the reply
    /// text together with the token usage of the call.
    async fn send(
        &mut self,
        agent_index: usize,
        message: &str,
    ) -> Result<(String, UsageRecord), Self::Error>;
}

/// Current phase of the staged flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Individual,
    Team,
}

/// One user/agent exchange captured during the individual phase.
///
/// Entries are immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub user_message: String,
    pub agent_response: String,
}

/// Per-agent transcript accumulated during the individual phase.
#[derive(Debug, Clone)]
pub struct AgentTranscript {
    pub display_name: String,
    pub entries: Vec<TranscriptEntry>,
    pub promoted: bool,
}

/// Result of a successful individual-phase message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndividualOutcome {
    /// The message was delivered and the exchange recorded.
    Accepted {
        agent_index: usize,
        response: String,
        usage: UsageRecord,
    },
    /// Every agent has already been promoted or booted; nothing was sent.
    PhaseExhausted,
}

/// Result of advancing past the current agent via promote or boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// There is a next agent to talk to. When `replay_original` is set the
    /// caller should re-send the captured original prompt to it.
    NextAgent {
        previous_index: usize,
        next_index: usize,
        replay_original: bool,
    },
    /// The queue is empty; the caller decides whether a transition is
    /// viable from the promoted count.
    PhaseComplete {
        previous_index: usize,
        promoted_count: usize,
    },
}

/// Expected precondition violations of staged-flow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagedFlowError {
    #[error("No current agent to {action}")]
    NoCurrentAgent { action: &'static str },

    #[error("Already in team phase")]
    AlreadyInTeamPhase,

    #[error("Cannot transition to team phase - {remaining} agent(s) still need promotion")]
    AgentsRemaining { remaining: usize },

    #[error("Cannot start team debate - no agents were promoted")]
    NoPromotedAgents,

    #[error("Cannot start team debate - need at least 2 promoted agents, got {promoted}")]
    InsufficientPromotions { promoted: usize },
}

/// Successful transition into the team phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamTransition {
    /// The assembled context to seed the shared conversation with.
    pub assembled_context: String,
    /// Promoted agent indices in ascending setup order.
    pub promoted_indices: Vec<usize>,
}

/// The staged-flow state machine.
#[derive(Debug, Clone)]
pub struct StagedFlow {
    phase: Phase,
    current_agent_index: usize,
    display_names: Vec<String>,
    original_prompt: Option<String>,
    transcripts: BTreeMap<usize, AgentTranscript>,
}

impl StagedFlow {
    /// Creates a flow over the configured agents, identified by their
    /// display names in setup order.
    pub fn new(display_names: Vec<String>) -> Self {
        Self {
            phase: Phase::Individual,
            current_agent_index: 0,
            display_names,
            original_prompt: None,
            transcripts: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_individual_phase(&self) -> bool {
        self.phase == Phase::Individual
    }

    pub fn is_team_phase(&self) -> bool {
        self.phase == Phase::Team
    }

    pub fn agent_count(&self) -> usize {
        self.display_names.len()
    }

    /// Whether any agent still awaits its 1:1 conversation.
    pub fn has_more_agents(&self) -> bool {
        self.current_agent_index < self.display_names.len()
    }

    /// The original initiating prompt, once captured.
    pub fn original_prompt(&self) -> Option<&str> {
        self.original_prompt.as_deref()
    }

    /// Display name of the agent at `index`, if configured.
    pub fn display_name(&self, index: usize) -> Option<&str> {
        self.display_names.get(index).map(String::as_str)
    }

    /// Index and display name of the current 1:1 agent, if any remains.
    pub fn current_agent(&self) -> Option<(usize, &str)> {
        self.display_names
            .get(self.current_agent_index)
            .map(|name| (self.current_agent_index, name.as_str()))
    }

    /// One-line status shown above the prompt.
    pub fn status_display(&self) -> String {
        match self.phase {
            Phase::Individual => {
                if self.original_prompt.is_none() && self.current_agent_index == 0 {
                    "Input initial discussion question:".to_string()
                } else if let Some((index, name)) = self.current_agent() {
                    format!("1:1 with {} [{}]", name, display_symbol(index))
                } else {
                    "1:1 phase complete - ready for team debate".to_string()
                }
            }
            Phase::Team => "Team debate phase".to_string(),
        }
    }

    /// Handles one user message in the individual phase.
    ///
    /// The very first message is captured verbatim as the immutable
    /// original prompt (before delegation, so a failed send still fixes
    /// it). On a successful send the exchange is appended to the current
    /// agent's transcript, creating it lazily.
    ///
    /// # Errors
    ///
    /// Propagates the channel's error unchanged; the transcript is not
    /// touched in that case.
    pub async fn handle_individual_message<C>(
        &mut self,
        channel: &mut C,
        text: &str,
    ) -> Result<IndividualOutcome, C::Error>
    where
        C: AgentChannel + Send,
    {
        let Some((index, name)) = self.current_agent() else {
            return Ok(IndividualOutcome::PhaseExhausted);
        };
        let name = name.to_string();

        if self.original_prompt.is_none() {
            self.original_prompt = Some(text.to_string());
        }

        let (response, usage) = channel.send(index, text).await?;

        let transcript = self
            .transcripts
            .entry(index)
            .or_insert_with(|| AgentTranscript {
                display_name: name,
                entries: Vec::new(),
                promoted: false,
            });
        transcript.entries.push(TranscriptEntry {
            user_message: text.to_string(),
            agent_response: response.clone(),
        });

        tracing::debug!(agent = index, "recorded individual exchange");

        Ok(IndividualOutcome::Accepted {
            agent_index: index,
            response,
            usage,
        })
    }

    /// Promotes the current agent's transcript into the team context and
    /// advances to the next agent.
    pub fn promote_current_agent(&mut self) -> Result<AdvanceOutcome, StagedFlowError> {
        self.advance(true, "promote")
    }

    /// Boots the current agent (its transcript stays out of the team
    /// context) and advances to the next agent.
    pub fn boot_current_agent(&mut self) -> Result<AdvanceOutcome, StagedFlowError> {
        self.advance(false, "boot")
    }

    fn advance(
        &mut self,
        promote: bool,
        action: &'static str,
    ) -> Result<AdvanceOutcome, StagedFlowError> {
        if !self.has_more_agents() || self.phase == Phase::Team {
            return Err(StagedFlowError::NoCurrentAgent { action });
        }

        let previous_index = self.current_agent_index;
        if let Some(transcript) = self.transcripts.get_mut(&previous_index) {
            transcript.promoted = promote;
        }
        self.current_agent_index += 1;

        if self.has_more_agents() {
            Ok(AdvanceOutcome::NextAgent {
                previous_index,
                next_index: self.current_agent_index,
                replay_original: self.original_prompt.is_some(),
            })
        } else {
            Ok(AdvanceOutcome::PhaseComplete {
                previous_index,
                promoted_count: self.promoted_count(),
            })
        }
    }

    /// Clears the current agent's transcript and promoted flag so the 1:1
    /// exchange can be redone. The agent index does not move.
    pub fn restart_current_agent(&mut self) -> Result<(usize, String), StagedFlowError> {
        if self.phase == Phase::Team {
            return Err(StagedFlowError::NoCurrentAgent { action: "restart" });
        }
        let Some((index, name)) = self.current_agent() else {
            return Err(StagedFlowError::NoCurrentAgent { action: "restart" });
        };
        let name = name.to_string();

        if let Some(transcript) = self.transcripts.get_mut(&index) {
            transcript.entries.clear();
            transcript.promoted = false;
        }
        Ok((index, name))
    }

    fn promoted_count(&self) -> usize {
        self.transcripts.values().filter(|t| t.promoted).count()
    }

    /// Promoted agent indices in ascending setup order.
    pub fn promoted_indices(&self) -> Vec<usize> {
        self.transcripts
            .iter()
            .filter(|(_, t)| t.promoted)
            .map(|(index, _)| *index)
            .collect()
    }

    /// Builds the team-debate context: the original prompt, then one
    /// section per promoted agent in ascending setup order, closed by the
    /// debate marker. Booted agents and promoted agents without exchanges
    /// are excluded.
    pub fn assemble_comprehensive_context(&self) -> String {
        let Some(prompt) = &self.original_prompt else {
            return String::new();
        };

        let mut parts = vec![format!("Original Prompt:\n{prompt}\n")];

        for transcript in self.transcripts.values() {
            if !transcript.promoted || transcript.entries.is_empty() {
                continue;
            }
            parts.push(format!(
                "\n--- {} Conversation ---",
                transcript.display_name
            ));
            for entry in &transcript.entries {
                parts.push(format!("\nUser: {}", entry.user_message));
                parts.push(format!(
                    "{}: {}",
                    transcript.display_name, entry.agent_response
                ));
            }
        }

        parts.push(format!("\n{TEAM_DEBATE_MARKER}"));
        parts.join("\n")
    }

    /// Transitions from the individual phase into the team debate phase.
    ///
    /// # Errors
    ///
    /// Fails without any state change when already in the team phase, when
    /// agents still await promotion or boot, or when fewer than two agents
    /// were promoted.
    pub fn transition_to_team_phase(&mut self) -> Result<TeamTransition, StagedFlowError> {
        if self.phase == Phase::Team {
            return Err(StagedFlowError::AlreadyInTeamPhase);
        }
        if self.has_more_agents() {
            return Err(StagedFlowError::AgentsRemaining {
                remaining: self.display_names.len() - self.current_agent_index,
            });
        }

        let promoted_indices = self.promoted_indices();
        if promoted_indices.is_empty() {
            return Err(StagedFlowError::NoPromotedAgents);
        }
        if promoted_indices.len() < 2 {
            return Err(StagedFlowError::InsufficientPromotions {
                promoted: promoted_indices.len(),
            });
        }

        let assembled_context = self.assemble_comprehensive_context();
        self.phase = Phase::Team;

        tracing::info!(
            promoted = promoted_indices.len(),
            context_len = assembled_context.len(),
            "transitioned to team debate phase"
        );

        Ok(TeamTransition {
            assembled_context,
            promoted_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted channel that answers every send with a canned reply.
    struct MockChannel {
        sent: Vec<(usize, String)>,
        fail_next: bool,
    }

    impl MockChannel {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail_next: false,
            }
        }
    }

    #[async_trait]
    impl AgentChannel for MockChannel {
        type Error = String;

        async fn send(
            &mut self,
            agent_index: usize,
            message: &str,
        ) -> Result<(String, UsageRecord), Self::Error> {
            if self.fail_next {
                self.fail_next = false;
                return Err("boom".to_string());
            }
            self.sent.push((agent_index, message.to_string()));
            let reply = format!("reply-{agent_index}-to({message})");
            Ok((reply, UsageRecord::new(10, 5)))
        }
    }

    fn flow(n: usize) -> StagedFlow {
        StagedFlow::new((0..n).map(|i| format!("Model {i}")).collect())
    }

    async fn say(flow: &mut StagedFlow, channel: &mut MockChannel, text: &str) {
        let outcome = flow.handle_individual_message(channel, text).await.unwrap();
        assert!(matches!(outcome, IndividualOutcome::Accepted { .. }));
    }

    #[tokio::test]
    async fn test_first_message_fixes_original_prompt() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "What is entropy?").await;
        assert_eq!(flow.original_prompt(), Some("What is entropy?"));

        say(&mut flow, &mut channel, "Explain further").await;
        assert_eq!(flow.original_prompt(), Some("What is entropy?"));
    }

    #[tokio::test]
    async fn test_failed_send_still_fixes_prompt_and_skips_transcript() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();
        channel.fail_next = true;

        let err = flow
            .handle_individual_message(&mut channel, "first")
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(flow.original_prompt(), Some("first"));
        // Nothing recorded for the failed round.
        assert!(!flow.assemble_comprehensive_context().contains("Conversation ---"));
    }

    #[tokio::test]
    async fn test_three_agent_promote_all_scenario() {
        let mut flow = flow(3);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "What is entropy?").await;
        let outcome = flow.promote_current_agent().unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::NextAgent {
                previous_index: 0,
                next_index: 1,
                replay_original: true
            }
        );

        // Auto-replay of the original prompt, plus a follow-up.
        say(&mut flow, &mut channel, "What is entropy?").await;
        say(&mut flow, &mut channel, "Explain further").await;
        assert!(matches!(
            flow.promote_current_agent().unwrap(),
            AdvanceOutcome::NextAgent { next_index: 2, .. }
        ));

        say(&mut flow, &mut channel, "What is entropy?").await;
        assert_eq!(
            flow.promote_current_agent().unwrap(),
            AdvanceOutcome::PhaseComplete {
                previous_index: 2,
                promoted_count: 3
            }
        );

        let transition = flow.transition_to_team_phase().unwrap();
        assert_eq!(transition.promoted_indices, vec![0, 1, 2]);
        assert!(flow.is_team_phase());

        let targets: Vec<usize> = channel.sent.iter().map(|(i, _)| *i).collect();
        assert_eq!(targets, vec![0, 1, 1, 2]);

        let context = transition.assembled_context;
        let a = context.find("--- Model 0 Conversation ---").unwrap();
        let b = context.find("--- Model 1 Conversation ---").unwrap();
        let c = context.find("--- Model 2 Conversation ---").unwrap();
        assert!(a < b && b < c);
        assert!(context.starts_with("Original Prompt:\nWhat is entropy?"));
        assert!(context.ends_with("--- Begin Team Debate ---"));
    }

    #[tokio::test]
    async fn test_booting_everyone_blocks_transition() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.boot_current_agent().unwrap();
        say(&mut flow, &mut channel, "q").await;
        let outcome = flow.boot_current_agent().unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::PhaseComplete {
                previous_index: 1,
                promoted_count: 0
            }
        );

        assert_eq!(
            flow.transition_to_team_phase().unwrap_err(),
            StagedFlowError::NoPromotedAgents
        );
        assert!(flow.is_individual_phase());
    }

    #[tokio::test]
    async fn test_single_promotion_is_insufficient() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();
        say(&mut flow, &mut channel, "q").await;
        flow.boot_current_agent().unwrap();

        assert_eq!(
            flow.transition_to_team_phase().unwrap_err(),
            StagedFlowError::InsufficientPromotions { promoted: 1 }
        );
    }

    #[tokio::test]
    async fn test_booted_agents_excluded_from_context() {
        let mut flow = flow(3);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();
        say(&mut flow, &mut channel, "q").await;
        flow.boot_current_agent().unwrap();
        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();

        let transition = flow.transition_to_team_phase().unwrap();
        assert_eq!(transition.promoted_indices, vec![0, 2]);
        assert!(!transition.assembled_context.contains("Model 1"));
        assert!(transition.assembled_context.contains("Model 0"));
        assert!(transition.assembled_context.contains("Model 2"));
    }

    #[tokio::test]
    async fn test_restart_clears_only_current_agent() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();
        say(&mut flow, &mut channel, "to agent 1").await;

        let (index, _) = flow.restart_current_agent().unwrap();
        assert_eq!(index, 1);

        // Agent 1's transcript is gone, agent 0's survives untouched.
        flow.promote_current_agent().unwrap();
        let context = flow.assemble_comprehensive_context();
        assert!(context.contains("--- Model 0 Conversation ---"));
        assert!(context.contains("User: q"));
        assert!(!context.contains("to agent 1"));
        assert!(!context.contains("--- Model 1 Conversation ---"));
    }

    #[tokio::test]
    async fn test_transition_requires_queue_exhausted() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();
        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();

        assert_eq!(
            flow.transition_to_team_phase().unwrap_err(),
            StagedFlowError::AgentsRemaining { remaining: 1 }
        );
    }

    #[tokio::test]
    async fn test_transition_is_one_shot() {
        let mut flow = flow(2);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();
        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();

        flow.transition_to_team_phase().unwrap();
        assert_eq!(
            flow.transition_to_team_phase().unwrap_err(),
            StagedFlowError::AlreadyInTeamPhase
        );
    }

    #[tokio::test]
    async fn test_message_after_exhaustion_is_rejected() {
        let mut flow = flow(1);
        let mut channel = MockChannel::new();

        say(&mut flow, &mut channel, "q").await;
        flow.promote_current_agent().unwrap();

        let outcome = flow
            .handle_individual_message(&mut channel, "more")
            .await
            .unwrap();
        assert_eq!(outcome, IndividualOutcome::PhaseExhausted);
    }

    #[tokio::test]
    async fn test_promote_without_agents_left_errors() {
        let mut flow = flow(1);
        let mut channel = MockChannel::new();
        say(&mut flow, &mut channel, "q").await;
        flow.boot_current_agent().unwrap();

        assert!(matches!(
            flow.promote_current_agent().unwrap_err(),
            StagedFlowError::NoCurrentAgent { .. }
        ));
        assert!(matches!(
            flow.restart_current_agent().unwrap_err(),
            StagedFlowError::NoCurrentAgent { .. }
        ));
    }

    #[test]
    fn test_status_display_progression() {
        let mut flow = flow(2);
        assert_eq!(flow.status_display(), "Input initial discussion question:");

        flow.original_prompt = Some("q".to_string());
        assert_eq!(flow.status_display(), "1:1 with Model 0 [д]");

        flow.current_agent_index = 2;
        assert_eq!(
            flow.status_display(),
            "1:1 phase complete - ready for team debate"
        );

        flow.phase = Phase::Team;
        assert_eq!(flow.status_display(), "Team debate phase");
    }

    #[test]
    fn test_context_empty_without_prompt() {
        let flow = flow(2);
        assert_eq!(flow.assemble_comprehensive_context(), "");
    }
}
