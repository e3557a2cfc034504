//! superchat-interaction: model invocation for superchat.
//!
//! Everything that actually talks to a model lives here: the OpenRouter
//! chat-completions client, the per-session agent pool with bounded
//! rolling contexts, and the round-robin debate team used in team modes.

pub mod agent;
pub mod client;
pub mod error;
pub mod pool;
pub mod prompts;
pub mod team;

pub use agent::ChatAgent;
pub use client::{ChatMessage, ModelInvoker, OpenRouterClient, Role};
pub use error::AgentError;
pub use pool::AgentPool;
pub use team::{Speaker, Team, TeamMember, TeamMessage};
