//! superchat-core: domain layer for the superchat terminal client.
//!
//! This crate holds everything that does not touch the network or the
//! terminal: input classification, the session configuration and usage
//! counters, the model catalog and name resolver, and the staged-flow
//! orchestrator that drives individual-to-team conversations.

pub mod error;
pub mod models;
pub mod naming;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod staged;
pub mod stats;

pub use error::{Result, SuperchatError};
pub use models::{ModelConfig, ModelRegistry};
pub use parser::{ParsedInput, parse_input};
pub use session::{FlowMode, SessionConfig};
pub use staged::{
    AdvanceOutcome, AgentChannel, IndividualOutcome, Phase, StagedFlow, StagedFlowError,
    TeamTransition,
};
pub use stats::{SessionStats, UsageRecord, estimate_cost};
