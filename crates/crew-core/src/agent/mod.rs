//! Agents and the delegation graph
//!
//! ```text
//!            user
//!             │
//!             ▼
//! ┌──────────────────────┐   decompose_task   ┌────────────────┐
//! │       Manager        │ ─────────────────▶ │ TaskDecomposer │
//! │ (AgentNode + Roster) │                    └────────────────┘
//! └──────────┬───────────┘
//!            │ delegate_task (weak edges)
//!      ┌─────┴──────┐
//!      ▼            ▼
//! ┌──────────┐ ┌──────────┐
//! │Architect │ │  Coder   │
//! └──────────┘ └──────────┘
//! ```
//!
//! - [`AgentNode`]: one agent with its own tools and session
//! - [`ToolCallLoop`]: a single turn across tool round-trips
//! - [`RetryPolicy`]: backoff for rate-limited requests
//! - [`Manager`]: an agent that decomposes work and delegates it through a
//!   [`Roster`] of weak edges

pub mod decompose;
pub mod manager;
pub mod node;
pub mod observer;
pub mod profiles;
pub mod retry;
pub mod roster;
pub mod tool_loop;
pub mod types;

pub use decompose::{DEFAULT_TASKS, DecomposeTool, TaskDecomposer, default_tasks, parse_task_list};
pub use manager::Manager;
pub use node::{AgentNode, AgentNodeBuilder};
pub use observer::{AgentObserver, NoopObserver, TracingObserver};
pub use profiles::AgentProfile;
pub use retry::{RetryPolicy, RetryState};
pub use roster::{DelegateTool, Roster};
pub use tool_loop::{LoopSettings, ToolCallLoop};
pub use types::{AgentIdentity, DEFAULT_MODEL, TurnOutcome, TurnReport};
