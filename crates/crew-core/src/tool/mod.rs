//! Tool system
//!
//! Tools are addressed by name through an immutable [`ToolRegistry`].

pub mod definition;
pub mod registry;
pub mod traits;

pub use definition::{SchemaBuilder, ToolDefinition};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use traits::{Tool, ToolResult, required_str};
