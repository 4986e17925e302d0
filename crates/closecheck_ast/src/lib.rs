//! closecheck_ast: syntax tree for the Go subset the analyzer reads.
//!
//! Defines the node types, the `SyntaxKind` enum shared with the scanner,
//! flag and id types, and the generic traversal used by later phases.

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
pub use visitor::{for_each_child, walk_with_ancestors, NodeRef};
