//! closecheck_core: Core utilities shared by every closecheck phase.
//!
//! Provides the per-unit arena, string interning, and source positions.

pub mod arena;
pub mod intern;
pub mod text;

pub use arena::AnalysisArena;
pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, Position, TextRange, TextSpan};
