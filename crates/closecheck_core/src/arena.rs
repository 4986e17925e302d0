//! Arena allocation for one analysis unit.
//!
//! Every AST of a unit (its own files plus the library stubs it imports) is
//! allocated from a single bump arena that is dropped when the unit is done.

use bumpalo::Bump;

/// Bump arena owning the syntax trees of one analysis unit.
///
/// Units never share an arena, so units can be analyzed on different
/// threads without synchronization.
pub struct AnalysisArena {
    bump: Bump,
}

impl AnalysisArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena sized for roughly `source_bytes` of input text.
    pub fn for_source_len(source_bytes: usize) -> Self {
        // Trees are a small multiple of the text they came from.
        Self {
            bump: Bump::with_capacity(source_bytes.saturating_mul(4)),
        }
    }

    /// The underlying bump allocator, handed to the parser.
    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Total bytes handed out so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for AnalysisArena {
    fn default() -> Self {
        Self::new()
    }
}
