//! Flag types and id handles shared by the front end.

use std::fmt;

bitflags::bitflags! {
    /// Flags for AST nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        const NONE              = 0;
        /// The parser recovered from an error inside this node.
        const HAS_ERROR         = 1 << 0;
        /// The node was synthesized by the parser (e.g. an implicit
        /// repetition of a const expression list).
        const SYNTHESIZED       = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Flags for symbols created by the binder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u16 {
        const NONE              = 0;
        const VARIABLE          = 1 << 0;
        const CONSTANT          = 1 << 1;
        const TYPE_NAME         = 1 << 2;
        const FUNCTION          = 1 << 3;
        const PACKAGE_NAME      = 1 << 4;
        const BUILTIN           = 1 << 5;
        const NIL               = 1 << 6;
        const LABEL             = 1 << 7;
        const PARAMETER         = 1 << 8;
        const RESULT            = 1 << 9;
        const RECEIVER          = 1 << 10;
        /// Declared in the universe scope.
        const PREDECLARED       = 1 << 11;
        /// Declared at package level.
        const PACKAGE_LEVEL     = 1 << 12;
        /// A type alias (`type A = B`).
        const ALIAS             = 1 << 13;
        /// A method; never entered into a scope.
        const METHOD            = 1 << 14;

        const VALUE = Self::VARIABLE.bits() | Self::CONSTANT.bits() | Self::FUNCTION.bits() | Self::NIL.bits();
        const SIGNATURE_VARIABLE = Self::PARAMETER.bits() | Self::RESULT.bits() | Self::RECEIVER.bits();
    }
}

bitflags::bitflags! {
    /// Flags set by the scanner on the current token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE              = 0;
        /// A newline separated this token from the previous one.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// The semicolon was inserted automatically at a newline or EOF.
        const AUTO_SEMICOLON    = 1 << 1;
        /// A raw (back-quoted) string literal.
        const RAW               = 1 << 2;
        const UNTERMINATED      = 1 << 3;
        const HEX_SPECIFIER     = 1 << 4;
        const OCTAL_SPECIFIER   = 1 << 5;
        const BINARY_SPECIFIER  = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Direction of a channel type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChanDir: u8 {
        const SEND = 1 << 0;
        const RECV = 1 << 1;
        const BOTH = Self::SEND.bits() | Self::RECV.bits();
    }
}

/// Handle to a type in the checker's type table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Handle to a symbol in the binder's symbol table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique id of a node within one analysis unit, assigned by the parser.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}
