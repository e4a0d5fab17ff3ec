//! Traversal context threaded through the C engine.
//!
//! The context is a small `Copy` value passed by argument, so a nested visit
//! never has to restore anything on the way out.

use bitflags::bitflags;

/// Position of the node being rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    /// Translation-unit level.
    #[default]
    TopLevel,
    /// A function's return type, ahead of its `def` line.
    Signature,
    /// A function's parameter list.
    Params,
    /// Inside a function body.
    Body,
}

impl Role {
    /// Whether definitions written here land at module scope.
    pub fn is_module_scope(self) -> bool {
        self != Role::Body
    }
}

bitflags! {
    /// Jump statement kinds: dropped while rendering a region, or searched
    /// for in a loop body.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Kinds: u8 {
        /// The terminating `break` of a switch arm.
        const BREAK = 1 << 0;
        const CONTINUE = 1 << 1;
    }
}

impl Kinds {
    /// Skip flag for a node kind name; empty when the kind is never skipped.
    pub fn of(kind: &str) -> Kinds {
        match kind {
            "Break" => Kinds::BREAK,
            "Continue" => Kinds::CONTINUE,
            _ => Kinds::empty(),
        }
    }
}

/// Role plus the active skip set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub role: Role,
    pub skip: Kinds,
}

impl Context {
    pub fn with_role(self, role: Role) -> Self {
        Self { role, ..self }
    }

    pub fn with_skip(self, kinds: Kinds) -> Self {
        Self {
            skip: self.skip | kinds,
            ..self
        }
    }

    /// Entering a loop or switch: jumps bind to it again.
    pub fn enter_loop(self) -> Self {
        Self {
            skip: self.skip - (Kinds::BREAK | Kinds::CONTINUE),
            ..self
        }
    }

    pub fn skips(&self, kind: &str) -> bool {
        let flag = Kinds::of(kind);
        !flag.is_empty() && self.skip.contains(flag)
    }
}
