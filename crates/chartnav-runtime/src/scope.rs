#![forbid(unsafe_code)]

//! Input scopes.
//!
//! The scope decides what an intent means: arrows walk subplots in
//! [`Scope::Subplot`], points in [`Scope::Trace`], and pick a slot in the
//! mark scopes. Scopes nest, so they live on an explicit stack.
//!
//! # Invariants
//!
//! 1. The stack is never empty; its bottom entry is the resting scope.
//! 2. Toggling the active scope pops it, restoring exactly the scope below.
//! 3. Toggling a scope deeper in the stack unwinds to it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Subplot,
    Trace,
    Rotor,
    MarkSet,
    MarkPlay,
    MarkJump,
}

impl Scope {
    /// Scopes that wait for a slot number.
    #[must_use]
    pub const fn is_mark(self) -> bool {
        matches!(self, Self::MarkSet | Self::MarkPlay | Self::MarkJump)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStack {
    stack: Vec<Scope>,
}

impl ScopeStack {
    #[must_use]
    pub fn new(resting: Scope) -> Self {
        Self { stack: vec![resting] }
    }

    #[must_use]
    pub fn active(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::Trace)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn contains(&self, scope: Scope) -> bool {
        self.stack.contains(&scope)
    }

    /// Enter `scope`, or leave it if it is already on the stack.
    ///
    /// Returns the scope that is active afterwards.
    pub fn toggle(&mut self, scope: Scope) -> Scope {
        let before = self.active();
        match self.stack.iter().rposition(|s| *s == scope) {
            Some(i) if i + 1 == self.stack.len() && i > 0 => {
                self.stack.pop();
            }
            Some(i) if i + 1 < self.stack.len() => self.stack.truncate(i + 1),
            Some(_) => {}
            None => self.stack.push(scope),
        }
        let after = self.active();
        tracing::debug!(?before, ?after, depth = self.stack.len(), "scope toggled");
        after
    }

    /// Unwind to the bottom entry.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_and_leaving_restores_previous() {
        let mut s = ScopeStack::new(Scope::Trace);
        assert_eq!(s.toggle(Scope::MarkSet), Scope::MarkSet);
        assert_eq!(s.toggle(Scope::MarkSet), Scope::Trace);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn toggling_a_lower_scope_unwinds() {
        let mut s = ScopeStack::new(Scope::Subplot);
        s.toggle(Scope::Trace);
        s.toggle(Scope::Rotor);
        assert_eq!(s.toggle(Scope::Trace), Scope::Trace);
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn resting_scope_cannot_be_popped() {
        let mut s = ScopeStack::new(Scope::Trace);
        assert_eq!(s.toggle(Scope::Trace), Scope::Trace);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn mark_scopes() {
        assert!(Scope::MarkJump.is_mark());
        assert!(!Scope::Rotor.is_mark());
    }
}
