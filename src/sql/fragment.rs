//! SQL fragments and the shared parameter counter.

use crate::value::Value;

/// Allocator for `@pN` parameter names.
///
/// One counter serves an entire compiled statement, union branches included,
/// so no two bound parameters ever collide.
#[derive(Debug, Clone, Copy)]
pub struct ParamCounter(u32);

impl ParamCounter {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn starting_at(next: u32) -> Self {
        Self(next)
    }

    /// The next unused parameter name.
    pub fn next_name(&mut self) -> String {
        self.0 += 1;
        format!("@p{}", self.0)
    }

    /// How many names have been handed out.
    pub fn issued(&self) -> u32 {
        self.0
    }
}

impl Default for ParamCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A piece of SQL text plus the parameters it binds, in appearance order.
///
/// `needs_brackets` marks fragments whose text is not atomic (binary
/// operators); [`SqlFragment::embed`] parenthesizes those when the fragment
/// is spliced into a larger one.
#[derive(Debug, Clone)]
pub struct SqlFragment {
    pub text: String,
    pub needs_brackets: bool,
    pub params: Vec<(String, Value)>,
}

impl SqlFragment {
    /// An atomic fragment with no parameters.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            needs_brackets: false,
            params: Vec::new(),
        }
    }

    /// A non-atomic fragment that must be bracketed when embedded.
    pub fn compound(text: impl Into<String>, params: Vec<(String, Value)>) -> Self {
        Self {
            text: text.into(),
            needs_brackets: true,
            params,
        }
    }

    /// A single bound parameter.
    pub fn param(name: String, value: Value) -> Self {
        Self {
            text: name.clone(),
            needs_brackets: false,
            params: vec![(name, value)],
        }
    }

    /// The fragment's text as it should appear inside a larger expression.
    pub fn embed(&self) -> String {
        if self.needs_brackets {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }
}
