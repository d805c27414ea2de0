//! Cross-argument constraints, evaluated once after the token loop.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Requires,
    Excludes,
    AllOf,
    AnyOf,
    OneOf,
}

/// A constraint as registered: argument references are still key
/// specification strings, resolved when the handler is assembled.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintSpec {
    pub(crate) kind: ConstraintKind,
    pub(crate) owner: Option<String>,
    pub(crate) members: Vec<String>,
}

/// A constraint bound to adapter identities.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Constraint {
    pub(crate) kind: ConstraintKind,
    pub(crate) owner: Option<usize>,
    pub(crate) members: Vec<usize>,
}

/// A violated cross-argument rule, reported through
/// [`EvalError::Constraint`](crate::EvalError::Constraint).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// The owner was used without an argument it requires.
    #[error("Argument '{owner}' requires '{required}'.")]
    Requires {
        /// The argument carrying the rule.
        owner: String,
        /// The argument that must also be used.
        required: String,
    },

    /// The owner was used together with an argument it excludes.
    #[error("Argument '{owner}' excludes '{excluded}'.")]
    Excludes {
        /// The argument carrying the rule.
        owner: String,
        /// The argument that must not be used.
        excluded: String,
    },

    /// Some, but not all, of an all-or-none set were used.
    #[error("Arguments {keys} must be used all together or not at all.")]
    AllOf {
        /// The listed arguments.
        keys: String,
    },

    /// More than one of a mutually exclusive set was used.
    #[error("At most one of {keys} may be used.")]
    AnyOf {
        /// The listed arguments.
        keys: String,
    },

    /// Zero or several of an exactly-one set were used.
    #[error("Exactly one of {keys} must be used (found {found}).")]
    OneOf {
        /// The listed arguments.
        keys: String,
        /// How many of them were used.
        found: usize,
    },
}

impl Constraint {
    /// Evaluate against the final used-state of the referenced arguments.
    /// Fail-fast: the first violated member is reported, not all of them.
    pub(crate) fn evaluate(
        &self,
        is_used: impl Fn(usize) -> bool,
        display: impl Fn(usize) -> String,
    ) -> Result<(), ConstraintViolation> {
        let listing = || {
            self.members
                .iter()
                .map(|id| format!("'{}'", display(*id)))
                .collect::<Vec<String>>()
                .join(", ")
        };

        match self.kind {
            ConstraintKind::Requires => {
                let owner = self
                    .owner
                    .expect("internal error - requires must have an owner");

                if is_used(owner) {
                    for member in &self.members {
                        if !is_used(*member) {
                            return Err(ConstraintViolation::Requires {
                                owner: display(owner),
                                required: display(*member),
                            });
                        }
                    }
                }
            }
            ConstraintKind::Excludes => {
                let owner = self
                    .owner
                    .expect("internal error - excludes must have an owner");

                if is_used(owner) {
                    for member in &self.members {
                        if is_used(*member) {
                            return Err(ConstraintViolation::Excludes {
                                owner: display(owner),
                                excluded: display(*member),
                            });
                        }
                    }
                }
            }
            ConstraintKind::AllOf => {
                let found = self.members.iter().filter(|id| is_used(**id)).count();

                if found != 0 && found != self.members.len() {
                    return Err(ConstraintViolation::AllOf { keys: listing() });
                }
            }
            ConstraintKind::AnyOf => {
                // Enforces mutual exclusivity: at most one of the set.
                let found = self.members.iter().filter(|id| is_used(**id)).count();

                if found > 1 {
                    return Err(ConstraintViolation::AnyOf { keys: listing() });
                }
            }
            ConstraintKind::OneOf => {
                let found = self.members.iter().filter(|id| is_used(**id)).count();

                if found != 1 {
                    return Err(ConstraintViolation::OneOf {
                        keys: listing(),
                        found,
                    });
                }
            }
        }

        Ok(())
    }
}
