use thiserror::Error;

use crate::check::Check;
use crate::model::Arity;

/// Behaviour to fill a destination of explicit type `T` from input `&str` tokens.
///
/// We use this at the bottom of the handler object graph so the compiler can
/// maintain each destination's type.
#[doc(hidden)]
pub trait Typed<'a, T> {
    /// Declare that the argument key has been matched.
    fn matched(&mut self);

    /// Convert a raw token into the destination type `T`.
    fn convert(&self, token: &str) -> Result<T, AssignError>;

    /// Commit a converted (and checked) value to the destination.
    fn commit(&mut self, value: T) -> Result<(), AssignError>;

    /// Get the `Arity` for this implementation.
    fn arity(&self) -> Arity;

    /// Apply any post-processing once the evaluation pass is over.
    fn finish(&mut self) -> Result<(), AssignError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
#[doc(hidden)]
pub enum AssignError {
    #[error("cannot convert '{token}' to {type_name}.")]
    InvalidConversion {
        token: String,
        type_name: &'static str,
    },

    #[error("cannot accept '{token}': {message}.")]
    Rejected { token: String, message: String },

    #[error("cannot accept further values (expected {expected}).")]
    OverCapacity { expected: usize },

    #[error("{0}")]
    FailedCheck(String),
}

/// Behaviour to fill a destination of implicit type from input `&str` tokens.
///
/// We use this at the middle/top of the handler object graph so that
/// destinations of varying types may all live under one collection.
pub(crate) trait AnonymousSink {
    /// Declare that the argument key has been matched.
    fn matched(&mut self);

    /// Convert, check, and commit a value anonymously.
    fn assign(&mut self, token: &str) -> Result<(), AssignError>;

    /// Apply any post-processing once the evaluation pass is over.
    fn finish(&mut self) -> Result<(), AssignError>;
}

pub(crate) struct ErasedSink<'a, T: 'a> {
    field: Box<dyn Typed<'a, T> + 'a>,
    checks: Vec<Box<dyn Check<T> + 'a>>,
}

impl<'a, T> ErasedSink<'a, T> {
    pub(crate) fn bind(
        field: Box<dyn Typed<'a, T> + 'a>,
        checks: Vec<Box<dyn Check<T> + 'a>>,
    ) -> Self {
        Self { field, checks }
    }
}

impl<'a, T> AnonymousSink for ErasedSink<'a, T> {
    fn matched(&mut self) {
        self.field.matched();
    }

    fn assign(&mut self, token: &str) -> Result<(), AssignError> {
        let value = self.field.convert(token)?;

        for check in &self.checks {
            check.check(&value).map_err(AssignError::FailedCheck)?;
        }

        self.field.commit(value)
    }

    fn finish(&mut self) -> Result<(), AssignError> {
        self.field.finish()
    }
}
