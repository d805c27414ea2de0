pub(crate) mod base;
pub(crate) mod interface;
pub(crate) mod printer;

pub use base::{EvalError, Evaluation, SetupError};
pub(crate) use base::{Adapter, Builtin, Engine, NullSink, Scope};
pub(crate) use interface::{ConsoleInterface, UserInterface};

#[cfg(test)]
pub(crate) use interface::util;
