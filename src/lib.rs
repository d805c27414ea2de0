//! `argot` is a declarative command line argument handler for Rust.
//!
//! Although other crates provide command line parser functionality, we have found they prioritize different concerns than those we are interested in.
//! It is very possible those crates can be configured to make *our desired* command line handler.
//! We built `argot` to create our desired style of command line handler "out of the box".
//! Specifically, `argot` attempts to prioritize the following design concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Declarative validation*:
//! The user should not validate/reject domain invalid inputs by hand.
//! Value checks (range, enumerated set, pattern, filesystem predicates) and cross-argument
//! constraints (requires, excludes, all-of, any-of, one-of) are declared on the handler
//! and enforced during evaluation.
//! * *Keyed argument paradigm*:
//! Every argument is identified by a short key (`-v`), a long key (`--verbose`), or both,
//! with GNU style syntax: combined shorts (`-xvf`), `--key=value`, `--key value`,
//! unambiguous long-key abbreviations, and free (positional) values via the `"-"` marker.
//! * *Sub-group paradigm*:
//! A handler may nest other handlers, each with an independent key space, to collect the
//! arguments of multiple program components.  The [`Groups`] aggregator serves the same
//! purpose across components that construct their handlers independently.
//! * *Detailed yet basic UX*:
//! The help and error output should leave no ambiguity in how to use the program.
//! However, we do not aim to support rich display configurations, such as colour output,
//! shell completions, etc.
//!
//! # Usage
//! Configure `argot` by starting with a [`Handler`] and `add`ing [`Argument`]s.
//!
//! Each argument takes a *field* which binds the destination variable and serves to specify:
//! * The underlying type `T` of the argument (ex: `u32`).
//! * Whether `T` is wrapped in a container (ex: `Vec<T>`, `Option<T>`, `HashMap<K, V>`).
//! * How values commit to the destination (overwrite, append, insert, positional fill,
//! or callback invocation).
//!
//! All type `T` parsing in `argot` is controlled by [`std::str::FromStr`].
//!
//! ```
//! use argot::{check, Argument, Handler, List, Scalar, Switch};
//!
//! let mut verbose: bool = false;
//! let mut threshold: u32 = 0;
//! let mut items: Vec<u32> = Vec::default();
//!
//! let handler = Handler::new("summer")
//!     .about("Sum the given items.")
//!     .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))
//!         .help("Make the program output verbose."))
//!     .add(Argument::new("t,threshold", Scalar::new(&mut threshold))
//!         .check(check::range(1, 100))
//!         .help("The threshold for reporting."))
//!     .add(Argument::new("i,item", List::new(&mut items))
//!         .multi_value()
//!         .help("The items to sum."));
//!
//! handler.eval_tokens(&["-v", "-t", "50", "-i", "1,2", "3"]).unwrap();
//!
//! assert!(verbose);
//! assert_eq!(threshold, 50);
//! assert_eq!(items, vec![1, 2, 3]);
//! ```
//!
//! ### Fields
//! * [`Scalar`]: a single-value destination (overwrite semantics).
//! * [`Optional`]: a single-value destination mapping down to `Option<T>`.
//! * [`Switch`]: a value-less destination; matching the key assigns a fixed target.
//! * [`List`]: a multi-value destination appending to any
//! [Collectable](prelude::Collectable) (`Vec<T>` and `HashSet<T>` out of the box);
//! `Vec<T>` destinations may opt into sorted/unique post-processing.
//! * [`Assoc`]: a `KEY=VALUE` destination inserting into any
//! [Associative](prelude::Associative) (`HashMap` and `BTreeMap` out of the box).
//! * [`Fixed`]: a fixed-arity destination filling an array positionally.
//! * [`Pair`]: one value filling two variables (the second from a fixed complement).
//! * [`Callback`]/[`CallbackValue`]: invoke a closure on match / per converted value.
//!
//! ### Constraints
//! Value checks attach per argument via [`Argument::check`] and run at assignment time.
//! Cross-argument constraints relate the *used* state of several arguments and run once
//! after the token loop: [`Argument::requires`], [`Argument::excludes`],
//! [`Handler::all_of`], [`Handler::any_of`] (at most one, despite the name),
//! [`Handler::one_of`].
//!
//! ### Built-ins
//! Unless suppressed, every handler auto-registers: `-h`/`--help` (usage),
//! `--help-arg KEY` (detailed single-argument help), `--list-arg-vars` (dump the
//! argument/variable bindings), `--print-hidden`, `--print-deprecated`, and the
//! end-of-values marker (`--endvalues` by default) which terminates a multi-value
//! argument early.
//!
//! ### Errors
//! Setup violations surface as [`SetupError`]s from the first evaluation call;
//! evaluation failures as [`EvalError`]s.  [`Handler::eval_tokens`] never terminates
//! the process; [`Handler::eval`] is the error-exit entry point, printing the prefixed
//! error and exiting non-zero.
#![deny(missing_docs)]

mod api;
pub mod check;
mod constant;
mod constraint;
pub mod format;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use constraint::ConstraintViolation;
#[doc(hidden)]
pub use model::Arity;
pub use model::{ArgumentKey, Cardinality, ValueMode};
pub use parser::{EvalError, Evaluation, SetupError};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
