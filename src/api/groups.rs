use crate::api::core::Handler;
use crate::matcher::KeyTable;
use crate::parser::{ConsoleInterface, Engine, EvalError, Evaluation, SetupError, UserInterface};

/// An explicit aggregator over several independently constructed
/// [`Handler`]s, for programs where multiple components each contribute
/// command line arguments.
///
/// One token stream is evaluated against the union key space of every
/// registered handler (registration order decides resolution priority).
/// Keys repeated across registered handlers are a setup error.  The built-in
/// pseudo-arguments are registered once, by the aggregator.
///
/// ### Example
/// ```
/// use argot::{Argument, Groups, Handler, Scalar, Switch};
///
/// let mut verbose: bool = false;
/// let mut cache: String = String::default();
/// let groups = Groups::new("program")
///     .register(
///         Handler::new("logging")
///             .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))),
///     )
///     .register(
///         Handler::new("storage")
///             .add(Argument::new("c,cache-dir", Scalar::new(&mut cache))),
///     );
///
/// groups.eval_tokens(&["-v", "-c", "/tmp/cache"]).unwrap();
///
/// assert!(verbose);
/// assert_eq!(cache, "/tmp/cache");
/// ```
pub struct Groups<'a> {
    program: String,
    handlers: Vec<Handler<'a>>,
    builtins: bool,
}

impl<'a> Groups<'a> {
    /// Create an aggregator for the named program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            handlers: Vec::default(),
            builtins: true,
        }
    }

    /// Register a handler.  Earlier registrations win key resolution.
    pub fn register(mut self, handler: Handler<'a>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Skip the automatic registration of the built-in pseudo-arguments.
    pub fn suppress_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Evaluate the token stream against every registered handler.
    pub fn eval_tokens(self, tokens: &[&str]) -> Result<Evaluation, EvalError> {
        self.eval_with_interface(tokens, &ConsoleInterface::default())
    }

    /// Evaluate the command line ([`std::env::args`]); on failure, print the
    /// prefixed error and terminate the process with status `1`.
    pub fn eval(self, error_prefix: &str) {
        let tokens: Vec<String> = std::env::args().skip(1).collect();
        let interface = ConsoleInterface::default();

        match self.eval_with_interface(
            tokens
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
            &interface,
        ) {
            Ok(Evaluation::Complete) => {}
            Ok(Evaluation::HelpShown) => {
                std::process::exit(0);
            }
            Err(error) => {
                interface.print_error(format!("{error_prefix}{error}"));
                std::process::exit(1);
            }
        }
    }

    pub(crate) fn eval_with_interface(
        self,
        tokens: &[&str],
        interface: &dyn UserInterface,
    ) -> Result<Evaluation, EvalError> {
        let mut engine = Engine::new();
        let program = self.program;

        for (index, handler) in self.handlers.into_iter().enumerate() {
            let register_builtins = self.builtins && index == 0;
            let title = if index == 0 {
                program.clone()
            } else {
                handler.program.clone()
            };
            let root = handler.assemble(&mut engine, None, register_builtins, None, title)?;
            engine.roots.push(root);
        }

        if engine.roots.is_empty() {
            // An empty aggregator accepts an empty token stream only.
            let handler = Handler::new(program);
            let builtins = self.builtins;
            let title = handler.program.clone();
            let root = handler.assemble(&mut engine, None, builtins, None, title)?;
            engine.roots.push(root);
        }

        cross_member_collisions(&engine)?;
        engine.run(tokens, interface)
    }
}

/// Registering the same key through two member handlers is a setup error:
/// resolution priority must never silently shadow an argument.
fn cross_member_collisions(engine: &Engine) -> Result<(), SetupError> {
    let mut merged = KeyTable::default();

    for &root in &engine.roots {
        for &id in &engine.scopes[root].adapter_ids {
            let key = &engine.adapters[id].key;

            if !merged.insert(key, id) {
                return Err(SetupError::DuplicateKey(key.to_string()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::argument::Argument;
    use crate::api::field::{Scalar, Switch};
    use crate::parser::util::InMemoryInterface;
    use crate::test::assert_contains;

    #[test]
    fn empty_eval() {
        let groups = Groups::new("program");
        assert_eq!(
            groups.eval_tokens(&[]).unwrap(),
            Evaluation::Complete
        );
    }

    #[test]
    fn routed_across_members() {
        let mut verbose: bool = false;
        let mut cache: String = String::default();
        let groups = Groups::new("program")
            .register(
                Handler::new("logging")
                    .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))),
            )
            .register(
                Handler::new("storage")
                    .add(Argument::new("c,cache-dir", Scalar::new(&mut cache))),
            );

        groups.eval_tokens(&["-c", "/tmp/cache", "-v"]).unwrap();

        assert!(verbose);
        assert_eq!(cache, "/tmp/cache");
    }

    #[test]
    fn duplicate_across_members() {
        let mut a: bool = false;
        let mut b: bool = false;
        let groups = Groups::new("program")
            .register(
                Handler::new("first").add(Argument::new("v,verbose", Switch::new(&mut a, true))),
            )
            .register(
                Handler::new("second").add(Argument::new("v,volume", Switch::new(&mut b, true))),
            );

        let error = groups.eval_tokens(&[]).unwrap_err();
        assert_eq!(
            error,
            EvalError::Setup(SetupError::DuplicateKey("-v,--volume".to_string()))
        );
    }

    #[test]
    fn abbreviation_across_members() {
        let mut verbose: bool = false;
        let mut volume: u32 = 0;
        let groups = Groups::new("program")
            .register(
                Handler::new("first")
                    .add(Argument::new("verbose", Switch::new(&mut verbose, true))),
            )
            .register(Handler::new("second").add(Argument::new("volume", Scalar::new(&mut volume))));

        let error = groups.eval_tokens(&["--v", "5"]).unwrap_err();
        assert_eq!(
            error,
            EvalError::AmbiguousArgument {
                argument: "--v".to_string(),
                candidates: "--verbose, --volume".to_string(),
            }
        );
    }

    #[test]
    fn constraints_stay_per_member() {
        let mut verbose: bool = false;
        let mut cache: String = String::default();
        let groups = Groups::new("program")
            .register(
                Handler::new("logging")
                    .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))),
            )
            .register(Handler::new("storage").add(
                Argument::new("c,cache-dir", Scalar::new(&mut cache)).mandatory(),
            ));

        let error = groups.eval_tokens(&["-v"]).unwrap_err();
        assert_eq!(
            error,
            EvalError::MandatoryNotUsed("-c,--cache-dir".to_string())
        );
    }

    #[test]
    fn help_spans_members(){
        let mut verbose: bool = false;
        let mut cache: String = String::default();
        let groups = Groups::new("program")
            .register(
                Handler::new("logging")
                    .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))
                        .help("Make the output verbose.")),
            )
            .register(
                Handler::new("storage")
                    .add(Argument::new("c,cache-dir", Scalar::new(&mut cache))
                        .help("Where to cache downloads.")),
            );
        let interface = InMemoryInterface::default();

        let evaluation = groups.eval_with_interface(&["--help"], &interface).unwrap();

        assert_eq!(evaluation, Evaluation::HelpShown);
        let message = interface.consume_message();
        assert_contains!(message, "usage: program [-h] [-v]");
        assert_contains!(message, "usage: storage [-c CACHE_DIR]");
        assert_contains!(message, "Make the output verbose.");
        assert_contains!(message, "Where to cache downloads.");
    }
}
