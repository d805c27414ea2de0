use crate::api::argument::Argument;
use crate::api::capture::ErasedSink;
use crate::constant::*;
use crate::constraint::{ConstraintKind, ConstraintSpec};
use crate::model::{Arity, ArgumentKey, Cardinality, ValueMode};
use crate::parser::{
    Adapter, Builtin, ConsoleInterface, Engine, EvalError, Evaluation, NullSink, SetupError,
    UserInterface,
};

/// The command line argument handler: a mapping of short/long keys to typed
/// destinations, with value checks, cross-argument constraints, and
/// (optionally) nested sub-group handlers.
///
/// A `Handler` is set up through chained builder calls and then consumed by
/// one of the evaluation entry points.  Setup violations (duplicate key,
/// invalid key specification, inconsistent declaration) are deferred and
/// surface from the evaluation as [`SetupError`]s.
///
/// ### Example
/// ```
/// use argot::{Argument, Handler, Scalar, Switch};
///
/// let mut verbose: bool = false;
/// let mut name: String = String::default();
/// let handler = Handler::new("program")
///     .add(Argument::new("v,verbose", Switch::new(&mut verbose, true))
///         .help("Make the program output verbose."))
///     .add(Argument::new("n,name", Scalar::new(&mut name))
///         .help("The name to greet."));
///
/// handler.eval_tokens(&["-n", "world"]).unwrap();
///
/// assert!(!verbose);
/// assert_eq!(name, "world");
/// ```
pub struct Handler<'a> {
    pub(crate) program: String,
    pub(crate) about: Option<String>,
    pub(crate) entries: Vec<Entry<'a>>,
    pub(crate) constraints: Vec<ConstraintSpec>,
    pub(crate) keys: Vec<ArgumentKey>,
    pub(crate) deferred: Option<SetupError>,
    pub(crate) abbreviations: bool,
    pub(crate) end_values: String,
    pub(crate) builtins: bool,
}

pub(crate) enum Entry<'a> {
    Adapter(Adapter<'a>),
    Group {
        key: ArgumentKey,
        handler: Handler<'a>,
    },
}

impl<'a> Handler<'a> {
    /// Create an argument handler for the named program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            entries: Vec::default(),
            constraints: Vec::default(),
            keys: Vec::default(),
            deferred: None,
            abbreviations: true,
            end_values: END_VALUES_DEFAULT.to_string(),
            builtins: true,
        }
    }

    /// Document the about message for this handler.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Disable unambiguous-prefix resolution of long keys.
    pub fn disable_abbreviations(mut self) -> Self {
        self.abbreviations = false;
        self
    }

    /// Rename the end-of-values marker (default `endvalues`).
    pub fn end_values_marker(mut self, name: impl Into<String>) -> Self {
        self.end_values = name.into();
        self
    }

    /// Skip the automatic registration of the built-in pseudo-arguments
    /// (help, help-arg, list-arg-vars, print-hidden, print-deprecated, and
    /// the end-of-values marker).
    pub fn suppress_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Add an argument to the handler.
    ///
    /// The argument's key specification is parsed and checked against the
    /// already registered keys; violations surface from the evaluation.
    pub fn add<T: 'a>(mut self, argument: Argument<'a, T>) -> Self {
        let inner = argument.consume();

        let key = match ArgumentKey::parse(&inner.spec) {
            Ok(key) => key,
            Err(error) => {
                self.defer(SetupError::from(error));
                return self;
            }
        };

        if let Err(error) = self.claim(&key) {
            self.defer(error);
            return self;
        }

        let value_mode = inner.value_mode.unwrap_or(inner.arity.default_value_mode());
        let cardinality = inner.cardinality.unwrap_or(inner.arity.default_cardinality());

        if let Err(reason) = declaration_consistency(
            &inner.arity,
            value_mode,
            cardinality,
            inner.multi_value,
            inner.mandatory,
            inner.deprecated || inner.replaced_by.is_some(),
            key.is_free(),
        ) {
            self.defer(SetupError::InconsistentDeclaration {
                key: key.to_string(),
                reason,
            });
            return self;
        }

        for required in &inner.requires {
            self.constraints.push(ConstraintSpec {
                kind: ConstraintKind::Requires,
                owner: Some(inner.spec.clone()),
                members: vec![required.clone()],
            });
        }

        for excluded in &inner.excludes {
            self.constraints.push(ConstraintSpec {
                kind: ConstraintKind::Excludes,
                owner: Some(inner.spec.clone()),
                members: vec![excluded.clone()],
            });
        }

        self.entries.push(Entry::Adapter(Adapter {
            key,
            value_mode,
            cardinality,
            arity: inner.arity,
            mandatory: inner.mandatory,
            hidden: inner.hidden,
            deprecated: inner.deprecated,
            replaced_by: inner.replaced_by,
            separator: inner.separator,
            multi_value: inner.multi_value,
            help: inner.help,
            type_name: inner.type_name,
            check_notes: inner.check_notes,
            builtin: Builtin::User,
            formats: inner.formats,
            sink: Box::new(ErasedSink::bind(inner.field, inner.checks)),
            uses: 0,
            values: 0,
        }));

        self
    }

    /// Register a sub-group handler under the given key.
    ///
    /// Token resolution recurses into the sub-group's own key space after
    /// the key is matched; the sub-group's mandatory arguments and
    /// constraints apply only when the group is used.
    pub fn group(mut self, spec: impl Into<String>, handler: Handler<'a>) -> Self {
        let spec = spec.into();

        let key = match ArgumentKey::parse(&spec) {
            Ok(key) => key,
            Err(error) => {
                self.defer(SetupError::from(error));
                return self;
            }
        };

        if key.is_free() {
            self.defer(SetupError::InconsistentDeclaration {
                key: key.to_string(),
                reason: "the free value marker cannot name a sub-group".to_string(),
            });
            return self;
        }

        if let Err(error) = self.claim(&key) {
            self.defer(error);
            return self;
        }

        self.entries.push(Entry::Group { key, handler });
        self
    }

    /// Require that either none or all of the referenced arguments are used.
    pub fn all_of(self, specs: Vec<impl Into<String>>) -> Self {
        self.constrain(ConstraintKind::AllOf, specs)
    }

    /// Require that at most one of the referenced arguments is used
    /// (mutual exclusivity).
    pub fn any_of(self, specs: Vec<impl Into<String>>) -> Self {
        self.constrain(ConstraintKind::AnyOf, specs)
    }

    /// Require that exactly one of the referenced arguments is used.
    pub fn one_of(self, specs: Vec<impl Into<String>>) -> Self {
        self.constrain(ConstraintKind::OneOf, specs)
    }

    fn constrain(mut self, kind: ConstraintKind, specs: Vec<impl Into<String>>) -> Self {
        let members: Vec<String> = specs.into_iter().map(|spec| spec.into()).collect();

        if members.len() < 2 {
            self.defer(SetupError::SparseConstraint);
            return self;
        }

        self.constraints.push(ConstraintSpec {
            kind,
            owner: None,
            members,
        });
        self
    }

    fn claim(&mut self, key: &ArgumentKey) -> Result<(), SetupError> {
        if self.keys.iter().any(|registered| registered.intersects(key)) {
            return Err(SetupError::DuplicateKey(key.to_string()));
        }

        self.keys.push(key.clone());
        Ok(())
    }

    fn defer(&mut self, error: SetupError) {
        // Only the first violation is reported.
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    /// Evaluate the token stream against this handler.
    ///
    /// Consuming the handler freezes its configuration: the setup phase ends
    /// here, by construction.  All errors are raised as [`EvalError`]s; this
    /// entry point never terminates the process.
    pub fn eval_tokens(self, tokens: &[&str]) -> Result<Evaluation, EvalError> {
        self.eval_with_interface(tokens, &ConsoleInterface::default())
    }

    /// Evaluate the command line ([`std::env::args`]) against this handler.
    ///
    /// On failure, writes the error prefix plus the error message to the
    /// error stream and terminates the process with status `1` (via
    /// [`std::process::exit`]).  After a help request, terminates with
    /// status `0`.
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
        let title = self.program.clone();
        let builtins = self.builtins;
        let root = self.assemble(&mut engine, None, builtins, None, title)?;
        engine.roots.push(root);
        engine.run(tokens, interface)
    }

    /// Flatten this handler (and its sub-groups, recursively) into the
    /// engine's adapter arena and scope list.
    pub(crate) fn assemble(
        self,
        engine: &mut Engine<'a>,
        parent: Option<usize>,
        register_builtins: bool,
        group_key: Option<ArgumentKey>,
        title: String,
    ) -> Result<usize, SetupError> {
        if let Some(error) = self.deferred {
            return Err(error);
        }

        let scope = engine.scopes.len();
        engine.scopes.push(crate::parser::Scope {
            title: title.clone(),
            about: self.about,
            adapter_ids: Vec::default(),
            table: Default::default(),
            constraints: Vec::default(),
            parent,
            group_key,
            abbreviations: self.abbreviations,
            used: parent.is_none(),
        });

        if register_builtins {
            for adapter in builtin_adapters(&self.end_values) {
                push_adapter(engine, scope, adapter)?;
            }
        }

        for entry in self.entries {
            match entry {
                Entry::Adapter(adapter) => {
                    push_adapter(engine, scope, adapter)?;
                }
                Entry::Group { key, handler } => {
                    let child_title = format!("{title} {key}");
                    let child = handler.assemble(
                        engine,
                        Some(scope),
                        false,
                        Some(key.clone()),
                        child_title,
                    )?;

                    let help = engine.scopes[child].about.clone();
                    push_adapter(
                        engine,
                        scope,
                        Adapter {
                            key,
                            value_mode: ValueMode::None,
                            cardinality: Cardinality::Max(1),
                            arity: Arity::None,
                            mandatory: false,
                            hidden: false,
                            deprecated: false,
                            replaced_by: None,
                            separator: LIST_SEPARATOR_DEFAULT,
                            multi_value: false,
                            help,
                            type_name: "sub-group",
                            check_notes: Vec::default(),
                            builtin: Builtin::Group(child),
                            formats: Vec::default(),
                            sink: Box::new(NullSink {}),
                            uses: 0,
                            values: 0,
                        },
                    )?;
                }
            }
        }

        for spec in self.constraints {
            let owner = match &spec.owner {
                Some(owner) => Some(resolve_constraint_key(engine, scope, owner)?),
                None => None,
            };

            let members = spec
                .members
                .iter()
                .map(|member| resolve_constraint_key(engine, scope, member))
                .collect::<Result<Vec<usize>, SetupError>>()?;

            engine.scopes[scope]
                .constraints
                .push(crate::constraint::Constraint {
                    kind: spec.kind,
                    owner,
                    members,
                });
        }

        Ok(scope)
    }
}

fn push_adapter<'a>(
    engine: &mut Engine<'a>,
    scope: usize,
    adapter: Adapter<'a>,
) -> Result<(), SetupError> {
    let id = engine.adapters.len();

    if !engine.scopes[scope].table.insert(&adapter.key, id) {
        return Err(SetupError::DuplicateKey(adapter.key.to_string()));
    }

    engine.scopes[scope].adapter_ids.push(id);
    engine.adapters.push(adapter);
    Ok(())
}

fn resolve_constraint_key(
    engine: &Engine,
    scope: usize,
    spec: &str,
) -> Result<usize, SetupError> {
    let key = ArgumentKey::parse(spec.trim_start_matches('-'))?;

    engine.scopes[scope]
        .adapter_ids
        .iter()
        .copied()
        .find(|id| engine.adapters[*id].key.intersects(&key))
        .ok_or_else(|| SetupError::UnknownConstraintKey(spec.to_string()))
}

fn builtin_adapters(end_values: &str) -> Vec<Adapter<'static>> {
    let blank = |key: ArgumentKey,
                 value_mode: ValueMode,
                 arity: Arity,
                 help: &str,
                 builtin: Builtin,
                 hidden: bool| Adapter {
        key,
        value_mode,
        cardinality: Cardinality::Any,
        arity,
        mandatory: false,
        hidden,
        deprecated: false,
        replaced_by: None,
        separator: LIST_SEPARATOR_DEFAULT,
        multi_value: false,
        help: Some(help.to_string()),
        type_name: "()",
        check_notes: Vec::default(),
        builtin,
        formats: Vec::default(),
        sink: Box::new(NullSink {}),
        uses: 0,
        values: 0,
    };

    vec![
        blank(
            ArgumentKey::from_forms(Some(HELP_SHORT), Some(HELP_NAME)),
            ValueMode::None,
            Arity::None,
            HELP_MESSAGE,
            Builtin::Help,
            false,
        ),
        blank(
            ArgumentKey::from_long(HELP_ARG_NAME),
            ValueMode::Required,
            Arity::One,
            HELP_ARG_MESSAGE,
            Builtin::HelpFor,
            false,
        ),
        blank(
            ArgumentKey::from_long(LIST_VARS_NAME),
            ValueMode::None,
            Arity::None,
            LIST_VARS_MESSAGE,
            Builtin::ListVars,
            false,
        ),
        blank(
            ArgumentKey::from_long(PRINT_HIDDEN_NAME),
            ValueMode::None,
            Arity::None,
            PRINT_HIDDEN_MESSAGE,
            Builtin::ShowHidden,
            false,
        ),
        blank(
            ArgumentKey::from_long(PRINT_DEPRECATED_NAME),
            ValueMode::None,
            Arity::None,
            PRINT_DEPRECATED_MESSAGE,
            Builtin::ShowDeprecated,
            false,
        ),
        blank(
            ArgumentKey::from_long(end_values),
            ValueMode::None,
            Arity::None,
            END_VALUES_MESSAGE,
            Builtin::EndValues,
            true,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn declaration_consistency(
    arity: &Arity,
    value_mode: ValueMode,
    cardinality: Cardinality,
    multi_value: bool,
    mandatory: bool,
    retired: bool,
    free: bool,
) -> Result<(), String> {
    if !arity.takes_values() && value_mode != ValueMode::None {
        return Err("a value-less destination cannot take a value".to_string());
    }

    if arity.takes_values() && value_mode == ValueMode::None {
        return Err("a value-taking destination requires a value mode".to_string());
    }

    if multi_value && !matches!(arity, Arity::Many | Arity::Fixed(_)) {
        return Err("only a multi-slot destination can consume multiple value tokens".to_string());
    }

    if free && multi_value {
        return Err("the free value adapter consumes value tokens directly".to_string());
    }

    if let Cardinality::Range(lower, upper) = cardinality {
        if lower > upper {
            return Err("the cardinality lower bound exceeds its upper bound".to_string());
        }
    }

    if arity.takes_values() && cardinality.upper() == Some(0) {
        return Err("the cardinality forbids every value".to_string());
    }

    if let Arity::Fixed(n) = arity {
        if cardinality != Cardinality::Exact(*n) {
            return Err(format!(
                "a fixed-size destination requires exactly {n} values"
            ));
        }
    }

    if value_mode == ValueMode::None && cardinality.lower() > 1 {
        return Err("a value-less argument supports only use-limiting cardinality".to_string());
    }

    if mandatory && retired {
        return Err("a deprecated argument cannot be mandatory".to_string());
    }

    Ok(())
}
