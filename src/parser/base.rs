use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::capture::{AnonymousSink, AssignError};
use crate::constraint::{Constraint, ConstraintViolation};
use crate::format::Format;
use crate::matcher::{classify, numberish, split_list, KeyTable, Token};
use crate::model::{Arity, ArgumentKey, Cardinality, KeyError, ValueMode};
use crate::parser::interface::UserInterface;
use crate::parser::printer;

/// An error raised by an invalid handler declaration.
///
/// Builder calls are infallible; the first violation is deferred and
/// surfaces from the evaluation entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// A key specification could not be parsed.
    #[error("Invalid argument key: {0}")]
    InvalidKey(String),

    /// A key form was registered twice within one scope.
    #[error("Cannot duplicate the argument key '{0}'.")]
    DuplicateKey(String),

    /// The argument's value mode, cardinality, and destination do not fit
    /// together.
    #[error("Argument '{key}': {reason}.")]
    InconsistentDeclaration {
        /// The offending argument.
        key: String,
        /// Why the declaration is inconsistent.
        reason: String,
    },

    /// A constraint referenced a key no argument carries.
    #[error("Constraint references the unknown argument key '{0}'.")]
    UnknownConstraintKey(String),

    /// A set constraint referenced fewer than two arguments.
    #[error("Constraint must reference at least two argument keys.")]
    SparseConstraint,
}

impl From<KeyError> for SetupError {
    fn from(error: KeyError) -> Self {
        SetupError::InvalidKey(error.to_string())
    }
}

/// An error raised while evaluating a token stream.
///
/// Raised at the point of detection (fail-fast); nothing is retried and no
/// partial-success state is reported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// A deferred setup violation, surfaced at the evaluation entry point.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// A key token matched no registered argument.
    #[error("Argument '{0}' is unknown.")]
    UnknownArgument(String),

    /// An abbreviated long key was the prefix of several registered keys.
    #[error("Argument '{argument}' is ambiguous (candidates: {candidates}).")]
    AmbiguousArgument {
        /// The abbreviation as typed.
        argument: String,
        /// The registered keys it is a prefix of.
        candidates: String,
    },

    /// The token following a sub-group key did not resolve within the
    /// sub-group's key space.
    #[error("Sub-group argument '{0}' is unknown!")]
    SubGroupUnknown(String),

    /// A raw value could not be converted to the destination type.
    #[error("Argument '{key}': cannot convert '{token}' to {type_name}.")]
    Conversion {
        /// The argument the value was directed at.
        key: String,
        /// The raw value.
        token: String,
        /// The destination type.
        type_name: String,
    },

    /// A raw value was rejected before conversion (ex: a malformed
    /// `KEY=VALUE` pair).
    #[error("Argument '{key}': cannot accept '{token}': {message}.")]
    InvalidValue {
        /// The argument the value was directed at.
        key: String,
        /// The raw value.
        token: String,
        /// Why it was rejected.
        message: String,
    },

    /// A registered check rejected the converted value.
    #[error("Argument '{key}': {message}.")]
    Check {
        /// The argument the value was directed at.
        key: String,
        /// The violated rule.
        message: String,
    },

    /// Too few or too many values (or uses) for the argument.
    #[error("Argument '{key}' takes {expected} value(s); received {provided}.")]
    Cardinality {
        /// The offending argument.
        key: String,
        /// The configured cardinality.
        expected: String,
        /// The count actually received.
        provided: usize,
    },

    /// The argument requires a value and none followed.
    #[error("Argument '{0}' requires a value.")]
    MissingValue(String),

    /// The argument takes no value but one was attached.
    #[error("Argument '{0}' takes no value.")]
    UnexpectedValue(String),

    /// A free value arrived with no destination to route it to.
    #[error("Unexpected free value '{0}'.")]
    UnexpectedFreeValue(String),

    /// A deprecated argument was used.
    #[error("Argument '{0}' is deprecated.")]
    Deprecated(String),

    /// A replaced argument was used.
    #[error("Argument '{key}' has been replaced by '{replacement}'.")]
    Replaced {
        /// The argument as used.
        key: String,
        /// The key replacing it.
        replacement: String,
    },

    /// A mandatory argument was never used.
    #[error("Mandatory argument '{0}' was not used.")]
    MandatoryNotUsed(String),

    /// A cross-argument constraint was violated.
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
}

/// The successful outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// All tokens were consumed, the destinations are assigned, and every
    /// constraint held.
    Complete,
    /// The usage output was requested (`-h`/`--help`); the remaining tokens
    /// and the end-of-loop verification were skipped.
    HelpShown,
}

/// A sink for the built-in pseudo-arguments, which have no destination.
pub(crate) struct NullSink {}

impl AnonymousSink for NullSink {
    fn matched(&mut self) {
        // Do nothing.
    }

    fn assign(&mut self, _token: &str) -> Result<(), AssignError> {
        // Do nothing.
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AssignError> {
        // Do nothing.
        Ok(())
    }
}

/// The built-in pseudo-argument roles, plus sub-group descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    User,
    Help,
    HelpFor,
    ListVars,
    ShowHidden,
    ShowDeprecated,
    EndValues,
    Group(usize),
}

/// One key bound to one type-erased destination, carrying everything the
/// evaluation loop and the usage output need to know about the argument.
pub(crate) struct Adapter<'a> {
    pub(crate) key: ArgumentKey,
    pub(crate) value_mode: ValueMode,
    pub(crate) cardinality: Cardinality,
    pub(crate) arity: Arity,
    pub(crate) mandatory: bool,
    pub(crate) hidden: bool,
    pub(crate) deprecated: bool,
    pub(crate) replaced_by: Option<String>,
    pub(crate) separator: char,
    pub(crate) multi_value: bool,
    pub(crate) help: Option<String>,
    pub(crate) type_name: &'static str,
    pub(crate) check_notes: Vec<String>,
    pub(crate) builtin: Builtin,
    pub(crate) formats: Vec<Box<dyn Format + 'a>>,
    pub(crate) sink: Box<dyn AnonymousSink + 'a>,
    pub(crate) uses: usize,
    pub(crate) values: usize,
}

impl<'a> std::fmt::Debug for Adapter<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Adapter[{key}, {t}, {mode}, {cardinality}]",
            key = self.key,
            t = self.type_name,
            mode = self.value_mode,
            cardinality = self.cardinality,
        )
    }
}

impl<'a> Adapter<'a> {
    pub(crate) fn used(&self) -> bool {
        self.uses > 0
    }

    pub(crate) fn is_builtin(&self) -> bool {
        !matches!(self.builtin, Builtin::User | Builtin::Group(_))
    }

    /// The count the cardinality constrains: values for value-taking
    /// arguments, uses for value-less ones.
    fn counted(&self) -> usize {
        match self.value_mode {
            ValueMode::None => self.uses,
            _ => self.values,
        }
    }

    fn open_for_values(&self) -> bool {
        match self.cardinality.upper() {
            Some(upper) => self.values < upper,
            None => true,
        }
    }
}

/// One handler scope: a key space with its constraints, linked to its parent
/// when it is a sub-group.
#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) title: String,
    pub(crate) about: Option<String>,
    pub(crate) adapter_ids: Vec<usize>,
    pub(crate) table: KeyTable,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) parent: Option<usize>,
    pub(crate) group_key: Option<ArgumentKey>,
    pub(crate) abbreviations: bool,
    pub(crate) used: bool,
}

/// The assembled, type-erased evaluation engine: every adapter of every
/// handler/sub-group/aggregated member in one arena, with scopes referencing
/// them by identity.
pub(crate) struct Engine<'a> {
    pub(crate) adapters: Vec<Adapter<'a>>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) roots: Vec<usize>,
}

impl<'a> std::fmt::Debug for Engine<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine{..}").finish()
    }
}

struct Flow {
    cursor: usize,
    scope: usize,
    active: Option<usize>,
    expect_child: Option<usize>,
    show_hidden: bool,
    show_deprecated: bool,
    stop: bool,
}

impl<'a> Engine<'a> {
    pub(crate) fn new() -> Self {
        Self {
            adapters: Vec::default(),
            scopes: Vec::default(),
            roots: Vec::default(),
        }
    }

    /// Evaluate the token stream: the single synchronous pass over all
    /// tokens, followed by the end-of-loop verification (lower cardinality
    /// bounds, mandatory usage, cross-argument constraints).
    pub(crate) fn run(
        mut self,
        tokens: &[&str],
        interface: &dyn UserInterface,
    ) -> Result<Evaluation, EvalError> {
        let mut flow = Flow {
            cursor: 0,
            scope: *self
                .roots
                .first()
                .expect("internal error - an engine must have at least one root scope"),
            active: None,
            expect_child: None,
            show_hidden: false,
            show_deprecated: false,
            stop: false,
        };

        while flow.cursor < tokens.len() && !flow.stop {
            let token = tokens[flow.cursor];
            flow.cursor += 1;

            #[cfg(feature = "tracing_debug")]
            {
                debug!("token '{token}' in scope {scope}", scope = flow.scope);
            }

            match classify(token) {
                Token::Long { name, value } => {
                    let id = self.resolve_long(&mut flow, name)?;
                    self.handle_key(&mut flow, id, value, tokens, interface)?;
                }
                Token::Shorts { chars, value } => {
                    self.handle_shorts(&mut flow, chars, value, token, tokens, interface)?;
                }
                Token::Value(value) => {
                    self.handle_value(&mut flow, value)?;
                }
            }
        }

        if flow.stop {
            return Ok(Evaluation::HelpShown);
        }

        self.verify()?;
        Ok(Evaluation::Complete)
    }

    /// The scope resolution path: the current scope chain towards its root,
    /// then any remaining root scopes in registration order.
    fn path(&self, flow: &Flow) -> Vec<usize> {
        if let Some(child) = flow.expect_child {
            return vec![child];
        }

        let mut path = Vec::default();
        let mut next = Some(flow.scope);

        while let Some(scope) = next {
            path.push(scope);
            next = self.scopes[scope].parent;
        }

        for root in &self.roots {
            if !path.contains(root) {
                path.push(*root);
            }
        }

        path
    }

    fn resolve_long(&self, flow: &mut Flow, name: &str) -> Result<usize, EvalError> {
        let path = self.path(flow);

        for scope in &path {
            if let Some(id) = self.scopes[*scope].table.exact_long(name) {
                self.note_resolution(flow);
                return Ok(id);
            }
        }

        let mut candidates: Vec<(String, usize)> = Vec::default();

        for scope in &path {
            if !self.scopes[*scope].abbreviations {
                continue;
            }

            for (candidate, id) in self.scopes[*scope].table.candidates(name) {
                // The innermost scope wins a shared name.
                if !candidates.iter().any(|(existing, _)| existing == &candidate) {
                    candidates.push((candidate, id));
                }
            }
        }

        candidates.sort();

        match candidates.as_slice() {
            [] => Err(self.unresolved(flow, format!("--{name}"))),
            [(_, id)] => {
                self.note_resolution(flow);
                Ok(*id)
            }
            _ => Err(EvalError::AmbiguousArgument {
                argument: format!("--{name}"),
                candidates: candidates
                    .into_iter()
                    .map(|(candidate, _)| format!("--{candidate}"))
                    .collect::<Vec<String>>()
                    .join(", "),
            }),
        }
    }

    fn resolve_short(&self, flow: &mut Flow, short: char) -> Result<usize, EvalError> {
        let path = self.path(flow);

        for scope in &path {
            if let Some(id) = self.scopes[*scope].table.resolve_short(short) {
                self.note_resolution(flow);
                return Ok(id);
            }
        }

        Err(self.unresolved(flow, format!("-{short}")))
    }

    /// A key resolution inside a pending sub-group satisfies the
    /// expectation; resolution elsewhere is unaffected.
    fn note_resolution(&self, flow: &mut Flow) {
        flow.expect_child = None;
    }

    fn unresolved(&self, flow: &Flow, display: String) -> EvalError {
        match flow.expect_child {
            Some(child) => {
                EvalError::SubGroupUnknown(self.group_path(child, display.trim_start_matches('-')))
            }
            None => EvalError::UnknownArgument(display),
        }
    }

    /// Render a sub-group path for error messages, ex: `-g/x`.
    fn group_path(&self, scope: usize, leaf: &str) -> String {
        let mut segments = Vec::default();
        let mut next = Some(scope);

        while let Some(current) = next {
            if let Some(key) = &self.scopes[current].group_key {
                segments.push(key.preferred_form());
            }

            next = self.scopes[current].parent;
        }

        segments.reverse();
        segments.push(leaf.to_string());
        segments.join("/")
    }

    fn handle_shorts(
        &mut self,
        flow: &mut Flow,
        chars: &str,
        value: Option<&str>,
        token: &str,
        tokens: &[&str],
        interface: &dyn UserInterface,
    ) -> Result<(), EvalError> {
        // An unresolvable single-dash token that looks like a negative
        // number is re-routed as a value, ex: `-5` or `-2.5`.
        if value.is_none() && numberish(chars) {
            let first = chars
                .chars()
                .next()
                .expect("internal error - a shorts run cannot be empty");

            if self
                .path(flow)
                .iter()
                .all(|scope| self.scopes[*scope].table.resolve_short(first).is_none())
            {
                return self.handle_value(flow, token);
            }
        }

        let count = chars.chars().count();

        for (index, short) in chars.chars().enumerate() {
            let id = self.resolve_short(flow, short)?;

            if index + 1 == count {
                self.handle_key(flow, id, value, tokens, interface)?;
            } else {
                // Only the final short of a combined run may take values.
                let adapter = &self.adapters[id];
                if adapter.value_mode == ValueMode::Required {
                    return Err(EvalError::MissingValue(adapter.key.to_string()));
                }

                self.handle_key(flow, id, None, &[], interface)?;
            }
        }

        Ok(())
    }

    fn handle_key(
        &mut self,
        flow: &mut Flow,
        id: usize,
        inline_value: Option<&str>,
        tokens: &[&str],
        interface: &dyn UserInterface,
    ) -> Result<(), EvalError> {
        let builtin = self.adapters[id].builtin;

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "matched '{key}' ({builtin:?})",
                key = self.adapters[id].key
            );
        }

        match builtin {
            Builtin::Help => {
                self.reject_inline(id, inline_value)?;
                self.adapters[id].uses += 1;
                printer::usage(self, flow.show_hidden, flow.show_deprecated, interface);
                flow.stop = true;
                Ok(())
            }
            Builtin::HelpFor => {
                self.adapters[id].uses += 1;
                let spec = match inline_value {
                    Some(value) => value.to_string(),
                    None => match tokens.get(flow.cursor).map(|token| classify(token)) {
                        Some(Token::Value(value)) => {
                            flow.cursor += 1;
                            value.to_string()
                        }
                        _ => {
                            return Err(EvalError::MissingValue(
                                self.adapters[id].key.to_string(),
                            ))
                        }
                    },
                };
                self.help_for(&spec, interface)?;
                flow.active = None;
                Ok(())
            }
            Builtin::ListVars => {
                self.reject_inline(id, inline_value)?;
                self.adapters[id].uses += 1;
                printer::variables(self, interface);
                Ok(())
            }
            Builtin::ShowHidden => {
                self.reject_inline(id, inline_value)?;
                self.adapters[id].uses += 1;
                flow.show_hidden = true;
                Ok(())
            }
            Builtin::ShowDeprecated => {
                self.reject_inline(id, inline_value)?;
                self.adapters[id].uses += 1;
                flow.show_deprecated = true;
                Ok(())
            }
            Builtin::EndValues => {
                self.reject_inline(id, inline_value)?;
                self.adapters[id].uses += 1;
                flow.active = None;
                Ok(())
            }
            Builtin::Group(scope) => {
                self.reject_inline(id, inline_value)?;
                let adapter = &mut self.adapters[id];
                adapter.uses += 1;

                if let Some(upper) = adapter.cardinality.upper() {
                    if adapter.uses > upper {
                        return Err(EvalError::Cardinality {
                            key: adapter.key.to_string(),
                            expected: adapter.cardinality.to_string(),
                            provided: adapter.uses,
                        });
                    }
                }

                self.scopes[scope].used = true;
                flow.scope = scope;
                flow.expect_child = Some(scope);
                flow.active = None;
                Ok(())
            }
            Builtin::User => self.handle_user_key(flow, id, inline_value, tokens),
        }
    }

    /// Peek the next token as an argument value.  Besides plain values,
    /// accepts an unresolvable single-dash token that looks like a negative
    /// number, ex: `-5` or `-2.5`.
    fn peek_value<'t>(&self, flow: &Flow, tokens: &[&'t str]) -> Option<&'t str> {
        let token = *tokens.get(flow.cursor)?;

        match classify(token) {
            Token::Value(value) => Some(value),
            Token::Shorts { chars, value: None } if numberish(chars) => {
                let first = chars
                    .chars()
                    .next()
                    .expect("internal error - a shorts run cannot be empty");

                if self
                    .path(flow)
                    .iter()
                    .all(|scope| self.scopes[*scope].table.resolve_short(first).is_none())
                {
                    Some(token)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn reject_inline(&self, id: usize, inline_value: Option<&str>) -> Result<(), EvalError> {
        if inline_value.is_some() {
            Err(EvalError::UnexpectedValue(
                self.adapters[id].key.to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn handle_user_key(
        &mut self,
        flow: &mut Flow,
        id: usize,
        inline_value: Option<&str>,
        tokens: &[&str],
    ) -> Result<(), EvalError> {
        {
            let adapter = &self.adapters[id];

            if adapter.deprecated {
                return Err(EvalError::Deprecated(adapter.key.to_string()));
            }

            if let Some(replacement) = &adapter.replaced_by {
                return Err(EvalError::Replaced {
                    key: adapter.key.to_string(),
                    replacement: replacement.clone(),
                });
            }
        }

        let adapter = &mut self.adapters[id];
        adapter.uses += 1;

        if adapter.value_mode == ValueMode::None {
            if inline_value.is_some() {
                return Err(EvalError::UnexpectedValue(adapter.key.to_string()));
            }

            if let Some(upper) = adapter.cardinality.upper() {
                if adapter.uses > upper {
                    return Err(EvalError::Cardinality {
                        key: adapter.key.to_string(),
                        expected: adapter.cardinality.to_string(),
                        provided: adapter.uses,
                    });
                }
            }

            adapter.sink.matched();
            flow.active = None;
            return Ok(());
        }

        adapter.sink.matched();
        let multi_value = adapter.multi_value;
        let value_mode = adapter.value_mode;

        match inline_value {
            Some(value) => {
                // Key=value syntax cannot follow up with more values afterwards.
                self.assign_values(id, value)?;
                flow.active = None;
            }
            None => match self.peek_value(flow, tokens) {
                Some(value) => {
                    flow.cursor += 1;
                    self.assign_values(id, value)?;
                    flow.active = if multi_value { Some(id) } else { None };
                }
                None => {
                    if value_mode == ValueMode::Required {
                        return Err(EvalError::MissingValue(
                            self.adapters[id].key.to_string(),
                        ));
                    }

                    flow.active = None;
                }
            },
        }

        Ok(())
    }

    fn handle_value(&mut self, flow: &mut Flow, value: &str) -> Result<(), EvalError> {
        if let Some(child) = flow.expect_child {
            return Err(EvalError::SubGroupUnknown(self.group_path(child, value)));
        }

        if let Some(id) = flow.active {
            if self.adapters[id].open_for_values() {
                return self.assign_values(id, value);
            }

            flow.active = None;
        }

        let free = self
            .path(flow)
            .into_iter()
            .find_map(|scope| self.scopes[scope].table.free());

        match free {
            Some(id) => {
                self.adapters[id].uses += 1;
                self.adapters[id].sink.matched();
                self.assign_values(id, value)
            }
            None => Err(EvalError::UnexpectedFreeValue(value.to_string())),
        }
    }

    /// Split one raw value token (for multi-slot destinations), format,
    /// convert, check, and commit each piece.
    fn assign_values(&mut self, id: usize, raw: &str) -> Result<(), EvalError> {
        let adapter = &mut self.adapters[id];
        let parts: Vec<&str> = match adapter.arity {
            Arity::Many | Arity::Fixed(_) => split_list(raw, adapter.separator),
            _ => vec![raw],
        };

        for part in parts {
            if let Some(upper) = adapter.cardinality.upper() {
                if adapter.values >= upper {
                    return Err(EvalError::Cardinality {
                        key: adapter.key.to_string(),
                        expected: adapter.cardinality.to_string(),
                        provided: adapter.values + 1,
                    });
                }
            }

            let mut formatted = part.to_string();

            for format in &adapter.formats {
                formatted = format.apply(formatted);
            }

            adapter
                .sink
                .assign(&formatted)
                .map_err(|error| sink_error(&adapter.key, error))?;
            adapter.values += 1;
        }

        Ok(())
    }

    fn help_for(&self, spec: &str, interface: &dyn UserInterface) -> Result<(), EvalError> {
        let key = ArgumentKey::parse(spec.trim_start_matches('-'))
            .map_err(|error| EvalError::Setup(SetupError::from(error)))?;

        let adapter = self
            .adapters
            .iter()
            .find(|adapter| adapter.key.intersects(&key))
            .ok_or_else(|| EvalError::UnknownArgument(key.to_string()))?;

        printer::argument_detail(adapter, interface);
        Ok(())
    }

    /// The end-of-loop verification: mandatory usage, lower cardinality
    /// bounds, destination post-processing, then cross-argument constraints.
    /// Sub-group scopes are verified only when the group was entered.
    fn verify(&mut self) -> Result<(), EvalError> {
        for scope in 0..self.scopes.len() {
            if !self.scopes[scope].used {
                continue;
            }

            for index in 0..self.scopes[scope].adapter_ids.len() {
                let id = self.scopes[scope].adapter_ids[index];
                let adapter = &mut self.adapters[id];

                if adapter.is_builtin() {
                    continue;
                }

                if adapter.mandatory && !adapter.used() {
                    return Err(EvalError::MandatoryNotUsed(adapter.key.to_string()));
                }

                if adapter.used() {
                    let counted = adapter.counted();

                    if counted < adapter.cardinality.lower() {
                        return Err(EvalError::Cardinality {
                            key: adapter.key.to_string(),
                            expected: adapter.cardinality.to_string(),
                            provided: counted,
                        });
                    }

                    adapter
                        .sink
                        .finish()
                        .map_err(|error| sink_error(&adapter.key, error))?;
                }
            }

            for constraint in &self.scopes[scope].constraints {
                constraint.evaluate(
                    |id| self.adapters[id].used(),
                    |id| self.adapters[id].key.to_string(),
                )?;
            }
        }

        Ok(())
    }
}

fn sink_error(key: &ArgumentKey, error: AssignError) -> EvalError {
    match error {
        AssignError::InvalidConversion { token, type_name } => EvalError::Conversion {
            key: key.to_string(),
            token,
            type_name: type_name.to_string(),
        },
        AssignError::Rejected { token, message } => EvalError::InvalidValue {
            key: key.to_string(),
            token,
            message,
        },
        AssignError::OverCapacity { expected } => EvalError::Cardinality {
            key: key.to_string(),
            expected: format!("exactly {expected}"),
            provided: expected + 1,
        },
        AssignError::FailedCheck(message) => EvalError::Check {
            key: key.to_string(),
            message,
        },
    }
}
