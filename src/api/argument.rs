use crate::api::capture::Typed;
use crate::check::Check;
use crate::constant::LIST_SEPARATOR_DEFAULT;
use crate::format::Format;
use crate::model::{Arity, Cardinality, ValueMode};

pub(crate) struct ArgumentInner<'a, T> {
    pub(crate) spec: String,
    pub(crate) field: Box<dyn Typed<'a, T> + 'a>,
    pub(crate) arity: Arity,
    pub(crate) type_name: &'static str,
    pub(crate) value_mode: Option<ValueMode>,
    pub(crate) cardinality: Option<Cardinality>,
    pub(crate) mandatory: bool,
    pub(crate) hidden: bool,
    pub(crate) deprecated: bool,
    pub(crate) replaced_by: Option<String>,
    pub(crate) separator: char,
    pub(crate) multi_value: bool,
    pub(crate) help: Option<String>,
    pub(crate) checks: Vec<Box<dyn Check<T> + 'a>>,
    pub(crate) check_notes: Vec<String>,
    pub(crate) formats: Vec<Box<dyn Format + 'a>>,
    pub(crate) requires: Vec<String>,
    pub(crate) excludes: Vec<String>,
}

impl<'a, T> std::fmt::Debug for ArgumentInner<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Argument[{spec}, {t}, {arity:?}]",
            spec = self.spec,
            t = self.type_name,
            arity = self.arity,
        )
    }
}

/// One argument declaration for a [`Handler`](crate::Handler).
///
/// Binds a key specification (`"v"`, `"verbose"`, `"v,verbose"`, or the free
/// value marker `"-"`) to a destination field, then carries the argument's
/// behaviour through chained builder calls.
///
/// ### Example
/// ```
/// use argot::{check, Argument, Scalar, Switch};
///
/// let mut verbose: bool = false;
/// let mut retries: u32 = 0;
/// Argument::new("v,verbose", Switch::new(&mut verbose, true))
///     .help("Make the program output verbose.");
/// Argument::new("retries", Scalar::new(&mut retries))
///     .check(check::range(0, 5))
///     .help("How often to retry the download.");
/// ```
pub struct Argument<'a, T>(ArgumentInner<'a, T>);

impl<'a, T> Argument<'a, T> {
    /// Declare an argument under the given key specification.
    pub fn new(spec: impl Into<String>, field: impl Typed<'a, T> + 'a) -> Self {
        let arity = field.arity();
        Self(ArgumentInner {
            spec: spec.into(),
            field: Box::new(field),
            arity,
            type_name: std::any::type_name::<T>(),
            value_mode: None,
            cardinality: None,
            mandatory: false,
            hidden: false,
            deprecated: false,
            replaced_by: None,
            separator: LIST_SEPARATOR_DEFAULT,
            multi_value: false,
            help: None,
            checks: Vec::default(),
            check_notes: Vec::default(),
            formats: Vec::default(),
            requires: Vec::default(),
            excludes: Vec::default(),
        })
    }

    /// Document the help message for this argument.
    /// If repeated, only the final message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.0.help = Some(description.into());
        self
    }

    /// Require this argument to be used on the command line.
    pub fn mandatory(mut self) -> Self {
        self.0.mandatory = true;
        self
    }

    /// Exclude this argument from the usage output (still functional; shown
    /// under `--print-hidden`).
    pub fn hidden(mut self) -> Self {
        self.0.hidden = true;
        self
    }

    /// Mark this argument as deprecated: using it fails the evaluation.
    pub fn deprecated(mut self) -> Self {
        self.0.deprecated = true;
        self
    }

    /// Mark this argument as replaced: using it fails the evaluation, naming
    /// the replacement key.
    pub fn replaced_by(mut self, replacement: impl Into<String>) -> Self {
        self.0.replaced_by = Some(replacement.into());
        self
    }

    /// Make the value optional: the key alone is accepted, a following value
    /// is consumed when present.
    pub fn value_optional(mut self) -> Self {
        self.0.value_mode = Some(ValueMode::Optional);
        self
    }

    /// Constrain how many values (or uses, for a value-less argument) are
    /// accepted.  Defaults per destination field: one value for single-value
    /// fields, any number for sequence/associative fields, the array size
    /// for fixed fields, and at most one use for value-less fields.
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.0.cardinality = Some(cardinality);
        self
    }

    /// Change the list separator used to split one value token into multiple
    /// values (default `,`).
    pub fn separator(mut self, separator: char) -> Self {
        self.0.separator = separator;
        self
    }

    /// Let this argument consume multiple following whitespace-separated
    /// value tokens, until a key token, the end-of-values marker, or the
    /// cardinality upper bound.
    pub fn multi_value(mut self) -> Self {
        self.0.multi_value = true;
        self
    }

    /// Attach a value check, applied after conversion in registration order.
    pub fn check(mut self, check: impl Check<T> + 'a) -> Self {
        self.0.check_notes.push(check.describe());
        self.0.checks.push(Box::new(check));
        self
    }

    /// Attach a formatter, applied to the raw string before conversion in
    /// registration order.
    pub fn format(mut self, format: impl Format + 'a) -> Self {
        self.0.formats.push(Box::new(format));
        self
    }

    /// Require the referenced argument to be used whenever this one is.
    pub fn requires(mut self, spec: impl Into<String>) -> Self {
        self.0.requires.push(spec.into());
        self
    }

    /// Reject the referenced argument whenever this one is used.
    pub fn excludes(mut self, spec: impl Into<String>) -> Self {
        self.0.excludes.push(spec.into());
        self
    }

    pub(crate) fn consume(self) -> ArgumentInner<'a, T> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::field::{List, Scalar, Switch};
    use crate::check;

    #[test]
    fn defaults() {
        let mut variable: u32 = 0;
        let inner = Argument::new("v,value", Scalar::new(&mut variable)).consume();

        assert_eq!(inner.spec, "v,value");
        assert_eq!(inner.arity, Arity::One);
        assert_eq!(inner.value_mode, None);
        assert_eq!(inner.cardinality, None);
        assert!(!inner.mandatory);
        assert!(!inner.hidden);
        assert!(!inner.deprecated);
        assert_eq!(inner.replaced_by, None);
        assert_eq!(inner.separator, ',');
        assert!(!inner.multi_value);
        assert_eq!(inner.help, None);
        assert!(inner.checks.is_empty());
        assert!(inner.formats.is_empty());
        assert!(inner.requires.is_empty());
        assert!(inner.excludes.is_empty());
    }

    #[test]
    fn chained() {
        let mut items: Vec<u32> = Vec::default();
        let inner = Argument::new("i,item", List::new(&mut items))
            .help("--this will get discarded--")
            .help("The items.")
            .mandatory()
            .hidden()
            .cardinality(Cardinality::Range(1, 3))
            .separator(':')
            .multi_value()
            .check(check::range(0, 10))
            .requires("v,verbose")
            .excludes("quiet")
            .consume();

        assert_eq!(inner.arity, Arity::Many);
        assert_eq!(inner.help, Some("The items.".to_string()));
        assert!(inner.mandatory);
        assert!(inner.hidden);
        assert_eq!(inner.cardinality, Some(Cardinality::Range(1, 3)));
        assert_eq!(inner.separator, ':');
        assert!(inner.multi_value);
        assert_eq!(inner.checks.len(), 1);
        assert_eq!(inner.check_notes, vec!["in range [0, 10]".to_string()]);
        assert_eq!(inner.requires, vec!["v,verbose".to_string()]);
        assert_eq!(inner.excludes, vec!["quiet".to_string()]);
    }

    #[test]
    fn deprecation() {
        let mut variable: bool = false;
        let inner = Argument::new("legacy", Switch::new(&mut variable, true))
            .deprecated()
            .consume();
        assert!(inner.deprecated);

        let mut variable: bool = false;
        let inner = Argument::new("legacy", Switch::new(&mut variable, true))
            .replaced_by("modern")
            .consume();
        assert_eq!(inner.replaced_by, Some("modern".to_string()));
    }

    #[test]
    fn value_optional() {
        let mut variable: u32 = 0;
        let inner = Argument::new("value", Scalar::new(&mut variable))
            .value_optional()
            .consume();
        assert_eq!(inner.value_mode, Some(ValueMode::Optional));
    }

    #[test]
    fn debug() {
        let mut variable: u32 = 0;
        let inner = Argument::new("v,value", Scalar::new(&mut variable)).consume();
        assert_eq!(format!("{inner:?}"), "Argument[v,value, u32, One]");
    }
}
