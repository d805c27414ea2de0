use thiserror::Error;

/// The allowed count of values (or uses, for value-less arguments) of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Any number of values, including `0`.
    Any,
    /// Precisely `N` values.
    Exact(usize),
    /// At most `N` values.
    Max(usize),
    /// Between `N` and `M` values (inclusive).
    Range(usize, usize),
}

impl Cardinality {
    pub(crate) fn lower(&self) -> usize {
        match self {
            Cardinality::Any | Cardinality::Max(_) => 0,
            Cardinality::Exact(n) => *n,
            Cardinality::Range(n, _) => *n,
        }
    }

    pub(crate) fn upper(&self) -> Option<usize> {
        match self {
            Cardinality::Any => None,
            Cardinality::Exact(n) | Cardinality::Max(n) => Some(*n),
            Cardinality::Range(_, m) => Some(*m),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Any => write!(f, "any number"),
            Cardinality::Exact(n) => write!(f, "exactly {n}"),
            Cardinality::Max(n) => write!(f, "at most {n}"),
            Cardinality::Range(n, m) => write!(f, "between {n} and {m}"),
        }
    }
}

/// Whether an argument takes a value on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// The argument takes no value (a flag).
    None,
    /// The argument may take a value; the key alone is also accepted.
    Optional,
    /// The argument must be followed by a value.
    Required,
}

impl std::fmt::Display for ValueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueMode::None => write!(f, "none"),
            ValueMode::Optional => write!(f, "optional"),
            ValueMode::Required => write!(f, "required"),
        }
    }
}

/// How many value slots a destination field exposes.
///
/// Derived from the field, never specified directly.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Many,
    Fixed(usize),
}

impl Arity {
    pub(crate) fn takes_values(&self) -> bool {
        !matches!(self, Arity::None)
    }

    pub(crate) fn default_cardinality(&self) -> Cardinality {
        match self {
            Arity::None => Cardinality::Max(1),
            Arity::One => Cardinality::Exact(1),
            Arity::Many => Cardinality::Any,
            Arity::Fixed(n) => Cardinality::Exact(*n),
        }
    }

    pub(crate) fn default_value_mode(&self) -> ValueMode {
        match self {
            Arity::None => ValueMode::None,
            _ => ValueMode::Required,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum KeyError {
    #[error("empty argument key specification.")]
    Empty,

    #[error("invalid character '{1}' in argument key '{0}'.")]
    InvalidCharacter(String, char),

    #[error("argument key '{0}' repeats its {1} form.")]
    RepeatedForm(String, &'static str),

    #[error("the free value marker '-' cannot combine with other key forms.")]
    MixedFreeMarker,
}

/// The normalized short and/or long identifier of one argument.
///
/// Parsed from a key specification string: `"v"`, `"verbose"`, `"v,verbose"`,
/// or the free value marker `"-"`.  A short form is a single alphanumeric
/// character; anything longer is a long form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentKey {
    short: Option<char>,
    long: Option<String>,
    free: bool,
}

impl ArgumentKey {
    pub(crate) fn parse(spec: &str) -> Result<Self, KeyError> {
        if spec.trim().is_empty() {
            return Err(KeyError::Empty);
        }

        if spec.trim() == "-" {
            return Ok(ArgumentKey {
                short: None,
                long: None,
                free: true,
            });
        }

        let mut short: Option<char> = None;
        let mut long: Option<String> = None;

        for part in spec.split(',') {
            let part = part.trim();

            if part == "-" {
                return Err(KeyError::MixedFreeMarker);
            }

            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (None, _) => return Err(KeyError::Empty),
                (Some(single), None) => {
                    if !single.is_ascii_alphanumeric() {
                        return Err(KeyError::InvalidCharacter(spec.to_string(), single));
                    }

                    if short.replace(single).is_some() {
                        return Err(KeyError::RepeatedForm(spec.to_string(), "short"));
                    }
                }
                (Some(_), Some(_)) => {
                    for (index, c) in part.chars().enumerate() {
                        let valid = if index == 0 {
                            c.is_ascii_alphanumeric()
                        } else {
                            c.is_ascii_alphanumeric() || c == '-' || c == '_'
                        };

                        if !valid {
                            return Err(KeyError::InvalidCharacter(spec.to_string(), c));
                        }
                    }

                    if long.replace(part.to_string()).is_some() {
                        return Err(KeyError::RepeatedForm(spec.to_string(), "long"));
                    }
                }
            }
        }

        Ok(ArgumentKey {
            short,
            long,
            free: false,
        })
    }

    pub(crate) fn free() -> Self {
        ArgumentKey {
            short: None,
            long: None,
            free: true,
        }
    }

    pub(crate) fn from_long(long: impl Into<String>) -> Self {
        ArgumentKey {
            short: None,
            long: Some(long.into()),
            free: false,
        }
    }

    pub(crate) fn from_forms(short: Option<char>, long: Option<&str>) -> Self {
        ArgumentKey {
            short,
            long: long.map(|l| l.to_string()),
            free: false,
        }
    }

    pub(crate) fn short(&self) -> Option<char> {
        self.short
    }

    pub(crate) fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub(crate) fn is_free(&self) -> bool {
        self.free
    }

    /// The shortest usable form: `-s` when a short form exists, else
    /// `--long`.
    pub(crate) fn preferred_form(&self) -> String {
        if self.free {
            return "-".to_string();
        }

        match (&self.short, &self.long) {
            (Some(short), _) => format!("-{short}"),
            (None, Some(long)) => format!("--{long}"),
            (None, None) => unreachable!("internal error - key must carry at least one form"),
        }
    }

    /// Whether `other` names the same argument through at least one form.
    pub(crate) fn intersects(&self, other: &ArgumentKey) -> bool {
        if self.free || other.free {
            return self.free == other.free;
        }

        let short_hit = matches!((self.short, other.short), (Some(a), Some(b)) if a == b);
        let long_hit =
            matches!((&self.long, &other.long), (Some(a), Some(b)) if a == b);
        short_hit || long_hit
    }
}

impl std::fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.free {
            return write!(f, "-");
        }

        match (&self.short, &self.long) {
            (Some(s), Some(l)) => write!(f, "-{s},--{l}"),
            (Some(s), None) => write!(f, "-{s}"),
            (None, Some(l)) => write!(f, "--{l}"),
            (None, None) => unreachable!("internal error - key must carry at least one form"),
        }
    }
}
