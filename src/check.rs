//! Value checks, applied to a converted value at assignment time.
//!
//! A failing check aborts the evaluation with an error naming the argument
//! and the violated rule.

use std::fmt::Display;
use std::path::Path;

use regex::Regex;

/// Behaviour to validate a converted value `T` before it is committed to the
/// destination.
pub trait Check<T> {
    /// Validate the value, returning the violated rule on rejection.
    fn check(&self, value: &T) -> Result<(), String>;

    /// Describe the accepted values (used by the detailed argument help).
    fn describe(&self) -> String;
}

/// Accept values within the inclusive range `[low, high]`.
pub fn range<T: PartialOrd + Display>(low: T, high: T) -> RangeCheck<T> {
    RangeCheck { low, high }
}

/// The check behind [`range`].
pub struct RangeCheck<T> {
    low: T,
    high: T,
}

impl<T: PartialOrd + Display> Check<T> for RangeCheck<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if value < &self.low || value > &self.high {
            Err(format!(
                "value {value} is out of range [{low}, {high}]",
                low = self.low,
                high = self.high
            ))
        } else {
            Ok(())
        }
    }

    fn describe(&self) -> String {
        format!("in range [{low}, {high}]", low = self.low, high = self.high)
    }
}

/// Accept only the listed values.
pub fn values<T: PartialEq + Display>(allowed: Vec<T>) -> ValuesCheck<T> {
    ValuesCheck { allowed }
}

/// The check behind [`values`].
pub struct ValuesCheck<T> {
    allowed: Vec<T>,
}

impl<T: PartialEq + Display> Check<T> for ValuesCheck<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if self.allowed.iter().any(|a| a == value) {
            Ok(())
        } else {
            Err(format!(
                "value {value} is not one of {{{}}}",
                self.listing()
            ))
        }
    }

    fn describe(&self) -> String {
        format!("one of {{{}}}", self.listing())
    }
}

impl<T: Display> ValuesCheck<T> {
    fn listing(&self) -> String {
        self.allowed
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<String>>()
            .join(", ")
    }
}

/// Accept values fully matching the regular expression `pattern`.
///
/// An invalid expression is not reported until a value is checked against it.
pub fn pattern(pattern: &str) -> PatternCheck {
    PatternCheck {
        pattern: pattern.to_string(),
        regex: Regex::new(&format!("^(?:{pattern})$")),
    }
}

/// The check behind [`pattern`].
pub struct PatternCheck {
    pattern: String,
    regex: Result<Regex, regex::Error>,
}

impl Check<String> for PatternCheck {
    fn check(&self, value: &String) -> Result<(), String> {
        match &self.regex {
            Ok(regex) => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(format!(
                        "value '{value}' does not match the pattern '{pattern}'",
                        pattern = self.pattern
                    ))
                }
            }
            Err(error) => Err(format!(
                "invalid pattern '{pattern}': {error}",
                pattern = self.pattern
            )),
        }
    }

    fn describe(&self) -> String {
        format!("matching the pattern '{pattern}'", pattern = self.pattern)
    }
}

/// Accept paths naming an existing regular file.
pub fn is_file() -> IsFileCheck {
    IsFileCheck {}
}

/// The check behind [`is_file`].
pub struct IsFileCheck {}

impl<T: AsRef<Path> + Display> Check<T> for IsFileCheck {
    fn check(&self, value: &T) -> Result<(), String> {
        if value.as_ref().is_file() {
            Ok(())
        } else {
            Err(format!("'{value}' is not an existing file"))
        }
    }

    fn describe(&self) -> String {
        "an existing file".to_string()
    }
}

/// Accept paths naming an existing directory.
pub fn is_directory() -> IsDirectoryCheck {
    IsDirectoryCheck {}
}

/// The check behind [`is_directory`].
pub struct IsDirectoryCheck {}

impl<T: AsRef<Path> + Display> Check<T> for IsDirectoryCheck {
    fn check(&self, value: &T) -> Result<(), String> {
        if value.as_ref().is_dir() {
            Ok(())
        } else {
            Err(format!("'{value}' is not an existing directory"))
        }
    }

    fn describe(&self) -> String {
        "an existing directory".to_string()
    }
}

/// Accept paths whose parent directory exists.
pub fn parent_exists() -> ParentExistsCheck {
    ParentExistsCheck {}
}

/// The check behind [`parent_exists`].
pub struct ParentExistsCheck {}

impl<T: AsRef<Path> + Display> Check<T> for ParentExistsCheck {
    fn check(&self, value: &T) -> Result<(), String> {
        // A bare filename has the empty parent, which is the working directory.
        let exists = match value.as_ref().parent() {
            Some(parent) if parent.as_os_str().is_empty() => true,
            Some(parent) => parent.is_dir(),
            None => false,
        };

        if exists {
            Ok(())
        } else {
            Err(format!("the parent directory of '{value}' does not exist"))
        }
    }

    fn describe(&self) -> String {
        "a path under an existing directory".to_string()
    }
}

/// Build a check from a description and a predicate.
pub fn verify<T, F>(description: impl Into<String>, predicate: F) -> VerifyCheck<F>
where
    F: Fn(&T) -> Result<(), String>,
{
    VerifyCheck {
        description: description.into(),
        predicate,
    }
}

/// The check behind [`verify`].
pub struct VerifyCheck<F> {
    description: String,
    predicate: F,
}

impl<T, F> Check<T> for VerifyCheck<F>
where
    F: Fn(&T) -> Result<(), String>,
{
    fn check(&self, value: &T) -> Result<(), String> {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}
