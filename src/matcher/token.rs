/// One classified command line token.
///
/// Classification is purely syntactic; resolving names against the key space
/// happens in the evaluation loop.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    /// `--name` or `--name=value`.
    Long {
        name: &'t str,
        value: Option<&'t str>,
    },
    /// `-x`, `-xyz`, or `-x=value` (only the final short may take the value).
    Shorts {
        chars: &'t str,
        value: Option<&'t str>,
    },
    /// Anything else: a candidate argument value or free value.
    Value(&'t str),
}

pub(crate) fn classify(token: &str) -> Token<'_> {
    // 1. Find a 'long' key, such as:
    //  --input
    //  --input=..
    // 2. Find 'short' key(s), such as (both -i and -v are example short keys):
    //  -i
    //  -iv
    //  -i=..
    // 3. Everything else is a value.
    // The bare tokens '-' and '--' carry no key name and stay values.
    if let Some(rest) = token.strip_prefix("--") {
        if rest.is_empty() {
            return Token::Value(token);
        }

        let (name, value) = split_equals(rest);
        Token::Long { name, value }
    } else if let Some(rest) = token.strip_prefix('-') {
        if rest.is_empty() || rest.starts_with('=') {
            return Token::Value(token);
        }

        let (chars, value) = split_equals(rest);
        Token::Shorts { chars, value }
    } else {
        Token::Value(token)
    }
}

pub(crate) fn split_equals(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

/// Split a raw value token on the configured list separator.
pub(crate) fn split_list(value: &str, separator: char) -> Vec<&str> {
    value.split(separator).collect()
}

/// Whether a short-key run could instead be a negative number literal;
/// used to re-route unresolvable tokens like `-5` or `-2.5` as values.
pub(crate) fn numberish(chars: &str) -> bool {
    !chars.is_empty() && chars.chars().all(|c| c.is_ascii_digit() || c == '.')
}
