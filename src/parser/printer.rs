use terminal_size::{terminal_size, Width};

use crate::model::{Arity, ValueMode};
use crate::parser::base::{Adapter, Builtin, Engine};
use crate::parser::interface::UserInterface;

const PADDING: usize = 2;
const INDENT: usize = 1;
// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
const MINIMUM_HELP_WIDTH: usize = 17;
const DEFAULT_TOTAL_WIDTH: usize = 80;
const LEFT_WIDTH_CAP: usize = 28;

fn total_width() -> usize {
    if let Some((Width(width), _)) = terminal_size() {
        width as usize
    } else {
        DEFAULT_TOTAL_WIDTH
    }
}

/// Render the usage output: one usage line per root scope, then the
/// argument listing of every scope (sub-groups after their parent).
pub(crate) fn usage(
    engine: &Engine,
    show_hidden: bool,
    show_deprecated: bool,
    interface: &dyn UserInterface,
) {
    let width = total_width();

    for &root in &engine.roots {
        interface.print(usage_line(engine, root, show_hidden, show_deprecated));
    }

    for &root in &engine.roots {
        if let Some(about) = &engine.scopes[root].about {
            interface.print(String::default());
            for line in wrap(about, width.saturating_sub(1).max(MINIMUM_HELP_WIDTH)) {
                interface.print(line);
            }
        }
    }

    for &root in &engine.roots {
        scope_section(engine, root, show_hidden, show_deprecated, width, interface);
    }
}

fn visible(adapter: &Adapter, show_hidden: bool, show_deprecated: bool) -> bool {
    if adapter.hidden && !show_hidden {
        return false;
    }

    if (adapter.deprecated || adapter.replaced_by.is_some()) && !show_deprecated {
        return false;
    }

    true
}

fn usage_line(engine: &Engine, scope: usize, show_hidden: bool, show_deprecated: bool) -> String {
    let mut summary = vec![format!("usage: {}", engine.scopes[scope].title)];

    for &id in &engine.scopes[scope].adapter_ids {
        let adapter = &engine.adapters[id];

        if !visible(adapter, show_hidden, show_deprecated) {
            continue;
        }

        match adapter.builtin {
            Builtin::Help => summary.push("[-h]".to_string()),
            Builtin::User | Builtin::Group(_) => summary.push(summary_item(adapter)),
            _ => {}
        }
    }

    summary.join(" ")
}

fn summary_item(adapter: &Adapter) -> String {
    if adapter.key.is_free() {
        // The Many grammar already carries its own brackets.
        let item = grammar(adapter).trim_start().to_string();

        return if adapter.mandatory || matches!(adapter.arity, Arity::Many) {
            item
        } else {
            format!("[{item}]")
        };
    }

    let item = format!(
        "{form}{grammar}",
        form = adapter.key.preferred_form(),
        grammar = grammar(adapter)
    );

    if adapter.mandatory {
        item
    } else {
        format!("[{item}]")
    }
}

fn placeholder(adapter: &Adapter) -> String {
    match adapter.key.long() {
        Some(long) => long.to_ascii_uppercase().replace('-', "_"),
        None => match adapter.key.short() {
            Some(short) => short.to_ascii_uppercase().to_string(),
            None => "VALUE".to_string(),
        },
    }
}

fn grammar(adapter: &Adapter) -> String {
    let name = placeholder(adapter);

    match adapter.arity {
        Arity::None => String::default(),
        Arity::One => match adapter.value_mode {
            ValueMode::Optional => format!(" [{name}]"),
            _ => format!(" {name}"),
        },
        Arity::Many => format!(" [{name} ...]"),
        Arity::Fixed(n) => format!(
            " {}",
            (0..n).map(|_| name.clone()).collect::<Vec<String>>().join(" ")
        ),
    }
}

fn left_cell(adapter: &Adapter) -> String {
    let grammar = grammar(adapter);

    if adapter.key.is_free() {
        return grammar.trim_start().to_string();
    }

    match (adapter.key.short(), adapter.key.long()) {
        (Some(short), Some(long)) => format!("-{short}, --{long}{grammar}"),
        (Some(short), None) => format!("-{short}{grammar}"),
        (None, Some(long)) => format!("--{long}{grammar}"),
        (None, None) => unreachable!("internal error - key must carry at least one form"),
    }
}

fn scope_section(
    engine: &Engine,
    scope: usize,
    show_hidden: bool,
    show_deprecated: bool,
    width: usize,
    interface: &dyn UserInterface,
) {
    let rows: Vec<(String, String)> = engine.scopes[scope]
        .adapter_ids
        .iter()
        .map(|&id| &engine.adapters[id])
        .filter(|adapter| visible(adapter, show_hidden, show_deprecated))
        .map(|adapter| (left_cell(adapter), annotated_help(adapter)))
        .collect();

    if !rows.is_empty() {
        interface.print(String::default());

        match &engine.scopes[scope].group_key {
            Some(key) => interface.print(format!("arguments of '{key}':")),
            None => interface.print("options:".to_string()),
        }

        let left_width = rows
            .iter()
            .map(|(left, _)| left.len())
            .filter(|length| *length <= LEFT_WIDTH_CAP)
            .max()
            .unwrap_or(LEFT_WIDTH_CAP);
        let target = (width as f64 * 0.95) as usize;
        let help_width = target
            .saturating_sub(INDENT + left_width + PADDING)
            .max(MINIMUM_HELP_WIDTH);

        for (left, help) in rows {
            print_row(&left, &help, left_width, help_width, interface);
        }
    }

    for (child, child_scope) in engine.scopes.iter().enumerate() {
        if child_scope.parent == Some(scope) {
            scope_section(engine, child, show_hidden, show_deprecated, width, interface);
        }
    }
}

fn annotated_help(adapter: &Adapter) -> String {
    let mut help = adapter.help.clone().unwrap_or_default();

    if adapter.deprecated {
        help.push_str(" (deprecated)");
    }

    if let Some(replacement) = &adapter.replaced_by {
        help.push_str(&format!(" (replaced by '{replacement}')"));
    }

    help.trim().to_string()
}

fn print_row(
    left: &str,
    help: &str,
    left_width: usize,
    help_width: usize,
    interface: &dyn UserInterface,
) {
    let parts = wrap(help, help_width);

    if left.len() > left_width {
        // An oversized cell pushes its help onto the following lines.
        interface.print(format!("{:INDENT$}{left}", ""));

        for part in parts {
            interface.print(format!("{:INDENT$}{:left_width$}{:PADDING$}{part}", "", "", ""));
        }
    } else {
        match parts.as_slice() {
            [] => interface.print(format!("{:INDENT$}{left}", "")),
            [first, rest @ ..] => {
                interface.print(format!("{:INDENT$}{left:left_width$}{:PADDING$}{first}", "", ""));

                for part in rest {
                    interface
                        .print(format!("{:INDENT$}{:left_width$}{:PADDING$}{part}", "", "", ""));
                }
            }
        }
    }
}

/// Render the detailed help of one argument, for `--help-arg`.
pub(crate) fn argument_detail(adapter: &Adapter, interface: &dyn UserInterface) {
    let help = annotated_help(adapter);

    if help.is_empty() {
        interface.print(format!("Argument '{key}'", key = adapter.key));
    } else {
        interface.print(format!("Argument '{key}': {help}", key = adapter.key));
    }

    interface.print(format!("  type:        {}", adapter.type_name));
    interface.print(format!("  value mode:  {}", adapter.value_mode));
    interface.print(format!("  cardinality: {}", adapter.cardinality));

    let mut flags = Vec::default();

    if adapter.mandatory {
        flags.push("mandatory");
    }

    if adapter.hidden {
        flags.push("hidden");
    }

    if adapter.deprecated {
        flags.push("deprecated");
    }

    if adapter.multi_value {
        flags.push("multi-value");
    }

    if !flags.is_empty() {
        interface.print(format!("  flags:       {}", flags.join(", ")));
    }

    if !adapter.check_notes.is_empty() {
        interface.print(format!("  checks:      {}", adapter.check_notes.join("; ")));
    }
}

/// Render the argument/variable bindings, for `--list-arg-vars`.
pub(crate) fn variables(engine: &Engine, interface: &dyn UserInterface) {
    for (index, scope) in engine.scopes.iter().enumerate() {
        let rows: Vec<&Adapter> = scope
            .adapter_ids
            .iter()
            .map(|&id| &engine.adapters[id])
            .filter(|adapter| !adapter.is_builtin())
            .collect();

        if rows.is_empty() {
            continue;
        }

        if index > 0 {
            interface.print(String::default());
        }

        match &scope.group_key {
            Some(key) => interface.print(format!("Argument variables for '{key}':")),
            None => interface.print(format!("Argument variables for '{}':", scope.title)),
        }

        for adapter in rows {
            let usage = match adapter.uses {
                0 => "not used".to_string(),
                uses => format!("used {uses} time(s)"),
            };

            interface.print(format!(
                "{:INDENT$}'{key}' bound to '{t}', {usage}",
                "",
                key = adapter.key,
                t = adapter.type_name,
            ));
        }
    }
}

fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            hard_break(width, &mut lines, &mut current, word);
        } else if current.len() + word.len() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = String::default();
            hard_break(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hard_break(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let mut remainder = word;

    while remainder.len() > width {
        let (head, tail) = remainder.split_at(width);
        lines.push(head.to_string());
        remainder = tail;
    }

    current.push_str(remainder);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case("abc", vec!["abc"])]
    #[case("abc def", vec!["abc def"])]
    #[case("abc def ghi", vec!["abc def", "ghi"])]
    #[case("abcdefghij", vec!["abcdefg", "hij"])]
    #[case("a abcdefghijklmn z", vec!["a", "abcdefg", "hijklmn", "z"])]
    fn wrapping(#[case] paragraph: &str, #[case] expected: Vec<&str>) {
        assert_eq!(wrap(paragraph, 7), expected);
    }

    #[test]
    fn wrapping_whitespace_runs() {
        assert_eq!(wrap("a    b", 7), vec!["a b"]);
    }
}
