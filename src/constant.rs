pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

pub(crate) const HELP_ARG_NAME: &str = "help-arg";
pub(crate) const HELP_ARG_MESSAGE: &str = "Show the detailed help for one argument.";

pub(crate) const LIST_VARS_NAME: &str = "list-arg-vars";
pub(crate) const LIST_VARS_MESSAGE: &str = "List the argument/variable bindings.";

pub(crate) const PRINT_HIDDEN_NAME: &str = "print-hidden";
pub(crate) const PRINT_HIDDEN_MESSAGE: &str = "Include hidden arguments in the usage output.";

pub(crate) const PRINT_DEPRECATED_NAME: &str = "print-deprecated";
pub(crate) const PRINT_DEPRECATED_MESSAGE: &str =
    "Include deprecated arguments in the usage output.";

pub(crate) const END_VALUES_DEFAULT: &str = "endvalues";
pub(crate) const END_VALUES_MESSAGE: &str = "Terminate a multi-value argument early.";

pub(crate) const LIST_SEPARATOR_DEFAULT: char = ',';
pub(crate) const PAIR_SEPARATOR: char = '=';
