use std::fmt::{Display, Formatter, Result};

/// Instruction text that does not have the shape a patch expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No `{ ... }` argument clause on the line
    MissingArgumentClause(String),

    /// Range shorthand whose bounds come from different register classes (eg. `{v0 .. p3}`)
    MismatchedRangePrefix { start: String, end: String },

    /// Register in a range shorthand without a numeric index
    BadRegisterIndex(String),

    /// `.method` line without a `name(` part
    MissingMethodName(String),

    /// Instruction has fewer arguments than the patch needs
    MissingArgument { line: String, index: usize },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FormatError::MissingArgumentClause(line) => {
                write!(f, "no argument clause in '{}'", line.trim())
            }
            FormatError::MismatchedRangePrefix { start, end } => {
                write!(f, "range '{} .. {}' mixes register classes", start, end)
            }
            FormatError::BadRegisterIndex(token) => {
                write!(f, "register '{}' has no numeric index", token)
            }
            FormatError::MissingMethodName(line) => {
                write!(f, "no method name in '{}'", line.trim())
            }
            FormatError::MissingArgument { line, index } => {
                write!(f, "argument {} missing in '{}'", index, line.trim())
            }
        }
    }
}

impl std::error::Error for FormatError {}
