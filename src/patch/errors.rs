use crate::smali::FormatError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),

    /// File to patch (or to take replacement methods from) does not exist
    MissingFile(PathBuf),

    /// An instruction could not be decoded
    Format(FormatError),

    /// The rule did not produce exactly the expected number of edits
    VerificationMismatch {
        file: String,
        patched: usize,
        expected: usize,
    },

    /// The input already carries text that only patching introduces
    AlreadyPatched { file: String, line_number: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Io(err) => write!(f, "IO - {}", err),
            Error::MissingFile(path) => write!(f, "{} does not exist", path.display()),
            Error::Format(err) => write!(f, "malformed instruction - {}", err),
            Error::VerificationMismatch {
                file,
                patched,
                expected,
            } => write!(f, "{} patched {}, should patch {}", file, patched, expected),
            Error::AlreadyPatched { file, line_number } => {
                write!(f, "{} is already patched (line {})", file, line_number)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Error {
        Error::Format(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::Io(err.into())
    }
}
