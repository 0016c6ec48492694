use super::{Error, PatchResult};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// User facing progress lines
///
/// Successes go to standard output, failures to standard error.
pub struct Console {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl Console {
    pub fn new(color: ColorChoice) -> Console {
        Console {
            stdout: StandardStream::stdout(color),
            stderr: StandardStream::stderr(color),
        }
    }

    /// `IntentResolver patched 2`
    pub fn committed(&self, result: &PatchResult) -> io::Result<()> {
        let mut s = self.stdout.lock();
        s.set_color(ColorSpec::new().set_bold(true))?;
        write!(s, "{}", result.file)?;
        s.reset()?;
        write!(s, " patched ")?;
        s.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(s, "{}", result.patched_count)?;
        s.reset()?;
        writeln!(s)
    }

    /// `copying PreventRunningUtils`
    pub fn copied(&self, name: &str) -> io::Result<()> {
        let mut s = self.stdout.lock();
        s.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(s, "copying ")?;
        s.reset()?;
        writeln!(s, "{}", name)
    }

    pub fn failed(&self, err: &Error) -> io::Result<()> {
        let mut s = self.stderr.lock();
        s.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(s, "{}", err)?;
        s.reset()?;
        writeln!(s)
    }
}
