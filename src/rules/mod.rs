//! The rewrites that route activity and process lifecycle calls of `services.jar` through
//! `PreventRunningUtils`

mod activity_manager_service;
mod activity_stack;
mod activity_stack_supervisor;
mod intent_resolver;

pub use activity_manager_service::*;
pub use activity_stack::*;
pub use activity_stack_supervisor::*;
pub use intent_resolver::*;

use crate::patch::{Error, PatchRule, Settings};
use crate::smali::{FormatError, RANGE_SEPARATOR};
use std::io::Write;

/// Class receiving all redirected calls
///
/// Nothing in an unpatched `services.jar` refers to it, so it doubles as the "already patched"
/// marker.
pub const HOOKS_CLASS: &str = "Lcom/android/server/am/PreventRunningUtils;";

/// Line terminator for emitted lines when the input line has none
pub const NEWLINE: &str = "\n";

/// All rules, in the order they must be applied
///
/// The replacement methods for `ActivityManagerService` are indexed here, so a missing apk tree
/// is reported before any file is touched.
pub fn default_rules(settings: &Settings) -> Result<Vec<Box<dyn PatchRule>>, Error> {
    let rules: Vec<Box<dyn PatchRule>> = vec![
        Box::new(IntentResolver),
        Box::new(ActivityStack),
        Box::new(ActivityStackSupervisor),
        Box::new(ActivityManagerService::new(settings)?),
    ];
    Ok(rules)
}

/// Terminator of an input line, so inserted lines match the file's line endings
pub fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        NEWLINE
    }
}

/// Write a static call of `method` on the hooks class on its own line
///
/// `registers` is a rendered register clause; range clauses get the `/range` opcode.
fn invoke_hook(
    output: &mut dyn Write,
    registers: &str,
    method: &str,
    newline: &str,
) -> Result<(), Error> {
    let opcode = if registers.contains(RANGE_SEPARATOR) {
        "invoke-static/range"
    } else {
        "invoke-static"
    };
    write!(output, "    {} {}, {}->{}{}", opcode, registers, HOOKS_CLASS, method, newline)?;
    Ok(())
}

/// Keep the matched instruction and follow it with an empty line, ready for an inserted call
fn keep_line(output: &mut dyn Write, line: &str) -> Result<(), Error> {
    output.write_all(line.as_bytes())?;
    output.write_all(line_ending(line).as_bytes())?;
    Ok(())
}

fn argument<'a>(arguments: &'a [String], index: usize, line: &str) -> Result<&'a str, Error> {
    arguments.get(index).map(String::as_str).ok_or_else(|| {
        Error::Format(FormatError::MissingArgument {
            line: line.to_owned(),
            index,
        })
    })
}
