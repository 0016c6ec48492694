use super::HOOKS_CLASS;
use crate::patch::{Error, PatchRule};
use std::io::Write;

/// Redirects the stopped-package and intent filter checks of `IntentResolver`
///
/// `invoke-virtual/range {vA .. vB}, Landroid/content/Intent;->isExcludingStopped()Z` becomes a
/// static hook call that takes the former receiver as its first parameter.
pub struct IntentResolver;

impl IntentResolver {
    const EXCLUDING_STOPPED: &'static str = "Landroid/content/Intent;->isExcludingStopped(";
    const FILTER_MATCH: &'static str = "Landroid/content/IntentFilter;->match(";

    /// Turn a virtual call on `owner` into a static call on the hooks class
    fn redirect(line: &str, call: &str) -> String {
        let (owner, method) = match call.split_once("->") {
            Some(parts) => parts,
            None => return line.to_owned(),
        };
        line.replace("invoke-virtual/range", "invoke-static/range")
            .replace(call, &format!("{}->{}{}", HOOKS_CLASS, method, owner))
    }
}

impl PatchRule for IntentResolver {
    fn target_path(&self) -> &str {
        "com/android/server/IntentResolver.smali"
    }

    fn expected_edit_count(&self) -> usize {
        2
    }

    fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error> {
        let call = if line.contains(Self::EXCLUDING_STOPPED) {
            Self::EXCLUDING_STOPPED
        } else if line.contains(Self::FILTER_MATCH) {
            Self::FILTER_MATCH
        } else {
            return Ok(false);
        };

        let redirected = Self::redirect(line, call);
        if redirected == line {
            return Ok(false);
        }
        output.write_all(redirected.as_bytes())?;
        Ok(true)
    }

    fn patched_marker(&self) -> Option<&str> {
        Some(HOOKS_CLASS)
    }
}
