use super::{Error, Settings};
use std::io::Write;

/// A fixed rewrite of one smali file
///
/// The runner hands every line of the target file (line terminator included) to
/// [`PatchRule::transform`]. A rule either writes its replacement to the output and reports an
/// edit, or declines and the runner copies the line through unchanged. Once the whole file has
/// been seen, the number of edits must match [`PatchRule::expected_edit_count`] exactly.
pub trait PatchRule {
    /// Path of the file to patch, `/`-separated and relative to the services root
    fn target_path(&self) -> &str;

    /// Exact number of edits the file must receive
    ///
    /// This is only consulted after the last line has been transformed, so rules are free to
    /// grow it as they discover optional patch sites.
    fn expected_edit_count(&self) -> usize;

    /// Examine one input line
    ///
    /// Returns `true` if the line was consumed and replaced by whatever was written to `output`.
    /// When this returns `false`, nothing must have been written.
    fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error>;

    /// Text which only ever appears in files this rule already patched
    fn patched_marker(&self) -> Option<&str> {
        None
    }

    /// Runs once the patched file has been committed
    ///
    /// Returns the names of any extra files that were put in place.
    fn after_commit(&mut self, _settings: &Settings) -> Result<Vec<String>, Error> {
        Ok(vec![])
    }
}
