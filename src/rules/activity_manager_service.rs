use super::{invoke_hook, line_ending, HOOKS_CLASS};
use crate::patch::{display_name, Error, PatchRule, Settings};
use crate::smali::{is_line_directive, rename_method, MethodIndex, MethodIndexer, METHOD_START};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use walkdir::WalkDir;

/// Swaps whole methods of `ActivityManagerService` for the versions shipped in the apk
///
/// Each replaced method is emitted in its apk form, followed by the original declaration renamed
/// with a `$Pr` suffix so the replacement can still delegate to it. On top of that, every
/// `pkgDeps.contains(..)` check is turned into a call to `returnFalse()`; those are optional and
/// grow the expected edit count as they are found.
pub struct ActivityManagerService {
    /// Replacement methods, by signature
    replacements: MethodIndex,

    /// Methods not replaced yet
    pending: HashSet<String>,

    /// Last line that was neither blank nor a `.line` directive, trimmed
    previous_line: String,

    /// `pkgDeps.contains(..)` checks replaced so far
    extra_count: usize,
}

impl ActivityManagerService {
    pub const PATH: &'static str = "com/android/server/am/ActivityManagerService.smali";

    /// Directory holding the support classes, in both trees
    pub const SUPPORT_DIRECTORY: &'static str = "com/android/server/am/";

    /// File name prefix of the support classes
    pub const SUPPORT_PREFIX: &'static str = "PreventRunning";

    /// Suffix given to the original method once a replacement takes its name
    pub const RENAMED_SUFFIX: &'static str = "$Pr";

    pub const REPLACED_METHODS: [&'static str; 8] = [
        "startProcessLocked",
        "startActivity",
        "handleAppDiedLocked",
        "cleanUpRemovedTaskLocked",
        "moveActivityTaskToBack",
        "startService",
        "bindService",
        "broadcastIntent",
    ];

    const PKG_DEPS: &'static str =
        "Lcom/android/server/am/ProcessRecord;->pkgDeps:Landroid/util/ArraySet;";
    const CONTAINS: &'static str = "Landroid/util/ArraySet;->contains(Ljava/lang/Object;)Z";

    /// Index the replacement methods from the apk tree
    pub fn new(settings: &Settings) -> Result<ActivityManagerService, Error> {
        let wanted = Self::replaced_methods();
        let replacements = MethodIndexer::index_file(settings.apk_path(Self::PATH), &wanted)?;
        Ok(Self::with_replacements(replacements))
    }

    pub fn with_replacements(replacements: MethodIndex) -> ActivityManagerService {
        ActivityManagerService {
            replacements,
            pending: Self::replaced_methods(),
            previous_line: String::new(),
            extra_count: 0,
        }
    }

    fn replaced_methods() -> HashSet<String> {
        Self::REPLACED_METHODS
            .iter()
            .copied()
            .map(String::from)
            .collect()
    }

    fn patch_line(
        &mut self,
        output: &mut dyn Write,
        line: &str,
        trimmed: &str,
    ) -> Result<bool, Error> {
        if line.starts_with(METHOD_START) {
            if let Some(block) = self.replacements.get(trimmed) {
                if self.pending.remove(&block.name) {
                    log::debug!("Replacing {}", block.signature);
                    output.write_all(block.body.as_bytes())?;
                    output.write_all(line_ending(line).as_bytes())?;
                    output.write_all(rename_method(line, Self::RENAMED_SUFFIX)?.as_bytes())?;
                    return Ok(true);
                }
            }
        }

        if self.previous_line.contains(Self::PKG_DEPS) && trimmed.contains(Self::CONTAINS) {
            invoke_hook(output, "{}", "returnFalse()Z", line_ending(line))?;
            self.extra_count += 1;
            return Ok(true);
        }

        Ok(false)
    }

    /// Copy the support classes next to the patched file
    fn copy_support_classes(settings: &Settings) -> Result<Vec<String>, Error> {
        let source = settings.apk_path(Self::SUPPORT_DIRECTORY);
        let destination = settings.services_path(Self::SUPPORT_DIRECTORY);

        let mut copied = vec![];
        let entries = WalkDir::new(&source)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for entry in entries {
            let entry = entry?;
            let is_support = entry
                .file_name()
                .to_string_lossy()
                .starts_with(Self::SUPPORT_PREFIX);
            if !is_support || !entry.file_type().is_file() {
                continue;
            }

            let name = display_name(entry.path());
            log::info!("Copying {:?} into {:?}", entry.path(), destination);
            fs::copy(entry.path(), destination.join(entry.file_name()))?;
            copied.push(name);
        }
        Ok(copied)
    }
}

impl PatchRule for ActivityManagerService {
    fn target_path(&self) -> &str {
        Self::PATH
    }

    fn expected_edit_count(&self) -> usize {
        Self::REPLACED_METHODS.len() + self.extra_count
    }

    fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_line_directive(trimmed) {
            return Ok(false);
        }

        let patched = self.patch_line(output, line, trimmed)?;
        self.previous_line.clear();
        self.previous_line.push_str(trimmed);
        Ok(patched)
    }

    fn patched_marker(&self) -> Option<&str> {
        Some(HOOKS_CLASS)
    }

    fn after_commit(&mut self, settings: &Settings) -> Result<Vec<String>, Error> {
        Self::copy_support_classes(settings)
    }
}
