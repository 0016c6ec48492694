use super::{argument, invoke_hook, keep_line, line_ending, HOOKS_CLASS};
use crate::patch::{Error, PatchRule};
use crate::smali::{method_arguments, register_class, render_list, render_range};
use std::io::Write;

/// Notifies the hooks after `ActivityStack` resumes, pauses or destroys an activity
///
/// The scheduling call is kept as is and a static hook call receiving the same token (and, for
/// pausing, the same flags) is inserted after it.
pub struct ActivityStack;

impl ActivityStack {
    const RESUME: &'static str =
        "Landroid/app/IApplicationThread;->scheduleResumeActivity(Landroid/os/IBinder;";
    const DESTROY: &'static str =
        "Landroid/app/IApplicationThread;->scheduleDestroyActivity(Landroid/os/IBinder;";
    const PAUSE: &'static str =
        "Landroid/app/IApplicationThread;->schedulePauseActivity(Landroid/os/IBinder;ZZ";

    /// Registers for `onUserLeavingActivity`: the token and both flags of the pause call
    fn pause_registers(line: &str) -> Result<String, Error> {
        let arguments = method_arguments(line)?;
        let token = argument(&arguments, 1, line)?;
        let user_leaving = argument(&arguments, 2, line)?;
        let dont_wait = argument(&arguments, 3, line)?;

        let class = register_class(token);
        if register_class(user_leaving) == class && register_class(dont_wait) == class {
            Ok(render_range(token, dont_wait))
        } else {
            Ok(render_list(&[token, user_leaving, dont_wait]))
        }
    }
}

impl PatchRule for ActivityStack {
    fn target_path(&self) -> &str {
        "com/android/server/am/ActivityStack.smali"
    }

    fn expected_edit_count(&self) -> usize {
        3
    }

    fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error> {
        let (registers, hook) = if line.contains(Self::RESUME) {
            let token = argument(&method_arguments(line)?, 1, line)?.to_owned();
            (
                render_range(&token, &token),
                "onResumeActivity(Landroid/os/IBinder;)V",
            )
        } else if line.contains(Self::DESTROY) {
            let token = argument(&method_arguments(line)?, 1, line)?.to_owned();
            (
                render_range(&token, &token),
                "onDestroyActivity(Landroid/os/IBinder;)V",
            )
        } else if line.contains(Self::PAUSE) {
            (
                Self::pause_registers(line)?,
                "onUserLeavingActivity(Landroid/os/IBinder;ZZ)V",
            )
        } else {
            return Ok(false);
        };

        keep_line(output, line)?;
        invoke_hook(output, &registers, hook, line_ending(line))?;
        Ok(true)
    }

    fn patched_marker(&self) -> Option<&str> {
        Some(HOOKS_CLASS)
    }
}
