use super::{argument, invoke_hook, keep_line, line_ending, HOOKS_CLASS};
use crate::patch::{Error, PatchRule};
use crate::smali::{method_arguments, render_range};
use std::io::Write;

/// Notifies the hooks after `ActivityStackSupervisor` launches an activity
pub struct ActivityStackSupervisor;

impl ActivityStackSupervisor {
    const LAUNCH: &'static str = "Landroid/app/IApplicationThread;->scheduleLaunchActivity(Landroid/content/Intent;Landroid/os/IBinder;";
}

impl PatchRule for ActivityStackSupervisor {
    fn target_path(&self) -> &str {
        "com/android/server/am/ActivityStackSupervisor.smali"
    }

    fn expected_edit_count(&self) -> usize {
        1
    }

    fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error> {
        if !line.contains(Self::LAUNCH) {
            return Ok(false);
        }

        // Receiver, intent, then the activity token
        let arguments = method_arguments(line)?;
        let token = argument(&arguments, 2, line)?;

        keep_line(output, line)?;
        invoke_hook(
            output,
            &render_range(token, token),
            "onLaunchActivity(Landroid/os/IBinder;)V",
            line_ending(line),
        )?;
        Ok(true)
    }

    fn patched_marker(&self) -> Option<&str> {
        Some(HOOKS_CLASS)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn launch() {
        let line = "    invoke-interface/range {v1 .. v20}, Landroid/app/IApplicationThread;->scheduleLaunchActivity(Landroid/content/Intent;Landroid/os/IBinder;ILandroid/content/pm/ActivityInfo;)V\n";
        let mut output = vec![];
        assert!(ActivityStackSupervisor.transform(&mut output, line).unwrap());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("{}\n    invoke-static/range {{v3 .. v3}}, Lcom/android/server/am/PreventRunningUtils;->onLaunchActivity(Landroid/os/IBinder;)V\n", line)
        );
    }

    #[test]
    fn other_lines() {
        let mut output = vec![];
        let line = "    invoke-virtual {v0}, Lcom/android/server/am/ActivityRecord;->getTask()Lcom/android/server/am/TaskRecord;\n";
        assert!(!ActivityStackSupervisor.transform(&mut output, line).unwrap());
        assert!(output.is_empty());
    }
}
