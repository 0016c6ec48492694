use super::{Console, Error, PatchResult, PatchRule, PatchRunner, Settings};

/// Apply rules one after another, stopping at the first failure
///
/// Each file is fully scanned, verified and committed before the next rule starts. Rules after a
/// failing one never run, but whatever was committed before the failure stays committed.
pub fn run_batch(
    settings: &Settings,
    rules: Vec<Box<dyn PatchRule>>,
    console: &Console,
) -> Result<Vec<PatchResult>, Error> {
    let mut results = Vec::with_capacity(rules.len());
    for mut rule in rules {
        let mut runner = PatchRunner::for_rule(settings, rule.as_ref());
        log::info!("Patching '{}'", runner.target().display());

        let result = runner.run(rule.as_mut())?;
        console.committed(&result)?;

        for copied in rule.after_commit(settings)? {
            console.copied(&copied)?;
        }
        results.push(result);
    }
    Ok(results)
}
