use super::{display_name, Error, PatchRule, Settings};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Progress of a [`PatchRunner`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunnerState {
    NotStarted,

    /// Streaming the target into the `.patched` sibling
    Scanning,

    /// Comparing the edit count against the rule's expectation
    Verifying,

    /// Target replaced, pristine copy kept as `.orig`
    Committed,

    /// Nothing committed, target untouched
    Aborted,
}

/// Outcome of a verified run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    /// Short name of the patched file
    pub file: String,
    pub patched_count: usize,
    pub expected_count: usize,
}

impl PatchResult {
    /// Only an exact match counts, overshooting is as bad as falling short
    pub fn is_success(&self) -> bool {
        self.patched_count == self.expected_count
    }
}

/// Drives one rule over one file: scan, verify, then commit or abort
///
/// While scanning, every input line ends up in `<target>.patched`, either as the rule's
/// replacement or verbatim. The target is only replaced once the edit count checks out, and the
/// original is kept around as `<target>.orig`. On any failure the `.patched` file is left behind
/// for inspection and the target is never touched.
#[derive(Debug)]
pub struct PatchRunner {
    target: PathBuf,
    state: RunnerState,
}

impl PatchRunner {
    pub const PATCHED_SUFFIX: &'static str = ".patched";
    pub const ORIGINAL_SUFFIX: &'static str = ".orig";

    pub fn new(target: impl Into<PathBuf>) -> PatchRunner {
        PatchRunner {
            target: target.into(),
            state: RunnerState::NotStarted,
        }
    }

    /// Runner for the file a rule targets under the services root
    pub fn for_rule(settings: &Settings, rule: &dyn PatchRule) -> PatchRunner {
        PatchRunner::new(settings.services_path(rule.target_path()))
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Where the rewritten file is produced
    pub fn patched_path(&self) -> PathBuf {
        sibling(&self.target, Self::PATCHED_SUFFIX)
    }

    /// Where the pristine file is kept after a commit
    pub fn original_path(&self) -> PathBuf {
        sibling(&self.target, Self::ORIGINAL_SUFFIX)
    }

    pub fn run(&mut self, rule: &mut dyn PatchRule) -> Result<PatchResult, Error> {
        debug_assert_eq!(self.state, RunnerState::NotStarted, "runner already used");
        let outcome = self.scan_verify_commit(rule);
        if outcome.is_err() {
            self.transition(RunnerState::Aborted);
        }
        outcome
    }

    fn scan_verify_commit(&mut self, rule: &mut dyn PatchRule) -> Result<PatchResult, Error> {
        let patched = self.scan(rule)?;
        let result = self.verify(rule, patched)?;
        self.commit()?;
        Ok(result)
    }

    fn scan(&mut self, rule: &mut dyn PatchRule) -> Result<usize, Error> {
        if !self.target.is_file() {
            return Err(Error::MissingFile(self.target.clone()));
        }
        self.transition(RunnerState::Scanning);

        let mut reader = BufReader::new(File::open(&self.target)?);
        let mut output = BufWriter::new(File::create(self.patched_path())?);
        let marker = rule.patched_marker().map(str::to_owned);

        let mut patched = 0;
        let mut line_number = 0;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;

            if let Some(marker) = &marker {
                if line.contains(marker.as_str()) {
                    return Err(Error::AlreadyPatched {
                        file: display_name(&self.target),
                        line_number,
                    });
                }
            }

            if rule.transform(&mut output, &line)? {
                log::debug!("{}:{} patched", self.target.display(), line_number);
                patched += 1;
            } else {
                output.write_all(line.as_bytes())?;
            }
        }

        // Both handles are closed on return, before anything gets renamed
        output.flush()?;
        Ok(patched)
    }

    fn verify(&mut self, rule: &dyn PatchRule, patched: usize) -> Result<PatchResult, Error> {
        self.transition(RunnerState::Verifying);
        let result = PatchResult {
            file: display_name(&self.target),
            patched_count: patched,
            expected_count: rule.expected_edit_count(),
        };
        if result.is_success() {
            Ok(result)
        } else {
            Err(Error::VerificationMismatch {
                file: result.file,
                patched: result.patched_count,
                expected: result.expected_count,
            })
        }
    }

    fn commit(&mut self) -> Result<(), Error> {
        fs::rename(&self.target, self.original_path())?;
        fs::rename(self.patched_path(), &self.target)?;
        self.transition(RunnerState::Committed);
        Ok(())
    }

    fn transition(&mut self, state: RunnerState) {
        log::trace!("{}: {:?} -> {:?}", self.target.display(), self.state, state);
        self.state = state;
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    /// Upper-cases every line mentioning `foo`
    struct Shout {
        expected: usize,
    }

    impl PatchRule for Shout {
        fn target_path(&self) -> &str {
            "Shout.smali"
        }

        fn expected_edit_count(&self) -> usize {
            self.expected
        }

        fn transform(&mut self, output: &mut dyn Write, line: &str) -> Result<bool, Error> {
            if line.contains("foo") {
                output.write_all(line.to_uppercase().as_bytes())?;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        fn patched_marker(&self) -> Option<&str> {
            Some("FOO")
        }
    }

    const SOURCE: &str = "a\nfoo\nb\n\nfoo bar\n";

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Shout.smali");
        fs::write(&target, SOURCE).unwrap();
        (dir, target)
    }

    #[test]
    fn commits_exact_match() {
        let (_dir, target) = setup();
        let mut runner = PatchRunner::new(&target);
        let result = runner.run(&mut Shout { expected: 2 }).unwrap();

        assert_eq!(
            result,
            PatchResult {
                file: String::from("Shout"),
                patched_count: 2,
                expected_count: 2,
            }
        );
        assert_eq!(runner.state(), RunnerState::Committed);
        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nFOO\nb\n\nFOO BAR\n");
        assert_eq!(fs::read_to_string(runner.original_path()).unwrap(), SOURCE);
        assert!(!runner.patched_path().exists());
    }

    #[test]
    fn aborts_on_mismatch() {
        for expected in [1, 3] {
            let (_dir, target) = setup();
            let mut runner = PatchRunner::new(&target);
            match runner.run(&mut Shout { expected }) {
                Err(Error::VerificationMismatch {
                    file,
                    patched,
                    expected: wanted,
                }) => {
                    assert_eq!(file, "Shout");
                    assert_eq!(patched, 2);
                    assert_eq!(wanted, expected);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
            assert_eq!(runner.state(), RunnerState::Aborted);
            assert_eq!(fs::read_to_string(&target).unwrap(), SOURCE);
            assert!(!runner.original_path().exists());
            assert_eq!(
                fs::read_to_string(runner.patched_path()).unwrap(),
                "a\nFOO\nb\n\nFOO BAR\n"
            );
        }
    }

    #[test]
    fn missing_target() {
        let dir = TempDir::new().unwrap();
        let mut runner = PatchRunner::new(dir.path().join("Nope.smali"));
        assert!(matches!(
            runner.run(&mut Shout { expected: 0 }),
            Err(Error::MissingFile(_))
        ));
        assert_eq!(runner.state(), RunnerState::Aborted);
        assert!(!runner.patched_path().exists());
    }

    #[test]
    fn refuses_patched_input() {
        let (_dir, target) = setup();
        PatchRunner::new(&target).run(&mut Shout { expected: 2 }).unwrap();
        let patched = fs::read_to_string(&target).unwrap();

        let mut runner = PatchRunner::new(&target);
        assert!(matches!(
            runner.run(&mut Shout { expected: 0 }),
            Err(Error::AlreadyPatched { line_number: 2, .. })
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), patched);
    }

    #[test]
    fn sibling_paths() {
        let runner = PatchRunner::new("services/a/B.smali");
        assert_eq!(runner.patched_path(), Path::new("services/a/B.smali.patched"));
        assert_eq!(runner.original_path(), Path::new("services/a/B.smali.orig"));
    }
}
