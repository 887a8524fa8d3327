use std::ffi::OsString;
use std::process::Command;

use anyhow::{Context, Result, anyhow};

/// Program the external iGUIDE scripts are run through.
pub const RSCRIPT: &str = "Rscript";

/// Boundary between the orchestration sequence and child processes.
///
/// `run` blocks until the child exits and returns its exit code, so the
/// pipeline can be exercised in tests with a fake that records invocations
/// instead of spawning anything.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<i32>;

    /// Environment probe, run once before the first pipeline step.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }
}

/// Runs the external R scripts through `Rscript` from the caller's PATH,
/// with stdio inherited so script output reaches the terminal.
pub struct RscriptRunner;

impl CommandRunner for RscriptRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<i32> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to start '{}'", program))?;

        // A child killed by a signal carries no exit code.
        Ok(status.code().unwrap_or(1))
    }

    fn preflight(&self) -> Result<()> {
        check_rscript_installed()
    }
}

pub fn check_rscript_installed() -> Result<()> {
    let output = Command::new(RSCRIPT).arg("--version").output();

    match output {
        Ok(out) => {
            if out.status.success() {
                Ok(())
            } else {
                Err(anyhow!("Rscript failed to execute properly."))
            }
        }
        Err(_) => Err(anyhow!("Rscript is not installed or not found in PATH.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_child_exit_code() {
        let code = RscriptRunner
            .run("sh", &["-c".into(), "exit 7".into()])
            .unwrap();
        assert_eq!(code, 7);

        let code = RscriptRunner.run("true", &[]).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_run_errors_when_program_is_missing() {
        let result = RscriptRunner.run("no-such-program-anywhere", &[]);
        assert!(result.is_err());
    }
}
