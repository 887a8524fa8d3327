use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

pub mod config;
pub mod runner;

use crate::config::{EvalInput, ValidatedReportConfig};
use crate::runner::{CommandRunner, RSCRIPT};

/// Run the full report sequence: evaluate the run config files when no
/// pre-built dataset was given, then hand the evaluation dataset to the
/// report-generation script.
///
/// Returns the exit code the process should finish with. A non-zero exit
/// from the evaluation step is returned immediately and report generation is
/// skipped. The intermediate evaluation dataset, when one was created, is
/// removed whether or not report generation succeeded.
///
/// # Errors
/// Returns an error if a subprocess could not be started or the evaluation
/// dataset is missing.
pub fn run(config: &ValidatedReportConfig, runner: &dyn CommandRunner) -> Result<i32> {
    runner.preflight()?;

    let (eval_data, temp_created) = match config.input() {
        EvalInput::EvaluateFirst {
            eval_script,
            configs,
            temp_output,
        } => {
            // A stale dataset from an earlier run must not survive into this one.
            if temp_output.exists() {
                fs::remove_file(temp_output)?;
            }

            let code = runner.run(RSCRIPT, &eval_args(eval_script, configs, temp_output, config))?;

            if code != 0 {
                eprintln!(
                    "Error: evaluation of the input data did not exit with a 0 code. \
                     Check for errors."
                );
                return Ok(code);
            }

            (temp_output.clone(), true)
        }
        EvalInput::Prebuilt(path) => (path.clone(), false),
    };

    if !eval_data.exists() {
        return Err(anyhow!(
            "could not find input evaluation data: {}",
            eval_data.display()
        ));
    }

    let outcome = runner.run(RSCRIPT, &report_args(&eval_data, config));

    // The intermediate dataset goes away even when report generation failed.
    if temp_created {
        let _ = fs::remove_file(&eval_data);
    }

    outcome
}

/// Argument list for the evaluation script:
/// `<eval_script> <configs...> -o <temp_output> [-s <support>] --iguide_dir <dir>`.
fn eval_args(
    eval_script: &Path,
    configs: &[PathBuf],
    temp_output: &Path,
    config: &ValidatedReportConfig,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![eval_script.to_path_buf().into()];
    args.extend(configs.iter().map(|path| path.clone().into()));
    args.push("-o".into());
    args.push(temp_output.to_path_buf().into());

    if let Some(support) = config.support() {
        args.push("-s".into());
        args.push(support.clone().into());
    }

    args.push("--iguide_dir".into());
    args.push(config.iguide_dir().clone().into());
    args
}

/// Argument list for the report-generation script:
/// `<report_script> <eval_data> -o <output> [-f] [-d] [-g] --template <path> --iguide_dir <dir>`.
fn report_args(eval_data: &Path, config: &ValidatedReportConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        config.report_script().clone().into(),
        eval_data.to_path_buf().into(),
        "-o".into(),
        config.output().clone().into(),
    ];

    if *config.figures() {
        args.push("-f".into());
    }
    if *config.savedata() {
        args.push("-d".into());
    }
    if *config.graphic() {
        args.push("-g".into());
    }

    args.push("--template".into());
    args.push(config.template().clone().into());
    args.push("--iguide_dir".into());
    args.push(config.iguide_dir().clone().into());
    args
}
