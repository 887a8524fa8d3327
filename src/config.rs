//! # config.rs
//!
//! This module defines the configuration structures and logic for parsing
//! command-line input and resolving the paths needed to build an iGUIDE report.
//! It includes:
//! - `ReportConfig`: Parses command-line arguments.
//! - `ValidatedReportConfig`: Fully resolved configuration, checked against the filesystem.
//! - `EvalInput`: Which pipeline feeds the report (pre-built dataset vs. evaluate-first).
//! - `ReportFormat`: Enumerates the supported report output formats.
//!
//! A pre-built evaluation dataset (`-e`) always takes priority over run config
//! files (`-c`). When both are supplied the config files are ignored with a
//! warning on stderr.
//!
//! This module also includes test cases to verify correct behavior of the
//! validation logic.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use getset::Getters;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Location of the report-generation script inside an iGUIDE installation.
pub const REPORT_SCRIPT: &str = "tools/rscripts/generate_iGUIDE_report.R";

/// Location of the evaluation script inside an iGUIDE installation.
pub const EVAL_SCRIPT: &str = "tools/rscripts/evaluate_incorp_data.R";

/// Default report template shipped with an iGUIDE installation.
pub const DEFAULT_TEMPLATE: &str = "tools/rscripts/report_templates/iGUIDE_report_template.Rmd";

/// Environment variable naming the iGUIDE installation directory.
pub const IGUIDE_DIR_ENV: &str = "IGUIDE_DIR";

/// Name of the intermediate evaluation dataset written next to the output.
pub const TEMP_EVAL_FILE: &str = "temp.eval.rds";

/// Configuration parsed from CLI input arguments for generating a report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "iguide-report",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a custom report from an evaluated iGUIDE dataset, or from run config file(s) which will be evaluated first."
)]
pub struct ReportConfig {
    /// Run config file(s) in yaml format. More than one can be given to
    /// combine several runs in one report. Input in this form is evaluated
    /// first and the intermediate evaluation dataset is removed afterwards.
    #[arg(short, long, num_args = 0.., value_name = "CONFIG_FILE")]
    pub config: Option<Vec<PathBuf>>,
    /// An evaluation dataset in rds format, as produced by the evaluate step.
    /// Takes priority over --config when both are given.
    #[arg(short, long, value_name = "EVAL_FILE")]
    pub evaldata: Option<PathBuf>,
    /// Output report file, extension not required.
    #[arg(short, long, required = true, value_name = "OUTPUT")]
    pub output: PathBuf,
    /// Supporting data input, csv or tsv format. Only one file. Must have a
    /// 'specimen' column; only specimens matching that column are considered
    /// for evaluation and in the report.
    #[arg(short, long, value_name = "SUPPORT")]
    pub support: Option<PathBuf>,
    /// Generate figures along with the output report (pdf and png formats).
    #[arg(short, long)]
    pub figures: bool,
    /// Save the data used to generate the report as an R image with the
    /// output. Helpful for debugging templates.
    #[arg(short = 'd', long)]
    pub savedata: bool,
    /// Output format for the report. The appropriate extension is appended
    /// to the output file name.
    #[arg(short = 't', long = "format", value_enum, default_value_t = ReportFormat::Html)]
    pub format: ReportFormat,
    /// Include an opening graphic on the report.
    #[arg(short, long)]
    pub graphic: bool,
    /// File path to a standard or custom iGUIDE report template.
    #[arg(long, default_value = DEFAULT_TEMPLATE, value_name = "RMD_FILE")]
    pub template: PathBuf,
    /// Path to the iGUIDE installation, do not change for normal
    /// applications. Defaults to the IGUIDE_DIR environment variable.
    #[arg(short = 'i', long = "iguide_dir", value_name = "IGUIDE_DIR")]
    pub iguide_dir: Option<PathBuf>,
}

/// Enum for the report output format.
#[derive(Debug, PartialEq, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Pdf,
    Html,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let format_str = match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        };
        write!(f, "{}", format_str)
    }
}

/// Which pipeline feeds the report-generation step.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalInput {
    /// A user-supplied evaluation dataset, used as-is.
    Prebuilt(PathBuf),
    /// Run config files that must be evaluated into `temp_output` first.
    EvaluateFirst {
        eval_script: PathBuf,
        configs: Vec<PathBuf>,
        temp_output: PathBuf,
    },
}

/// Fully resolved report configuration. All paths have been checked against
/// the filesystem except the evaluation input, which may not exist yet.
#[derive(Debug, Clone, Getters)]
pub struct ValidatedReportConfig {
    #[getset(get = "pub")]
    iguide_dir: PathBuf,
    #[getset(get = "pub")]
    report_script: PathBuf,
    #[getset(get = "pub")]
    template: PathBuf,
    #[getset(get = "pub")]
    output: PathBuf,
    #[getset(get = "pub")]
    input: EvalInput,
    #[getset(get = "pub")]
    support: Option<PathBuf>,
    #[getset(get = "pub")]
    figures: bool,
    #[getset(get = "pub")]
    savedata: bool,
    #[getset(get = "pub")]
    graphic: bool,
    #[getset(get = "pub")]
    format: ReportFormat,
}

impl ReportConfig {
    /// Resolve and check every path the pipeline needs.
    ///
    /// Checks the iGUIDE installation directory (flag, else `IGUIDE_DIR`),
    /// the report and evaluation scripts under it, and the report template
    /// (relative to the installation first, then as given). Decides the
    /// input mode, preferring a pre-built evaluation dataset over config
    /// files.
    ///
    /// # Errors
    /// Returns an error if any required directory, script, or file is missing.
    pub fn validate(&self) -> Result<ValidatedReportConfig> {
        let iguide_dir = match &self.iguide_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os(IGUIDE_DIR_ENV)
                .map(PathBuf::from)
                .ok_or_else(|| {
                    anyhow!(
                        "no iGUIDE directory given; use --iguide_dir or set {}",
                        IGUIDE_DIR_ENV
                    )
                })?,
        };

        if !iguide_dir.exists() {
            return Err(anyhow!(
                "could not find iGUIDE directory '{}'",
                iguide_dir.display()
            ));
        }

        let report_script = iguide_dir.join(REPORT_SCRIPT);
        if !report_script.is_file() {
            return Err(anyhow!(
                "could not find generate_iGUIDE_report.R in directory '{}'",
                iguide_dir.join("tools/rscripts").display()
            ));
        }

        let input = match (&self.evaldata, &self.config) {
            (Some(evaldata), configs) => {
                if configs.is_some() {
                    eprintln!(
                        "{}",
                        "Warning: both --evaldata and --config were given; using the \
                         evaluation dataset and ignoring the config file(s)."
                            .yellow()
                    );
                }
                EvalInput::Prebuilt(evaldata.clone())
            }
            (None, Some(configs)) => {
                let eval_script = iguide_dir.join(EVAL_SCRIPT);
                if !eval_script.is_file() {
                    return Err(anyhow!(
                        "could not find evaluate_incorp_data.R in directory '{}'",
                        iguide_dir.join("tools/rscripts").display()
                    ));
                }
                // The intermediate dataset lands next to the final report.
                let temp_output = self
                    .output
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default()
                    .join(TEMP_EVAL_FILE);
                EvalInput::EvaluateFirst {
                    eval_script,
                    configs: configs.clone(),
                    temp_output,
                }
            }
            (None, None) => {
                return Err(anyhow!(
                    "no input given; use --config for run config file(s) or --evaldata \
                     for an evaluation dataset"
                ));
            }
        };

        let installed_template = iguide_dir.join(&self.template);
        let template = if installed_template.exists() {
            installed_template
        } else if self.template.exists() {
            self.template.clone()
        } else {
            return Err(anyhow!(
                "could not find a report template: '{}'",
                self.template.display()
            ));
        };

        if let Some(support) = &self.support {
            if !support.is_file() {
                return Err(anyhow!(
                    "could not find supporting data file '{}'",
                    support.display()
                ));
            }
            check_support_columns(support);
        }

        Ok(ValidatedReportConfig {
            iguide_dir,
            report_script,
            template,
            output: self.output.clone(),
            input,
            support: self.support.clone(),
            figures: self.figures,
            savedata: self.savedata,
            graphic: self.graphic,
            format: self.format,
        })
    }
}

/// Warn when a supporting data file has no 'specimen' column. The evaluation
/// script is the authority on the file's contents, so a suspect header is not
/// fatal here.
fn check_support_columns(path: &Path) {
    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = match csv::ReaderBuilder::new().delimiter(delimiter).from_path(path) {
        Ok(reader) => reader,
        Err(_) => return,
    };

    if let Ok(headers) = reader.headers() {
        if !headers.iter().any(|header| header.trim() == "specimen") {
            eprintln!(
                "{}",
                format!(
                    "Warning: supporting data file '{}' has no 'specimen' column; the \
                     evaluation step may reject it.",
                    path.display()
                )
                .yellow()
            );
        }
    }
}
