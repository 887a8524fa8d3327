use clap::Parser;
use colored::Colorize;
use std::process;

use iguide_report::config::ReportConfig;
use iguide_report::runner::RscriptRunner;

fn main() {
    println!(
        "{} {}",
        "iGUIDE report builder, evaluate and render reports from iGUIDE run data.\n Version:"
            .cyan()
            .bold(),
        env!("CARGO_PKG_VERSION").cyan().bold()
    );

    let config = ReportConfig::parse();
    let validated = config.validate().unwrap_or_else(|err| {
        eprintln!("Error: {}", err.to_string().red().bold());
        process::exit(1);
    });
    println!("✅ Configuration validated, starting report generation...");
    #[cfg(debug_assertions)]
    dbg!(&validated);

    match iguide_report::run(&validated, &RscriptRunner) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e.to_string().red().bold());
            process::exit(1);
        }
    }
}
