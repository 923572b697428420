mod cli;

use std::{fs, path::Path, process::ExitCode};

use anyhow::Context;
use clap::Parser;

use dt_kidl::{ReadOptions, Service};
use dt_kidl_generator::{
    report::{write_reports, BuildInfo, ReportOutcome, SpecFile},
    Generator,
};
use tracing_subscriber::EnvFilter;

fn read_input(path: &Path, options: ReadOptions) -> anyhow::Result<Vec<Service>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let tree: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON parse tree", path.display()))?;
    let services = dt_kidl::read_services(&tree, options)
        .with_context(|| format!("malformed parse tree in {}", path.display()))?;
    tracing::debug!(services = services.len(), "read input");
    Ok(services)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let options = ReadOptions {
        default_authentication: cli.default_auth.into(),
    };

    match cli.command {
        cli::Command::Spec { input } => {
            let services = read_input(&input, options)?;
            print!("{}", Generator::Spec.generate(&services)?);
        }
        cli::Command::Json { input } => {
            let services = read_input(&input, options)?;
            println!("{}", Generator::Json.generate(&services)?);
        }
        cli::Command::Report {
            input,
            module_dir,
            language,
            out,
            spec_files,
            sdk_version,
            git_commit,
        } => {
            let services = read_input(&input, options)?;
            let modules: Vec<_> = services.iter().flat_map(|s| &s.modules).collect();
            let spec_files = spec_files
                .iter()
                .map(|path| SpecFile::load(path))
                .collect::<Result<Vec<_>, _>>()?;
            let build = BuildInfo {
                sdk_version,
                sdk_git_commit: git_commit,
            };

            let reports =
                write_reports(&modules, &module_dir, language, &out, &spec_files, &build)?;
            let mut failed = 0;
            for report in &reports {
                match report.outcome {
                    Ok(ReportOutcome::Written) => println!("{}", report.path.display()),
                    Ok(_) => {}
                    Err(_) => failed += 1,
                }
            }
            if failed > 0 {
                tracing::error!(failed, "some compilation reports failed");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
