use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dt_kidl_generator::report::ServerLanguage;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Authentication {
    Required,
    Optional,
    None,
}

impl From<Authentication> for dt_kidl::Authentication {
    fn from(value: Authentication) -> Self {
        match value {
            Authentication::Required => Self::Required,
            Authentication::Optional => Self::Optional,
            Authentication::None => Self::None,
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Authentication of functions whose module and definition set none
    #[arg(long, global = true, value_enum, default_value = "none")]
    pub default_auth: Authentication,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the parsed services back as specification text
    Spec {
        /// The raw parse tree (JSON)
        input: PathBuf,
    },

    /// Dump the typed model as JSON
    Json {
        /// The raw parse tree (JSON)
        input: PathBuf,
    },

    /// Write the compilation report of every module
    Report {
        /// The raw parse tree (JSON)
        input: PathBuf,

        /// Directory holding the generated module sources
        #[arg(long)]
        module_dir: PathBuf,

        /// Server language the implementation was generated for
        #[arg(long, value_enum)]
        language: ServerLanguage,

        /// Report file; `{module}` is replaced with the module name
        #[arg(long)]
        out: PathBuf,

        /// Specification file to include in the report (repeatable)
        #[arg(long = "spec-file")]
        spec_files: Vec<PathBuf>,

        /// Tool version recorded in the report
        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        sdk_version: String,

        /// Build identifier recorded in the report
        #[arg(long, env = "KIDL_SDK_GIT_COMMIT", default_value = "")]
        git_commit: String,
    },
}
