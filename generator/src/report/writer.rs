use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use dt_kidl::Module;
use heck::ToUpperCamelCase;

use super::{build_report, report_path, BuildInfo, SpecFile};
use crate::error::ReportError;

/// Server-side language a module's implementation was generated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServerLanguage {
    Python,
    Perl,
    R,
    Java,
}

impl ServerLanguage {
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Self::Python | Self::Perl | Self::R => "#",
            Self::Java => "//",
        }
    }

    /// Path of the implementation file of `module`, relative to the module directory.
    pub fn impl_file_path(&self, module: &str) -> String {
        match self {
            Self::Python => format!("lib/{module}/{module}Impl.py"),
            Self::Perl => format!("lib/{module}/{module}Impl.pm"),
            Self::R => format!("lib/{module}/{module}Impl.r"),
            Self::Java => format!(
                "lib/src/{}/{}Server.java",
                module.to_lowercase(),
                module.to_upper_camel_case()
            ),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Written,
    /// No server implementation was generated for the module.
    NoImplementation,
    /// A report from an earlier run is kept as is.
    AlreadyExists,
}

/// Writes the compilation report of `module` to `out`, unless a report already exists there or
/// the module has no implementation file under `module_dir`.
pub fn write_report(
    module: &Module,
    module_dir: &Path,
    language: ServerLanguage,
    out: &Path,
    spec_files: Vec<SpecFile>,
    build: &BuildInfo,
) -> Result<ReportOutcome, ReportError> {
    if out.exists() {
        tracing::info!(
            module = %module.name,
            path = %out.display(),
            "report already exists, skipping"
        );
        return Ok(ReportOutcome::AlreadyExists);
    }

    let impl_file_path = language.impl_file_path(&module.name);
    let impl_path = module_dir.join(&impl_file_path);
    if !impl_path.is_file() {
        tracing::info!(
            module = %module.name,
            path = %impl_path.display(),
            "no implementation file, skipping report"
        );
        return Ok(ReportOutcome::NoImplementation);
    }

    let impl_text = fs::read_to_string(&impl_path).map_err(ReportError::io(&impl_path))?;
    let report = build_report(
        module,
        &impl_text,
        language.comment_prefix(),
        &impl_file_path,
        spec_files,
        build,
    )?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ReportError::io(parent))?;
    }
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(out, json).map_err(ReportError::io(out))?;
    tracing::info!(
        module = %module.name,
        path = %out.display(),
        functions = report.functions.len(),
        placed = report.function_places.len(),
        "wrote compilation report"
    );
    Ok(ReportOutcome::Written)
}

/// Result of the report step for one module.
#[derive(Debug)]
pub struct ModuleReport {
    pub module: String,
    pub path: PathBuf,
    pub outcome: Result<ReportOutcome, ReportError>,
}

/// Writes the report of every module in `modules`. A failing module is logged and recorded in its
/// [`ModuleReport`]; the remaining modules still run.
///
/// `out` may contain a `{module}` placeholder. Without one, only a single module is accepted.
pub fn write_reports(
    modules: &[&Module],
    module_dir: &Path,
    language: ServerLanguage,
    out: &Path,
    spec_files: &[SpecFile],
    build: &BuildInfo,
) -> Result<Vec<ModuleReport>, ReportError> {
    if modules.len() > 1 && !out.to_string_lossy().contains("{module}") {
        return Err(ReportError::SharedReportPath {
            modules: modules.len(),
            path: out.to_path_buf(),
        });
    }

    Ok(modules
        .iter()
        .map(|module| {
            let path = report_path(out, &module.name);
            let outcome =
                write_report(module, module_dir, language, &path, spec_files.to_vec(), build);
            if let Err(e) = &outcome {
                tracing::error!(module = %module.name, "compilation report failed: {e}");
            }
            ModuleReport {
                module: module.name.clone(),
                path,
                outcome,
            }
        })
        .collect())
}
