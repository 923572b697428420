use std::path::PathBuf;

use thiserror::Error;

/// Errors of the compilation report step. Apart from [`ReportError::SharedReportPath`] they are
/// scoped to one module and never invalidate the already built model.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("function name {0:?} cannot appear in marker lines")]
    InvalidMarkerName(String),

    #[error(
        "{modules} modules would share the report path {}, add a {{module}} placeholder",
        path.display()
    )]
    SharedReportPath { modules: usize, path: PathBuf },

    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
