pub mod error;
pub mod generators;
pub mod report;

pub use error::ReportError;
pub use generators::Generator;
