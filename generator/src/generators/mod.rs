mod spec;

use clap::ValueEnum;
use dt_kidl::Service;

pub use spec::{SpecPrinter, TypeText};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    /// Specification text.
    Spec,
    /// The typed model as JSON.
    Json,
}

impl Generator {
    pub fn generate(&self, services: &[Service]) -> serde_json::Result<String> {
        match *self {
            Self::Spec => Ok(spec::generate(services)),
            Self::Json => serde_json::to_string_pretty(services),
        }
    }
}
