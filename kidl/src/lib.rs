pub mod annotations;
pub mod error;
pub mod function;
pub mod module;
pub mod names;
pub mod parameter;
pub mod raw;
pub mod scope;
pub mod service;
pub mod types;
pub mod visitor;

pub use annotations::{Annotations, Deprecation};
pub use error::{KidlError, Result};
pub use function::{Authentication, Function};
pub use module::{Module, ModuleComponent};
pub use names::TypeNames;
pub use parameter::Parameter;
pub use raw::RawMap;
pub use scope::TypeScope;
pub use service::Service;
pub use types::{
    AliasType, BasicKind, BasicType, ScalarKind, StructField, StructType, TupleElement, Type,
};
pub use visitor::{Visited, Visitor};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Authentication of functions whose module and definition set none.
    pub default_authentication: Authentication,
}

/// Maps a raw service tree (service name to list of module definitions) onto the model. Services
/// come out in the iteration order of the input map.
pub fn read_services(tree: &serde_json::Value, options: ReadOptions) -> Result<Vec<Service>> {
    let services: &RawMap = raw::convert("services", tree)?;
    services
        .iter()
        .map(|(name, modules)| {
            let modules = raw::convert(name, modules)?;
            Service::map_from_raw(name, modules, options.default_authentication)
        })
        .collect()
}
