use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    function::Authentication,
    module::Module,
    raw::{typed_list, RawMap},
    scope::TypeScope,
};

/// A namespace grouping one or more modules.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Service {
    pub name: String,
    pub modules: Vec<Module>,
}

impl Service {
    /// Maps the raw module definitions grouped under `name`, in order.
    ///
    /// All modules share one [`TypeScope`], so a module can refer to typedefs of the modules
    /// before it with a module-qualified reference.
    pub fn map_from_raw(
        name: &str,
        modules: &[Value],
        default_authentication: Authentication,
    ) -> Result<Self> {
        let mut scope = TypeScope::new(name);
        let modules = typed_list::<&RawMap>(name, modules)?
            .into_iter()
            .map(|module| Module::map_from_raw(&mut scope, module, default_authentication))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(service = name, modules = modules.len(), typedefs = scope.len(), "mapped service");
        Ok(Self {
            name: name.to_string(),
            modules,
        })
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }
}
