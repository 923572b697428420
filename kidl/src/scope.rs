use std::collections::HashMap;

use crate::{
    error::{KidlError, Result},
    types::AliasType,
};

/// Module-qualified name of a typedef.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub module: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

/// Symbol table of the typedefs declared so far during one construction pass.
///
/// Typedefs are registered in declaration order, so a lookup only ever sees earlier
/// declarations; references to later typedefs fail. Typedefs of modules built earlier in the same
/// pass stay visible under their module-qualified name.
pub struct TypeScope {
    current_module: String,
    typedefs: HashMap<QualifiedName, AliasType>,
}

impl TypeScope {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            current_module: module.into(),
            typedefs: HashMap::new(),
        }
    }

    pub fn current_module(&self) -> &str {
        &self.current_module
    }

    pub(crate) fn enter_module(&mut self, module: impl Into<String>) {
        self.current_module = module.into();
    }

    pub(crate) fn register(&mut self, alias: &AliasType) -> Result<()> {
        let key = QualifiedName::new(&alias.module, &alias.name);
        if self.typedefs.contains_key(&key) {
            return Err(KidlError::Duplicate {
                kind: "typedef",
                name: alias.name.clone(),
                module: alias.module.clone(),
            });
        }
        tracing::debug!(module = %key.module, name = %key.name, "registered typedef");
        self.typedefs.insert(key, alias.clone());
        Ok(())
    }

    /// Looks up a typedef; an absent `module` means the module currently being built.
    pub fn lookup(&self, module: Option<&str>, name: &str) -> Result<&AliasType> {
        let module = module.unwrap_or(&self.current_module);
        self.typedefs
            .get(&QualifiedName::new(module, name))
            .ok_or_else(|| KidlError::UnresolvedTypedef {
                module: module.to_string(),
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.typedefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typedefs.is_empty()
    }
}
