//! Display names of model nodes, in specification syntax.

use std::fmt;

use crate::{
    function::Function,
    module::Module,
    parameter::Parameter,
    service::Service,
    types::{AliasType, BasicKind, BasicType, Type},
    visitor::{Visited, Visitor},
};

/// Renders a basic type given the already rendered names of its children.
pub fn basic_type_name(basic: &BasicType, children: &[String]) -> String {
    match &basic.kind {
        BasicKind::Scalar(scalar) => scalar.as_str().to_string(),
        BasicKind::List(_) => format!("list<{}>", children.join(", ")),
        BasicKind::Mapping { .. } => format!("mapping<{}>", children.join(", ")),
        BasicKind::Tuple(elements) => {
            let elements: Vec<_> = elements
                .iter()
                .zip(children)
                .map(|(element, type_)| match &element.name {
                    Some(name) => format!("{type_} {name}"),
                    None => type_.clone(),
                })
                .collect();
            format!("tuple<{}>", elements.join(", "))
        }
        BasicKind::Structure(structure) => {
            let mut out = String::from("structure {");
            for (field, type_) in structure.fields.iter().zip(children) {
                out.push_str(&format!(" {type_} {};", field.name));
            }
            out.push_str(" }");
            out
        }
        BasicKind::UnspecifiedObject => "UnspecifiedObject".to_string(),
    }
}

/// Visitor producing specification-syntax names.
///
/// Aliases render as their name, qualified with their module when it differs from the module
/// the names are rendered for.
#[derive(Default)]
pub struct TypeNames<'a> {
    module: Option<&'a str>,
}

impl<'a> TypeNames<'a> {
    pub fn in_module(module: &'a str) -> Self {
        Self {
            module: Some(module),
        }
    }

    pub fn alias_name(&self, alias: &AliasType) -> String {
        match self.module {
            Some(module) if module != alias.module => format!("{}.{}", alias.module, alias.name),
            _ => alias.name.clone(),
        }
    }
}

impl Visitor for TypeNames<'_> {
    type TypeValue = String;
    fn visit_basic_type(&mut self, basic: &BasicType, children: Vec<String>) -> String {
        basic_type_name(basic, &children)
    }
    fn visit_alias_type(&mut self, alias: &AliasType, _aliased: String) -> String {
        self.alias_name(alias)
    }

    type ParameterValue = String;
    fn visit_parameter(&mut self, parameter: &Parameter, type_: String) -> String {
        match &parameter.declared_name {
            Some(name) => format!("{type_} {name}"),
            None => type_,
        }
    }

    type FunctionValue = String;
    fn visit_function(
        &mut self,
        function: &Function,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> String {
        let mut out = format!("funcdef {}({})", function.name, inputs.join(", "));
        out.push_str(&format!(" returns ({})", outputs.join(", ")));
        out.push_str(&format!(" authentication {};", function.authentication));
        if function.is_async {
            out.insert_str(0, "async ");
        }
        out
    }

    type ModuleValue = Vec<String>;
    fn visit_module(
        &mut self,
        _module: &Module,
        components: Vec<Visited<String, String>>,
    ) -> Vec<String> {
        components
            .into_iter()
            .map(|component| match component {
                Visited::Function(signature) => signature,
                Visited::Typedef(name) => name,
            })
            .collect()
    }

    type ServiceValue = Vec<String>;
    fn visit_service(&mut self, _service: &Service, modules: Vec<Vec<String>>) -> Vec<String> {
        modules.into_iter().flatten().collect()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut TypeNames::default()))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut TypeNames::default()))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&mut TypeNames::default()))
    }
}
