use dt_kidl::{
    names::basic_type_name, AliasType, Annotations, Authentication, BasicType, Function, Module,
    Parameter, Service, TypeNames, Visited, Visitor,
};

const INDENT: &str = "    ";

/// Rendered type: the name it is referred to by and, for typedefs, the full declaration.
pub struct TypeText {
    name: String,
    declaration: Option<String>,
}

/// Prints modules back as specification text.
pub struct SpecPrinter<'a> {
    names: TypeNames<'a>,
}

impl<'a> SpecPrinter<'a> {
    pub fn new(module: &'a str) -> Self {
        Self {
            names: TypeNames::in_module(module),
        }
    }
}

impl Visitor for SpecPrinter<'_> {
    type TypeValue = TypeText;
    fn visit_basic_type(&mut self, basic: &BasicType, children: Vec<TypeText>) -> TypeText {
        let children: Vec<_> = children.into_iter().map(|c| c.name).collect();
        TypeText {
            name: basic_type_name(basic, &children),
            declaration: None,
        }
    }
    fn visit_alias_type(&mut self, alias: &AliasType, aliased: TypeText) -> TypeText {
        let name = self.names.alias_name(alias);
        let declaration = format!(
            "{}typedef {} {};",
            doc_comment(&documentation(&alias.comment, &alias.annotations)),
            aliased.name,
            alias.name
        );
        TypeText {
            name,
            declaration: Some(declaration),
        }
    }

    type ParameterValue = String;
    fn visit_parameter(&mut self, parameter: &Parameter, type_: TypeText) -> String {
        self.names.visit_parameter(parameter, type_.name)
    }

    type FunctionValue = String;
    fn visit_function(
        &mut self,
        function: &Function,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> String {
        let signature = self.names.visit_function(function, inputs, outputs);
        let doc = documentation(&function.comment, &function.annotations);
        format!("{}{signature}", doc_comment(&doc))
    }

    type ModuleValue = String;
    fn visit_module(
        &mut self,
        module: &Module,
        components: Vec<Visited<String, TypeText>>,
    ) -> String {
        let mut body = Vec::new();
        if module.default_authentication != Authentication::None {
            body.push(format!("authentication {};", module.default_authentication));
        }
        for component in components {
            match component {
                Visited::Function(text) => body.push(text),
                Visited::Typedef(TypeText {
                    declaration: Some(declaration),
                    ..
                }) => body.push(declaration),
                Visited::Typedef(_) => {}
            }
        }

        let mut out = doc_comment(&module.comment);
        out.push_str(&format!("module {} {{\n", module.name));
        for (i, item) in body.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for line in item.lines() {
                out.push_str(INDENT);
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("};\n");
        out
    }

    type ServiceValue = String;
    fn visit_service(&mut self, _service: &Service, modules: Vec<String>) -> String {
        modules.join("\n")
    }
}

/// `comment` followed by the directive lines of `annotations`.
fn documentation(comment: &str, annotations: &Annotations) -> String {
    let mut doc = comment.to_string();
    for directive in directives(annotations) {
        if !doc.is_empty() {
            doc.push('\n');
        }
        doc.push_str(&directive);
    }
    doc
}

/// Directive lines equivalent to `annotations`. Authentication is left out, it is part of the
/// funcdef signature.
fn directives(annotations: &Annotations) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(deprecated) = &annotations.deprecated {
        match &deprecated.replacement {
            Some(replacement) => lines.push(format!("@deprecated {replacement}")),
            None => lines.push("@deprecated".to_string()),
        }
    }
    if !annotations.optional.is_empty() {
        lines.push(format!("@optional {}", annotations.optional.join(" ")));
    }
    for (name, value) in &annotations.unknown {
        let words: Option<Vec<_>> = value
            .as_array()
            .and_then(|items| items.iter().map(|item| item.as_str()).collect());
        let args = match words {
            Some(words) => words.join(" "),
            None => value.to_string(),
        };
        lines.push(format!("@{name} {args}").trim_end().to_string());
    }
    lines
}

/// A `/* */` block for `doc`, one ` * ` line per documentation line. Empty for empty docs.
fn doc_comment(doc: &str) -> String {
    if doc.trim().is_empty() {
        return String::new();
    }
    let mut out = String::from("/*\n");
    for line in doc.lines() {
        out.push_str(format!(" * {line}").trim_end());
        out.push('\n');
    }
    out.push_str(" */\n");
    out
}

pub(super) fn generate(services: &[Service]) -> String {
    services
        .iter()
        .flat_map(|service| &service.modules)
        .map(|module| module.accept(&mut SpecPrinter::new(&module.name)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_kidl::{read_services, ReadOptions};
    use serde_json::json;

    #[test]
    fn prints_modules_in_declaration_order() {
        let tree = json!({ "Genomes": [{
            "!": "DefineModule", "module_name": "Genomes", "comment": "Genome tools.",
            "authentication": "required", "module_components": [
                { "!": "Typedef", "name": "Id", "comment": "An id.\n@deprecated Ref",
                  "alias_type": { "!": "Scalar", "scalar_type": "string" } },
                { "!": "Funcdef", "name": "count", "comment": "Counts.",
                  "parameters": [{ "name": "ids", "type": { "!": "List",
                      "element_type": { "!": "Typedef", "name": "Id" } } }],
                  "return_type": [{ "type": { "!": "Scalar", "scalar_type": "int" } }] }
            ]
        }]});
        let services = read_services(&tree, ReadOptions::default()).unwrap();

        assert_eq!(
            generate(&services),
            "/*\n * Genome tools.\n */\nmodule Genomes {\n    authentication required;\n\n    \
             /*\n     * An id.\n     * @deprecated Ref\n     */\n    typedef string Id;\n\n    \
             /*\n     * Counts.\n     */\n    \
             funcdef count(list<Id> ids) returns (int) authentication required;\n};\n"
        );
    }

    #[test]
    fn directives_cover_known_and_unknown_annotations() {
        let mut annotations = Annotations {
            optional: vec!["a".into(), "b".into()],
            ..Annotations::default()
        };
        annotations.unknown.insert("range".into(), json!(["0", "10"]));
        annotations
            .unknown
            .insert("searchable".into(), json!({ "ws_subset": ["features", "id"] }));
        annotations.unknown.insert("id".into(), json!(["ws", 3]));
        assert_eq!(
            directives(&annotations),
            [
                "@optional a b",
                "@range 0 10",
                r#"@searchable {"ws_subset":["features","id"]}"#,
                r#"@id ["ws",3]"#,
            ]
        );
    }

    #[test]
    fn functions_print_structured_annotations() {
        let tree = json!({ "S": [{
            "!": "DefineModule", "module_name": "M", "module_components": [
                { "!": "Funcdef", "name": "find", "comment": "Finds things.",
                  "annotations": { "deprecated": "find_all",
                                   "searchable": { "ws_subset": ["y"] } },
                  "parameters": [], "return_type": [] }
            ]
        }]});
        let services = read_services(&tree, ReadOptions::default()).unwrap();

        let spec = generate(&services);
        assert!(
            spec.contains(
                "    /*\n     * Finds things.\n     * @deprecated find_all\n     \
                 * @searchable {\"ws_subset\":[\"y\"]}\n     */\n    funcdef find() returns ()"
            ),
            "{spec}"
        );
    }
}
