//! The compilation report: a cross-reference of a module's functions against the user-edited
//! regions of its generated server implementation.

mod markers;
mod writer;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use dt_kidl::{
    names::basic_type_name, AliasType, BasicType, Function, Module, Parameter, Service, TypeNames,
    Visited, Visitor,
};
use serde::Serialize;

use crate::error::ReportError;

pub use markers::{find_place, FunctionPlace};
pub use writer::{write_report, write_reports, ModuleReport, ReportOutcome, ServerLanguage};

/// Tool version and build identifier stamped into every report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub sdk_version: String,
    pub sdk_git_commit: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecFile {
    pub file_name: String,
    pub content: String,
}

impl SpecFile {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(ReportError::io(path))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, content })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub module_name: String,
    pub sdk_version: String,
    pub sdk_git_commit: String,
    /// Implementation file, relative to the module directory.
    pub impl_file_path: String,
    pub spec_files: Vec<SpecFile>,
    pub function_places: BTreeMap<String, FunctionPlace>,
    pub functions: BTreeMap<String, FunctionReport>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionReport {
    pub name: String,
    pub comment: String,
    pub input: Vec<TypeSummary>,
    pub output: Vec<TypeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<FunctionPlace>,
}

/// Display name of a parameter type, plus the documentation of the typedef it names, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Builds the report of `module` against the text of its implementation file.
pub fn build_report(
    module: &Module,
    impl_text: &str,
    comment_prefix: &str,
    impl_file_path: &str,
    spec_files: Vec<SpecFile>,
    build: &BuildInfo,
) -> Result<Report, ReportError> {
    let mut visitor = ReportVisitor {
        names: TypeNames::in_module(&module.name),
        impl_text,
        comment_prefix,
    };
    let functions = module.accept(&mut visitor)?;

    let function_places = functions
        .values()
        .filter_map(|f| Some((f.name.clone(), f.place?)))
        .collect();
    Ok(Report {
        module_name: module.name.clone(),
        sdk_version: build.sdk_version.clone(),
        sdk_git_commit: build.sdk_git_commit.clone(),
        impl_file_path: impl_file_path.to_string(),
        spec_files,
        function_places,
        functions,
    })
}

struct ReportVisitor<'a> {
    names: TypeNames<'a>,
    impl_text: &'a str,
    comment_prefix: &'a str,
}

impl Visitor for ReportVisitor<'_> {
    type TypeValue = TypeSummary;
    fn visit_basic_type(&mut self, basic: &BasicType, children: Vec<TypeSummary>) -> TypeSummary {
        let children: Vec<_> = children.into_iter().map(|c| c.type_).collect();
        TypeSummary {
            type_: basic_type_name(basic, &children),
            comment: None,
        }
    }
    fn visit_alias_type(&mut self, alias: &AliasType, _aliased: TypeSummary) -> TypeSummary {
        TypeSummary {
            type_: self.names.alias_name(alias),
            comment: Some(alias.comment.clone()),
        }
    }

    type ParameterValue = TypeSummary;
    fn visit_parameter(&mut self, _parameter: &Parameter, type_: TypeSummary) -> TypeSummary {
        type_
    }

    type FunctionValue = Result<FunctionReport, ReportError>;
    fn visit_function(
        &mut self,
        function: &Function,
        inputs: Vec<TypeSummary>,
        outputs: Vec<TypeSummary>,
    ) -> Self::FunctionValue {
        let place = find_place(self.impl_text, self.comment_prefix, &function.name)?;
        if place.is_none() {
            tracing::debug!(function = %function.name, "no marked region");
        }
        Ok(FunctionReport {
            name: function.name.clone(),
            comment: function.literal_comment().to_string(),
            input: inputs,
            output: outputs,
            place,
        })
    }

    type ModuleValue = Result<BTreeMap<String, FunctionReport>, ReportError>;
    fn visit_module(
        &mut self,
        _module: &Module,
        components: Vec<Visited<Self::FunctionValue, TypeSummary>>,
    ) -> Self::ModuleValue {
        components
            .into_iter()
            .filter_map(|component| match component {
                Visited::Function(report) => Some(report.map(|r| (r.name.clone(), r))),
                Visited::Typedef(_) => None,
            })
            .collect()
    }

    type ServiceValue = Vec<Self::ModuleValue>;
    fn visit_service(
        &mut self,
        _service: &Service,
        modules: Vec<Self::ModuleValue>,
    ) -> Self::ServiceValue {
        modules
    }
}

/// Resolves the report path of `module`: a `{module}` placeholder in `out` is replaced with the
/// module name.
pub fn report_path(out: &Path, module: &str) -> PathBuf {
    let out = out.to_string_lossy();
    if out.contains("{module}") {
        PathBuf::from(out.replace("{module}", module))
    } else {
        PathBuf::from(out.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_kidl::{Authentication, TypeScope};
    use serde_json::{json, Value};

    fn module(components: Value) -> Module {
        let node = json!({ "!": "DefineModule", "module_name": "M",
            "module_components": components });
        let mut scope = TypeScope::new("M");
        Module::map_from_raw(&mut scope, node.as_object().unwrap(), Authentication::None).unwrap()
    }

    fn funcdef(name: &str) -> Value {
        json!({ "!": "Funcdef", "name": name, "comment": "Docs.\n@deprecated",
            "parameters": [{ "type": { "!": "Typedef", "name": "Id" } }],
            "return_type": [{ "type": { "!": "Mapping",
                "key_type": { "!": "Scalar", "scalar_type": "string" },
                "value_type": { "!": "Typedef", "name": "Id" } } }] })
    }

    #[test]
    fn functions_without_markers_have_no_place() {
        let module = module(json!([
            { "!": "Typedef", "name": "Id", "comment": "An id.",
              "alias_type": { "!": "Scalar", "scalar_type": "string" } },
            funcdef("found"),
            funcdef("missing"),
        ]));
        let text = "#BEGIN found\n#END found\n";
        let report =
            build_report(&module, text, "#", "lib/M/MImpl.py", vec![], &BuildInfo::default())
                .unwrap();

        assert_eq!(report.function_places.len(), 1);
        assert_eq!(
            report.function_places["found"],
            FunctionPlace { start_line: 2, end_line: 2 }
        );
        assert!(!report.function_places.contains_key("missing"));
        assert_eq!(report.functions.len(), 2);
        assert_eq!(report.functions["missing"].place, None);

        let found = &report.functions["found"];
        assert_eq!(found.comment, "Docs.\n@deprecated");
        assert_eq!(
            found.input,
            [TypeSummary { type_: "Id".into(), comment: Some("An id.".into()) }]
        );
        assert_eq!(
            found.output,
            [TypeSummary { type_: "mapping<string, Id>".into(), comment: None }]
        );
    }

    #[test]
    fn serialized_keys_are_camel_case() {
        let module = module(json!([{ "!": "Funcdef", "name": "f", "comment": "",
            "parameters": [], "return_type": [] }]));
        let build = BuildInfo {
            sdk_version: "1.2.3".into(),
            sdk_git_commit: "abc".into(),
        };
        let spec = SpecFile {
            file_name: "M.spec".into(),
            content: "module M {};".into(),
        };
        let report = build_report(&module, "#BEGIN f\n\n#END f", "#", "impl.py", vec![spec], &build)
            .unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["moduleName"], "M");
        assert_eq!(value["sdkVersion"], "1.2.3");
        assert_eq!(value["sdkGitCommit"], "abc");
        assert_eq!(value["implFilePath"], "impl.py");
        assert_eq!(value["specFiles"][0]["fileName"], "M.spec");
        assert_eq!(value["functionPlaces"]["f"], json!({ "startLine": 2, "endLine": 3 }));
        assert_eq!(value["functions"]["f"]["place"]["startLine"], 2);
    }

    #[test]
    fn invalid_names_fail_the_report() {
        let module = module(json!([{ "!": "Funcdef", "name": "bad name", "comment": "",
            "parameters": [], "return_type": [] }]));
        let err = build_report(&module, "", "#", "impl.py", vec![], &BuildInfo::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidMarkerName(_)));
    }

    #[test]
    fn report_paths_substitute_module() {
        assert_eq!(
            report_path(Path::new("out/{module}.json"), "Genomes"),
            PathBuf::from("out/Genomes.json")
        );
        assert_eq!(
            report_path(Path::new("compile_report.json"), "Genomes"),
            PathBuf::from("compile_report.json")
        );
    }
}
