//! Python Code Emitter
//!
//! Generates an importable Python package of trait and specification views.
//!
//! Layout, relative to the output directory:
//! ```text
//! {pkg}/
//! ├── traits/
//! │   ├── {namespace}.py
//! │   └── __init__.py
//! ├── specifications/
//! │   ├── {namespace}.py
//! │   └── __init__.py
//! └── __init__.py
//! ```
//!
//! Every class name carries its version (`{Name}Trait_v1`).

use std::path::Path;

use tracing::debug;

use super::{
    create_dir, doc_lines, generated_banner, license_header, package_dependencies, write_file,
    Generator, Sanitizer, TemplateGlobals,
};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{
    NamespaceDeclaration, PackageDeclaration, PropertyType, SpecificationDeclaration,
    TraitDeclaration,
};

// =============================================================================
// Generator
// =============================================================================

/// Emits Python modules
pub struct PythonGenerator {
    sanitizer: Sanitizer,
}

impl Default for PythonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonGenerator {
    pub fn new() -> Self {
        Self {
            sanitizer: Sanitizer::python(),
        }
    }
}

impl Generator for PythonGenerator {
    fn name(&self) -> &'static str {
        "python"
    }

    fn generate(
        &self,
        package: &PackageDeclaration,
        globals: &TemplateGlobals,
        output_dir: &Path,
        on_create: &mut dyn FnMut(&Path),
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let package_name = self.sanitizer.to_module_name(&package.id, diagnostics)?;
        let package_dir = output_dir.join(&package_name);
        create_dir(&package_dir, on_create)?;

        let mut submodules = Vec::new();

        if !package.traits.is_empty() {
            let kind_dir = package_dir.join("traits");
            create_dir(&kind_dir, on_create)?;
            let mut modules = Vec::with_capacity(package.traits.len());
            for namespace in &package.traits {
                let module = self.sanitizer.to_module_name(&namespace.id, diagnostics)?;
                let contents = self.render_traits(globals, namespace, diagnostics)?;
                write_file(&kind_dir.join(format!("{}.py", module)), &contents, on_create)?;
                modules.push(module);
            }
            debug!(package = package.id.as_str(), modules = modules.len(), "Emitted trait modules");
            let docstring = format!("Traits defined in the '{}' package.", package.id);
            let init = render_init(globals, &docstring, modules);
            write_file(&kind_dir.join("__init__.py"), &init, on_create)?;
            submodules.push("traits".to_string());
        }

        if !package.specifications.is_empty() {
            let kind_dir = package_dir.join("specifications");
            create_dir(&kind_dir, on_create)?;
            let mut modules = Vec::with_capacity(package.specifications.len());
            for namespace in &package.specifications {
                let module = self.sanitizer.to_module_name(&namespace.id, diagnostics)?;
                let contents =
                    self.render_specifications(package, globals, namespace, diagnostics)?;
                write_file(&kind_dir.join(format!("{}.py", module)), &contents, on_create)?;
                modules.push(module);
            }
            debug!(
                package = package.id.as_str(),
                modules = modules.len(),
                "Emitted specification modules"
            );
            let docstring = format!("Specifications defined in the '{}' package.", package.id);
            let init = render_init(globals, &docstring, modules);
            write_file(&kind_dir.join("__init__.py"), &init, on_create)?;
            submodules.push("specifications".to_string());
        }

        write_file(
            &package_dir.join("__init__.py"),
            &render_init(globals, &package.description, submodules),
            on_create,
        )
    }
}

// =============================================================================
// Traits
// =============================================================================

impl PythonGenerator {
    fn render_traits(
        &self,
        globals: &TemplateGlobals,
        namespace: &NamespaceDeclaration<TraitDeclaration>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let mut out = module_preamble(
            globals,
            &namespace_docstring("Trait", &namespace.id, &namespace.description),
        );
        out.push_str("from typing import Union\n\n");
        out.push_str("from openassetio.trait import TraitsData\n");

        for declaration in &namespace.members {
            let class_name = format!(
                "{}Trait{}",
                self.sanitizer.to_class_name(&declaration.name, diagnostics)?,
                declaration.version.class_suffix()
            );
            out.push_str("\n\n");
            self.render_trait(&mut out, &class_name, declaration, diagnostics)?;
        }
        Ok(out)
    }

    fn render_trait(
        &self,
        out: &mut String,
        class_name: &str,
        declaration: &TraitDeclaration,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        out.push_str(&format!("class {}:\n", class_name));
        out.push_str(&docstring(
            &doc_lines(&declaration.description, &declaration.usage, declaration.deprecated),
            "    ",
        ));
        out.push_str(&format!("    kId = {}\n\n", string_literal(&declaration.id)));

        out.push_str("    def __init__(self, traitsData):\n");
        out.push_str(&docstring(
            &[
                "Construct this trait view, wrapping the given data.".to_string(),
                String::new(),
                "@param traitsData TraitsData The target data that holds/will hold".to_string(),
                "the trait's properties.".to_string(),
            ],
            "        ",
        ));
        out.push_str("        self.__data = traitsData\n\n");

        out.push_str("    def isImbued(self):\n");
        out.push_str(&method_docstring(&[
            "Checks whether the data this trait has been applied to",
            "actually has this trait.",
        ]));
        out.push_str("        return self.isImbuedTo(self.__data)\n\n");

        out.push_str("    @classmethod\n    def isImbuedTo(cls, traitsData):\n");
        let doc = method_docstring(&["Checks whether the given data actually has this trait."]);
        out.push_str(&doc);
        out.push_str("        return traitsData.hasTrait(cls.kId)\n\n");

        out.push_str("    def imbue(self):\n");
        out.push_str(&docstring(&["Adds this trait to the held data.".to_string()], "        "));
        out.push_str("        self.__data.addTrait(self.kId)\n\n");

        out.push_str("    @classmethod\n    def imbueTo(cls, traitsData):\n");
        out.push_str(&method_docstring(&["Adds this trait to the provided traits data."]));
        out.push_str("        traitsData.addTrait(cls.kId)\n");

        for property in &declaration.properties {
            let accessor = self.sanitizer.to_var_accessor_name(&property.id, diagnostics)?;
            let var_name = self.sanitizer.to_var_name(&property.id, diagnostics)?;
            let type_name = self.sanitizer.to_type(property.type_)?;
            let key = string_literal(&property.id);
            let type_check = isinstance_check("value", type_name, property.type_);
            let arg_check = isinstance_check(&var_name, type_name, property.type_);

            let mut setter_doc = vec![format!("Sets the {} property.", property.id)];
            let mut getter_doc = vec![format!(
                "Gets the value of the {} property or the supplied default.",
                property.id
            )];
            if !property.description.is_empty() {
                for doc in [&mut setter_doc, &mut getter_doc] {
                    doc.push(String::new());
                    doc.extend(property.description.lines().map(str::to_string));
                }
            }

            out.push('\n');
            out.push_str(&format!("    def set{}(self, {}: {}):\n", accessor, var_name, type_name));
            out.push_str(&docstring(&setter_doc, "        "));
            out.push_str(&format!("        if not {}:\n", arg_check));
            out.push_str(&format!(
                "            raise TypeError(\"{} must be a '{}'.\")\n",
                python_escape(&property.id),
                type_name
            ));
            out.push_str(&format!(
                "        self.__data.setTraitProperty(self.kId, {}, {})\n\n",
                key, var_name
            ));

            out.push_str(&format!(
                "    def get{}(self, defaultValue: {}=None) -> Union[{}, None]:\n",
                accessor, type_name, type_name
            ));
            out.push_str(&docstring(&getter_doc, "        "));
            out.push_str(&format!(
                "        value = self.__data.getTraitProperty(self.kId, {})\n",
                key
            ));
            out.push_str("        if value is None:\n            return defaultValue\n\n");
            out.push_str(&format!("        if not {}:\n", type_check));
            out.push_str("            if defaultValue is None:\n");
            out.push_str(&format!(
                "                raise TypeError(f\"Invalid stored value type: '{{type(value).__name__}}' should be '{}'.\")\n",
                type_name
            ));
            out.push_str("            return defaultValue\n");
            out.push_str("        return value\n");
        }
        Ok(())
    }
}

// =============================================================================
// Specifications
// =============================================================================

impl PythonGenerator {
    fn render_specifications(
        &self,
        package: &PackageDeclaration,
        globals: &TemplateGlobals,
        namespace: &NamespaceDeclaration<SpecificationDeclaration>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let mut out = module_preamble(
            globals,
            &namespace_docstring("Specification", &namespace.id, &namespace.description),
        );
        out.push_str("from openassetio.trait import TraitsData\n\n");

        let has_local = namespace
            .members
            .iter()
            .flat_map(|s| s.trait_set.iter())
            .any(|r| !r.is_external_to(&package.id));
        if has_local {
            out.push_str("from .. import traits\n");
        }
        for dependency in package_dependencies(&package.id, &namespace.members) {
            let module = self.sanitizer.to_module_name(&dependency, diagnostics)?;
            out.push_str(&format!("import {}.traits\n", module));
        }

        for declaration in &namespace.members {
            let class_name = format!(
                "{}Specification{}",
                self.sanitizer.to_class_name(&declaration.id, diagnostics)?,
                declaration.version.class_suffix()
            );
            out.push_str("\n\n");
            self.render_specification(&mut out, package, &class_name, declaration, diagnostics)?;
        }
        Ok(out)
    }

    fn render_specification(
        &self,
        out: &mut String,
        package: &PackageDeclaration,
        class_name: &str,
        declaration: &SpecificationDeclaration,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let mut views = Vec::with_capacity(declaration.trait_set.len());
        for reference in &declaration.trait_set {
            let namespace = self.sanitizer.to_module_name(&reference.namespace, diagnostics)?;
            let class = format!(
                "{}Trait{}",
                self.sanitizer.to_class_name(&reference.name, diagnostics)?,
                reference.version.class_suffix()
            );
            let qualified = if reference.is_external_to(&package.id) {
                let package_module =
                    self.sanitizer.to_module_name(&reference.package, diagnostics)?;
                format!("{}.traits.{}.{}", package_module, namespace, class)
            } else {
                format!("traits.{}.{}", namespace, class)
            };
            let accessor = self
                .sanitizer
                .to_trait_accessor_name(&reference.unique_name_parts, diagnostics)?;
            views.push((reference.id.as_str(), qualified, accessor));
        }

        out.push_str(&format!("class {}:\n", class_name));
        out.push_str(&docstring(
            &doc_lines(&declaration.description, &declaration.usage, declaration.deprecated),
            "    ",
        ));
        out.push_str("    kTraitSet = {\n");
        for (id, qualified, _) in &views {
            out.push_str(&format!("        # {}\n", string_literal(id)));
            out.push_str(&format!("        {}.kId,\n", qualified));
        }
        out.push_str("    }\n\n");

        out.push_str("    def __init__(self, traitsData):\n");
        out.push_str(&docstring(
            &[
                "Constructs the specification as a view on the supplied".to_string(),
                "shared TraitsData instance.".to_string(),
            ],
            "        ",
        ));
        out.push_str("        self.__data = traitsData\n\n");

        out.push_str("    @classmethod\n    def create(cls):\n");
        out.push_str(&docstring(
            &[
                "Returns a new instance of the Specification, holding a new".to_string(),
                "TraitsData instance, pre-populated with all of the".to_string(),
                "specification's traits.".to_string(),
            ],
            "        ",
        ));
        out.push_str("        data = TraitsData(cls.kTraitSet)\n        return cls(data)\n\n");

        out.push_str("    def traitsData(self):\n");
        out.push_str(&method_docstring(&[
            "Returns the underlying (shared) TraitsData instance held by this",
            "specification.",
        ]));
        out.push_str("        return self.__data\n");

        for (id, qualified, accessor) in &views {
            out.push('\n');
            out.push_str(&format!("    def {}Trait(self):\n", accessor));
            out.push_str(&docstring(
                &[
                    format!("Returns the view for the '{}' trait wrapped around", id),
                    "the data held in this instance.".to_string(),
                ],
                "        ",
            ));
            out.push_str(&format!("        return {}(self.traitsData())\n", qualified));
        }
        Ok(())
    }
}

// =============================================================================
// Rendering Helpers
// =============================================================================

fn namespace_docstring(kind: &str, id: &str, description: &str) -> Vec<String> {
    let mut lines = vec![format!("{} definitions in the '{}' namespace.", kind, id)];
    if !description.is_empty() {
        lines.push(String::new());
        lines.extend(description.lines().map(str::to_string));
    }
    lines
}

/// Licence comment, module docstring and banner
fn module_preamble(globals: &TemplateGlobals, doc: &[String]) -> String {
    let mut out = String::new();
    for line in license_header(globals) {
        out.push_str(&format!("# {}\n", line));
    }
    out.push_str(&docstring(doc, ""));
    out.push_str(&format!("\n# {}\n\n", generated_banner(globals)));
    out
}

/// A package `__init__.py` that imports its submodules
fn render_init(globals: &TemplateGlobals, description: &str, mut modules: Vec<String>) -> String {
    modules.sort();
    let doc: Vec<String> = description.lines().map(str::to_string).collect();
    let mut out = module_preamble(globals, &doc);
    for module in &modules {
        out.push_str(&format!("from . import {}\n", module));
    }
    out
}

/// Docstring for a method body
fn method_docstring(lines: &[&str]) -> String {
    let lines: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    docstring(&lines, "        ")
}

fn docstring(lines: &[String], indent: &str) -> String {
    let mut out = format!("{}\"\"\"\n", indent);
    for line in lines {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{}{}\n", indent, python_escape(line)));
        }
    }
    out.push_str(&format!("{}\"\"\"\n", indent));
    out
}

/// `bool` is a subclass of `int` in Python, so integer checks exclude it
fn isinstance_check(var: &str, type_name: &str, property_type: PropertyType) -> String {
    match property_type {
        PropertyType::Integer => format!(
            "(isinstance({0}, {1}) and not isinstance({0}, bool))",
            var, type_name
        ),
        _ => format!("isinstance({}, {})", var, type_name),
    }
}

fn python_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn string_literal(s: &str) -> String {
    format!("\"{}\"", python_escape(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docstring_indents_and_keeps_blank_lines() {
        let lines = vec!["One.".to_string(), String::new(), "Two.".to_string()];
        assert_eq!(docstring(&lines, "    "), "    \"\"\"\n    One.\n\n    Two.\n    \"\"\"\n");
    }

    #[test]
    fn test_integer_check_excludes_bool() {
        assert_eq!(
            isinstance_check("v", "int", PropertyType::Integer),
            "(isinstance(v, int) and not isinstance(v, bool))"
        );
        assert_eq!(isinstance_check("v", "str", PropertyType::String), "isinstance(v, str)");
    }

    #[test]
    fn test_init_imports_are_sorted() {
        let globals = TemplateGlobals::new();
        let modules = vec!["specifications".to_string(), "traits".to_string()];
        let init = render_init(&globals, "Pkg.", modules);
        assert!(init.starts_with("\"\"\"\nPkg.\n\"\"\"\n"));
        assert!(init.ends_with("from . import specifications\nfrom . import traits\n"));
    }

    #[test]
    fn test_namespace_docstring() {
        assert_eq!(
            namespace_docstring("Trait", "aNamespace", "A Namespace"),
            vec!["Trait definitions in the 'aNamespace' namespace.", "", "A Namespace"]
        );
    }
}
