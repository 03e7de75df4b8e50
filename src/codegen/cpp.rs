//! C++ Code Emitter
//!
//! Generates a header-only C++ package of trait and specification views.
//!
//! Layout, relative to the output directory:
//! ```text
//! {pkg}/include/{pkg}/
//! ├── traits/
//! │   ├── {namespace}/
//! │   │   └── {Name}Trait[_vN].hpp
//! │   ├── {namespace}.hpp
//! │   └── traits.hpp
//! ├── specifications/
//! │   ├── {namespace}/
//! │   │   └── {Name}Specification[_vN].hpp
//! │   ├── {namespace}.hpp
//! │   └── specifications.hpp
//! └── {pkg}.hpp
//! ```
//!
//! Only the kinds a package actually declares are emitted.

use std::path::Path;

use tracing::debug;

use super::{
    create_dir, doc_lines, generated_banner, license_header, write_file, Generator, Sanitizer,
    TemplateGlobals,
};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{
    NamespaceDeclaration, PackageDeclaration, SpecificationDeclaration, TraitDeclaration,
    TraitReference,
};
use crate::version::VersionToken;

// =============================================================================
// Generator
// =============================================================================

/// Emits C++ headers
pub struct CppGenerator {
    sanitizer: Sanitizer,
}

impl Default for CppGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CppGenerator {
    pub fn new() -> Self {
        Self {
            sanitizer: Sanitizer::cpp(),
        }
    }
}

/// Per-run state shared by the emit functions
struct Context<'a> {
    package: &'a PackageDeclaration,
    package_name: String,
    globals: &'a TemplateGlobals,
}

impl Generator for CppGenerator {
    fn name(&self) -> &'static str {
        "cpp"
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
        let package_dir = output_dir
            .join(&package_name)
            .join("include")
            .join(&package_name);
        create_dir(&package_dir, on_create)?;

        let ctx = Context {
            package,
            package_name,
            globals,
        };
        let mut includes = Vec::new();

        if !package.traits.is_empty() {
            let kind_dir = package_dir.join("traits");
            create_dir(&kind_dir, on_create)?;
            let mut namespace_includes = Vec::new();
            for namespace in &package.traits {
                let header = self.generate_trait_namespace(
                    &ctx,
                    namespace,
                    &kind_dir,
                    on_create,
                    diagnostics,
                )?;
                namespace_includes.push(header);
            }
            let docstring = format!("Traits defined in the '{}' package.", package.id);
            write_include_header(
                &ctx,
                &kind_dir.join("traits.hpp"),
                &docstring,
                namespace_includes,
                on_create,
            )?;
            includes.push("traits/traits.hpp".to_string());
        }

        if !package.specifications.is_empty() {
            let kind_dir = package_dir.join("specifications");
            create_dir(&kind_dir, on_create)?;
            let mut namespace_includes = Vec::new();
            for namespace in &package.specifications {
                let header = self.generate_specification_namespace(
                    &ctx,
                    namespace,
                    &kind_dir,
                    on_create,
                    diagnostics,
                )?;
                namespace_includes.push(header);
            }
            let docstring = format!("Specifications defined in the '{}' package.", package.id);
            write_include_header(
                &ctx,
                &kind_dir.join("specifications.hpp"),
                &docstring,
                namespace_includes,
                on_create,
            )?;
            includes.push("specifications/specifications.hpp".to_string());
        }

        let package_header = package_dir.join(format!("{}.hpp", ctx.package_name));
        write_include_header(&ctx, &package_header, &package.description, includes, on_create)
    }
}

// =============================================================================
// Traits
// =============================================================================

impl CppGenerator {
    /// Emit one header per trait, then the namespace header. Returns the
    /// namespace header's file name.
    fn generate_trait_namespace(
        &self,
        ctx: &Context<'_>,
        namespace: &NamespaceDeclaration<TraitDeclaration>,
        kind_dir: &Path,
        on_create: &mut dyn FnMut(&Path),
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let namespace_name = self.sanitizer.to_module_name(&namespace.id, diagnostics)?;
        let namespace_dir = kind_dir.join(&namespace_name);
        create_dir(&namespace_dir, on_create)?;

        let mut class_includes = Vec::with_capacity(namespace.members.len());
        for declaration in &namespace.members {
            let class_name =
                self.trait_class_name(&declaration.name, declaration.version, diagnostics)?;
            let contents =
                self.render_trait(ctx, &namespace_name, &class_name, declaration, diagnostics)?;
            write_file(&namespace_dir.join(format!("{}.hpp", class_name)), &contents, on_create)?;
            class_includes.push(format!("{}/{}.hpp", namespace_name, class_name));
        }
        debug!(
            namespace = namespace.id.as_str(),
            classes = class_includes.len(),
            "Emitted trait headers"
        );

        let mut docstring = vec![format!("Trait definitions in the '{}' namespace.", namespace.id)];
        if !namespace.description.is_empty() {
            docstring.push(String::new());
            docstring.push(namespace.description.clone());
        }
        let header = format!("{}.hpp", namespace_name);
        let docstring = docstring.join("\n");
        write_include_header(ctx, &kind_dir.join(&header), &docstring, class_includes, on_create)?;
        Ok(header)
    }

    fn trait_class_name(
        &self,
        name: &str,
        version: VersionToken,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let class_name = self.sanitizer.to_class_name(name, diagnostics)?;
        Ok(format!("{}Trait{}", class_name, version_suffix(version)))
    }

    fn render_trait(
        &self,
        ctx: &Context<'_>,
        namespace_name: &str,
        class_name: &str,
        declaration: &TraitDeclaration,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let mut out = file_preamble(ctx.globals);
        out.push_str("#include <optional>\n");
        out.push_str("#include <stdexcept>\n");
        out.push_str("#include <utility>\n");
        out.push_str("#include <variant>\n\n");
        out.push_str("#include <openassetio/TraitsData.hpp>\n");
        out.push_str("#include <openassetio/trait/TraitBase.hpp>\n");
        out.push_str("#include <openassetio/trait/collection.hpp>\n");
        out.push_str("#include <openassetio/typedefs.hpp>\n\n");

        open_namespaces(&mut out, &ctx.package_name, "traits", namespace_name);

        out.push_str(&doc_comment(
            &doc_lines(&declaration.description, &declaration.usage, declaration.deprecated),
            "",
        ));
        out.push_str(&format!(
            "class {0} : public openassetio::trait::TraitBase<{0}> {{\n public:\n",
            class_name
        ));
        out.push_str("  /// The unique string ID of this trait.\n");
        out.push_str(&format!(
            "  static inline const openassetio::trait::TraitId kId{{\"{}\"}};\n\n",
            string_literal(&declaration.id)
        ));
        out.push_str(&format!("  using TraitBase<{}>::TraitBase;\n", class_name));

        for property in &declaration.properties {
            let accessor = self.sanitizer.to_var_accessor_name(&property.id, diagnostics)?;
            let var_name = self.sanitizer.to_var_name(&property.id, diagnostics)?;
            let type_name = self.sanitizer.to_type(property.type_)?;
            let key = string_literal(&property.id);
            let value = if self.sanitizer.is_moveable_type(property.type_) {
                format!("std::move({})", var_name)
            } else {
                var_name.clone()
            };

            let mut getter_doc = vec![format!(
                "Gets the value of the {} property or the supplied default.",
                property.id
            )];
            let mut optional_doc =
                vec![format!("Gets the value of the {} property, if set.", property.id)];
            let mut setter_doc = vec![format!("Sets the {} property.", property.id)];
            if !property.description.is_empty() {
                for doc in [&mut getter_doc, &mut optional_doc, &mut setter_doc] {
                    doc.push(String::new());
                    doc.extend(property.description.lines().map(str::to_string));
                }
            }

            out.push('\n');
            out.push_str(&doc_comment(&getter_doc, "  "));
            out.push_str(&format!(
                "  [[nodiscard]] {0} get{1}(const {0}& defaultValue) const {{\n",
                type_name, accessor
            ));
            out.push_str(&format!(
                "    return get{}().value_or(defaultValue);\n  }}\n\n",
                accessor
            ));

            out.push_str(&doc_comment(&optional_doc, "  "));
            out.push_str(&format!(
                "  [[nodiscard]] std::optional<{}> get{}() const {{\n",
                type_name, accessor
            ));
            out.push_str(&format!(
                "    if (auto value = data()->getTraitProperty(kId, \"{}\")) {{\n",
                key
            ));
            out.push_str(&format!(
                "      if (const auto* typed = std::get_if<{}>(&*value)) {{\n        return *typed;\n      }}\n",
                type_name
            ));
            out.push_str(&format!(
                "      throw std::out_of_range{{\"Invalid stored value type: should be '{}'.\"}};\n",
                type_name
            ));
            out.push_str("    }\n    return std::nullopt;\n  }\n\n");

            out.push_str(&doc_comment(&setter_doc, "  "));
            out.push_str(&format!("  void set{}({} {}) {{\n", accessor, type_name, var_name));
            out.push_str(&format!(
                "    data()->setTraitProperty(kId, \"{}\", {});\n  }}\n",
                key, value
            ));
        }

        out.push_str("};\n");
        close_namespaces(&mut out, &ctx.package_name, "traits", namespace_name);
        Ok(out)
    }
}

// =============================================================================
// Specifications
// =============================================================================

impl CppGenerator {
    fn generate_specification_namespace(
        &self,
        ctx: &Context<'_>,
        namespace: &NamespaceDeclaration<SpecificationDeclaration>,
        kind_dir: &Path,
        on_create: &mut dyn FnMut(&Path),
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let namespace_name = self.sanitizer.to_module_name(&namespace.id, diagnostics)?;
        let namespace_dir = kind_dir.join(&namespace_name);
        create_dir(&namespace_dir, on_create)?;

        let mut class_includes = Vec::with_capacity(namespace.members.len());
        for declaration in &namespace.members {
            let class_name = format!(
                "{}Specification{}",
                self.sanitizer.to_class_name(&declaration.id, diagnostics)?,
                version_suffix(declaration.version)
            );
            let contents = self.render_specification(
                ctx,
                &namespace_name,
                &class_name,
                declaration,
                diagnostics,
            )?;
            write_file(&namespace_dir.join(format!("{}.hpp", class_name)), &contents, on_create)?;
            class_includes.push(format!("{}/{}.hpp", namespace_name, class_name));
        }
        debug!(
            namespace = namespace.id.as_str(),
            classes = class_includes.len(),
            "Emitted specification headers"
        );

        let mut docstring = vec![format!(
            "Specification definitions in the '{}' namespace.",
            namespace.id
        )];
        if !namespace.description.is_empty() {
            docstring.push(String::new());
            docstring.push(namespace.description.clone());
        }
        let header = format!("{}.hpp", namespace_name);
        let docstring = docstring.join("\n");
        write_include_header(ctx, &kind_dir.join(&header), &docstring, class_includes, on_create)?;
        Ok(header)
    }

    fn render_specification(
        &self,
        ctx: &Context<'_>,
        namespace_name: &str,
        class_name: &str,
        declaration: &SpecificationDeclaration,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let views = declaration
            .trait_set
            .iter()
            .map(|reference| self.trait_view(ctx, reference, diagnostics))
            .collect::<Result<Vec<_>>>()?;

        let mut out = file_preamble(ctx.globals);
        out.push_str("#include <utility>\n\n");
        out.push_str("#include <openassetio/TraitsData.hpp>\n");
        out.push_str("#include <openassetio/trait/collection.hpp>\n");
        out.push_str("#include <openassetio/typedefs.hpp>\n\n");
        let mut trait_includes: Vec<&str> = views.iter().map(|v| v.include.as_str()).collect();
        trait_includes.sort_unstable();
        trait_includes.dedup();
        for include in &trait_includes {
            out.push_str(&format!("#include {}\n", include));
        }
        if !trait_includes.is_empty() {
            out.push('\n');
        }

        open_namespaces(&mut out, &ctx.package_name, "specifications", namespace_name);

        out.push_str(&doc_comment(
            &doc_lines(&declaration.description, &declaration.usage, declaration.deprecated),
            "",
        ));
        out.push_str(&format!("class {} {{\n public:\n", class_name));
        out.push_str("  /// The trait IDs that make up this specification.\n");
        out.push_str("  static inline const openassetio::trait::TraitSet kTraitSet{\n");
        for view in &views {
            out.push_str(&format!("      // '{}'\n", view.id));
            out.push_str(&format!("      {}::kId,\n", view.qualified_class));
        }
        out.push_str("  };\n\n");

        out.push_str(&doc_comment(
            &[
                "Constructs an instance of this specification with a new, empty TraitsData"
                    .to_string(),
                "imbued with the specification's trait set.".to_string(),
            ],
            "  ",
        ));
        out.push_str(&format!("  static {} create() {{\n", class_name));
        out.push_str(&format!(
            "    return {}{{openassetio::TraitsData::make(kTraitSet)}};\n  }}\n\n",
            class_name
        ));
        out.push_str(&format!(
            "  explicit {}(openassetio::TraitsDataPtr traitsData) : data_{{std::move(traitsData)}} {{}}\n\n",
            class_name
        ));
        out.push_str("  /// The underlying data for this specification.\n");
        out.push_str(
            "  [[nodiscard]] const openassetio::TraitsDataPtr& traitsData() const { return data_; }\n",
        );

        for view in &views {
            out.push('\n');
            out.push_str(&doc_comment(
                &[
                    format!("Returns the view for the '{}' trait wrapped around", view.id),
                    "the data held in this instance.".to_string(),
                ],
                "  ",
            ));
            out.push_str(&format!(
                "  [[nodiscard]] {0} {1}Trait() const {{ return {0}{{data_}}; }}\n",
                view.qualified_class, view.accessor
            ));
        }

        out.push_str("\n private:\n  openassetio::TraitsDataPtr data_;\n};\n");
        close_namespaces(&mut out, &ctx.package_name, "specifications", namespace_name);
        Ok(out)
    }

    fn trait_view(
        &self,
        ctx: &Context<'_>,
        reference: &TraitReference,
        diagnostics: &mut Diagnostics,
    ) -> Result<TraitView> {
        let package_name = self.sanitizer.to_module_name(&reference.package, diagnostics)?;
        let namespace_name = self.sanitizer.to_module_name(&reference.namespace, diagnostics)?;
        let class_name = self.trait_class_name(&reference.name, reference.version, diagnostics)?;
        let accessor = self
            .sanitizer
            .to_trait_accessor_name(&reference.unique_name_parts, diagnostics)?;

        let include = if reference.is_external_to(&ctx.package.id) {
            format!("<{}/traits/{}/{}.hpp>", package_name, namespace_name, class_name)
        } else {
            format!("\"../../traits/{}/{}.hpp\"", namespace_name, class_name)
        };
        Ok(TraitView {
            id: reference.id.clone(),
            qualified_class: format!(
                "{}::traits::{}::{}",
                package_name, namespace_name, class_name
            ),
            accessor,
            include,
        })
    }
}

/// How a specification refers to one of its traits
struct TraitView {
    id: String,
    qualified_class: String,
    accessor: String,
    include: String,
}

// =============================================================================
// Rendering Helpers
// =============================================================================

/// Class name suffix; the default version has none
fn version_suffix(version: VersionToken) -> String {
    if version.is_default() {
        String::new()
    } else {
        version.class_suffix()
    }
}

fn file_preamble(globals: &TemplateGlobals) -> String {
    let mut out = String::new();
    for line in license_header(globals) {
        out.push_str(&format!("// {}\n", line));
    }
    out.push_str(&format!("// {}\n", generated_banner(globals)));
    out.push_str("#pragma once\n\n");
    out
}

fn doc_comment(lines: &[String], indent: &str) -> String {
    let mut out = format!("{}/**\n", indent);
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{} *\n", indent));
        } else {
            out.push_str(&format!("{} * {}\n", indent, line));
        }
    }
    out.push_str(&format!("{} */\n", indent));
    out
}

fn open_namespaces(out: &mut String, package_name: &str, kind: &str, namespace_name: &str) {
    out.push_str(&format!("namespace {} {{\n", package_name));
    out.push_str(&format!("namespace {} {{\n", kind));
    out.push_str(&format!("namespace {} {{\n\n", namespace_name));
}

fn close_namespaces(out: &mut String, package_name: &str, kind: &str, namespace_name: &str) {
    out.push_str(&format!("\n}}  // namespace {}\n", namespace_name));
    out.push_str(&format!("}}  // namespace {}\n", kind));
    out.push_str(&format!("}}  // namespace {}\n", package_name));
}

/// Escape text for a C++ string literal
fn string_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write a header that only documents and includes other headers
fn write_include_header(
    ctx: &Context<'_>,
    path: &Path,
    docstring: &str,
    mut includes: Vec<String>,
    on_create: &mut dyn FnMut(&Path),
) -> Result<()> {
    includes.sort();
    let mut out = file_preamble(ctx.globals);
    let lines: Vec<String> = docstring.lines().map(str::to_string).collect();
    if !lines.is_empty() {
        out.push_str(&doc_comment(&lines, ""));
    }
    for include in &includes {
        out.push_str(&format!("#include \"{}\"\n", include));
    }
    write_file(path, &out, on_create)
}
