//! Engine driver: one module in, namespaced declaration trees out.

use crate::catalog::{Ownership, TypeCatalog};
use crate::convert::convert_type;
use crate::dependencies::ModuleDependency;
use crate::diagnostics::Diagnostic;
use crate::error::EngineError;
use crate::mapper::{TypeMapper, flatten_full_name, namespace_emitted_name};
use crate::options::EngineOptions;
use crate::pass::ModulePass;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use tsb_common::diagnostic_codes as dc;
use tsb_model::{ModuleLoader, NamespaceDecl, SourceType};

/// Everything produced for one module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutput {
    pub module: String,
    pub namespaces: Vec<NamespaceDecl>,
    pub diagnostics: Vec<Diagnostic>,
    pub dependencies: Vec<ModuleDependency>,
}

impl ModuleOutput {
    pub fn namespace(&self, name: &str) -> Option<&NamespaceDecl> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn diagnostics_with_code(&self, code: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}

pub struct BindingEngine<'l> {
    loader: &'l dyn ModuleLoader,
    options: EngineOptions,
}

impl<'l> BindingEngine<'l> {
    pub fn new(loader: &'l dyn ModuleLoader, options: EngineOptions) -> Self {
        Self { loader, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Convert one module. Only a module that cannot be loaded is fatal;
    /// every other failure becomes a diagnostic.
    #[instrument(level = "info", skip(self))]
    pub fn generate(&self, module: &str) -> Result<ModuleOutput, EngineError> {
        let loaded = self
            .loader
            .load_module(module)
            .map_err(|source| EngineError::ModuleLoad {
                module: module.to_string(),
                source,
            })?;
        let module_name = loaded.name.clone();

        let mut pass = ModulePass::new(&module_name, self.options.policy.clone());
        let catalog = TypeCatalog::build(self.loader, loaded, &self.options, &mut pass.sink);
        let types = catalog.emitted_types();

        reserve_declarations(&types, &self.options, &mut pass);

        let mut namespaces: IndexMap<String, NamespaceDecl> = IndexMap::new();
        for ty in &types {
            pass.begin_type();
            let namespace = namespaces.entry(ty.namespace.clone()).or_insert_with(|| {
                NamespaceDecl::new(ty.namespace.clone(), namespace_emitted_name(&self.options, &ty.namespace))
            });
            let converted = {
                let mut mapper =
                    TypeMapper::new(&catalog, &self.options, &mut pass, ty.namespace.clone(), ty.full_name.clone());
                convert_type(&mut mapper, ty)
            };
            let declarations = match converted {
                Ok(declarations) => declarations,
                Err(err) => {
                    warn!(ty = %ty.full_name, error = %err, "type conversion failed");
                    let context = pass.sink.context().with_type(ty.full_name.clone());
                    pass.sink.report(
                        dc::TYPE_CONVERSION_FAILED,
                        &[&ty.full_name, &module_name, &err.to_string()],
                        context,
                    );
                    continue;
                }
            };
            for declaration in declarations {
                let name = declaration.name().to_string();
                if let Err(err) = namespace.push(declaration) {
                    debug!(name = %name, error = %err, "declaration rejected");
                    let context = pass.sink.context().with_type(ty.full_name.clone());
                    pass.sink
                        .report(dc::LATE_DECLARATION_REJECTED, &[&name, &ty.namespace], context);
                }
            }
        }

        for (name, namespace) in &mut namespaces {
            namespace.seal_ordinary();
            for alias in pass.take_aliases(name) {
                let alias_name = alias.name.clone();
                if let Err(err) = namespace.push_alias(alias) {
                    debug!(name = %alias_name, error = %err, "alias rejected");
                    let context = pass.sink.context();
                    pass.sink
                        .report(dc::LATE_DECLARATION_REJECTED, &[&alias_name, name], context);
                }
            }
        }

        // A converging ancestor nothing references on its own is kept only
        // as an alias target.
        let bases: Vec<String> = pass
            .diamond_candidates()
            .filter(|c| catalog.is_local_emitted(c) && !pass.is_used(c))
            .map(str::to_string)
            .collect();
        for base in &bases {
            if let Ownership::Local(ty) = catalog.resolve_owner(catalog.module(), base) {
                if let Some(namespace) = namespaces.get_mut(&ty.namespace) {
                    namespace.mark_diamond_base(base);
                }
            }
        }

        for namespace in namespaces.values_mut() {
            namespace.finalize();
        }

        let ModulePass {
            sink, dependencies, ..
        } = pass;
        let output = ModuleOutput {
            module: module_name,
            namespaces: namespaces.into_values().collect(),
            diagnostics: sink.into_vec(),
            dependencies: dependencies.into_entries(),
        };
        info!(
            module = %output.module,
            namespaces = output.namespaces.len(),
            diagnostics = output.diagnostics.len(),
            dependencies = output.dependencies.len(),
            "module converted"
        );
        Ok(output)
    }
}

/// Reserve every declaration name up front, so references rendered while
/// converting agree with the declarations they point at.
pub(crate) fn reserve_declarations(types: &[&SourceType], options: &EngineOptions, pass: &mut ModulePass) {
    for ty in types {
        let flat = flatten_full_name(options, &ty.full_name, Some(ty.kind));
        let name = pass.reserve_declaration(&ty.namespace, &ty.full_name, &flat.name);
        let context = pass.sink.context().with_type(ty.full_name.clone());
        if let Some(rename) = &flat.invalid_rename {
            pass.sink
                .report(dc::INVALID_RENAME, &[&ty.full_name, rename, &name], context.clone());
        }
        if let Some(unsanitized) = &flat.unsanitized {
            pass.sink.report(dc::IDENTIFIER_SANITIZED, &[unsanitized, &name], context);
        }
    }
}
