//! Manifest loading: from a JSON file to a declaration set ready for
//! `rebuild`.

use std::collections::HashMap;
use std::path::Path;

use componentry_common::constants::BASE_MODULE;
use componentry_common::error::{ComponentError, Result};
use componentry_common::types::ModuleId;
use componentry_core::declaration::DeclarationSet;

use crate::graph::ModuleGraph;
use crate::manifest::{ComponentSpec, Manifest, ModuleSpec};

/// Reads and loads the manifest at `path`.
///
/// # Errors
///
/// Returns [`ComponentError::Io`] if the file cannot be read, and any error
/// of [`load`].
pub fn load_manifest(path: &Path) -> Result<DeclarationSet> {
    let content = std::fs::read_to_string(path).map_err(|source| ComponentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = parse_manifest(&content)?;
    tracing::info!(
        path = %path.display(),
        modules = set.modules().count(),
        declarations = set.len(),
        "manifest loaded"
    );
    Ok(set)
}

/// Parses manifest JSON and loads it.
///
/// # Errors
///
/// Returns [`ComponentError::Serialization`] for malformed JSON, and any
/// error of [`load`].
pub fn parse_manifest(content: &str) -> Result<DeclarationSet> {
    let manifest: Manifest = serde_json::from_str(content)?;
    load(&manifest)
}

/// Orders the modules of `manifest` and collects their declarations.
///
/// The built-in base module always comes first and contributes the
/// universal base component; any module may depend on it.
///
/// # Errors
///
/// - [`ComponentError::Config`] for a duplicate module name or cyclic
///   dependencies.
/// - [`ComponentError::NotFound`] for a dependency on an unknown module.
pub fn load(manifest: &Manifest) -> Result<DeclarationSet> {
    let mut graph = ModuleGraph::new();
    let mut nodes = HashMap::new();
    let mut specs: HashMap<&str, &ModuleSpec> = HashMap::new();

    for module in &manifest.modules {
        if module.name == BASE_MODULE || specs.insert(&module.name, module).is_some() {
            return Err(ComponentError::Config {
                message: format!("module '{}' is declared more than once", module.name),
            });
        }
        let _ = nodes.insert(module.name.as_str(), graph.add_module(&module.name));
    }
    for module in &manifest.modules {
        let dependent = nodes[module.name.as_str()];
        for dependency in &module.depends {
            if dependency == BASE_MODULE {
                continue;
            }
            let &target = nodes
                .get(dependency.as_str())
                .ok_or_else(|| ComponentError::NotFound {
                    kind: "module",
                    id: format!("{dependency} (required by {})", module.name),
                })?;
            graph.add_dependency(dependent, target);
        }
    }

    let mut set = DeclarationSet::with_base();
    for name in graph.resolve_order()? {
        let module = specs[name.as_str()];
        let id = ModuleId::new(name.as_str());
        tracing::debug!(module = %id, components = module.components.len(), "module ordered");
        set.declare_all(id, module.components.iter().map(ComponentSpec::to_declaration));
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(set: &DeclarationSet) -> Vec<&str> {
        set.modules().map(|(id, _)| id.as_str()).collect()
    }

    #[test]
    fn base_module_comes_first() {
        let set = parse_manifest(r#"{"modules": [{"name": "sale"}]}"#).expect("load");
        assert_eq!(order(&set), vec![BASE_MODULE, "sale"]);
    }

    #[test]
    fn dependencies_are_loaded_first() {
        let manifest = json!({"modules": [
            {"name": "connector_magento", "depends": ["connector"]},
            {"name": "connector", "depends": ["component"]},
        ]});
        let set = parse_manifest(&manifest.to_string()).expect("load");
        assert_eq!(order(&set), vec![BASE_MODULE, "connector", "connector_magento"]);
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let manifest = json!({"modules": [{"name": "a"}, {"name": "a"}]});
        let err = parse_manifest(&manifest.to_string()).unwrap_err();
        assert!(matches!(err, ComponentError::Config { .. }));
    }

    #[test]
    fn redeclaring_base_module_is_rejected() {
        let manifest = json!({"modules": [{"name": BASE_MODULE}]});
        assert!(parse_manifest(&manifest.to_string()).is_err());
    }

    #[test]
    fn unknown_dependency_is_reported() {
        let manifest = json!({"modules": [{"name": "a", "depends": ["ghost"]}]});
        let err = parse_manifest(&manifest.to_string()).unwrap_err();
        assert!(matches!(err, ComponentError::NotFound { kind: "module", .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn cyclic_dependencies_are_rejected() {
        let manifest = json!({"modules": [
            {"name": "a", "depends": ["b"]},
            {"name": "b", "depends": ["a"]},
        ]});
        let err = parse_manifest(&manifest.to_string()).unwrap_err();
        assert!(matches!(err, ComponentError::Config { .. }));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = parse_manifest("{ not json").unwrap_err();
        assert!(matches!(err, ComponentError::Serialization { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_manifest(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ComponentError::Io { .. }));
    }
}
