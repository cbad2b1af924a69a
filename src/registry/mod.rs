//! Method registry: the immutable catalog of every callable operation.
//!
//! Built once at startup from the client's declared sections. After
//! construction the registry is read-only, so it can be shared behind an
//! `Arc` and read concurrently without locking.
//!
//! Listing order is stable: grouped by section, then by operation name,
//! both ascending.

pub mod catalog;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::info;

pub use catalog::{CatalogDeclaration, MethodDeclaration, SectionDeclaration};

use crate::classify::classify;
use crate::traits::VendorClient;
use crate::types::MethodDescriptor;
use crate::{DispatchError, Result};

/// Immutable catalog of operations, addressable by `(section, name)`.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Sorted by (section, name).
    methods: Vec<MethodDescriptor>,
    /// section → name → index into `methods`.
    index: HashMap<String, HashMap<String, usize>>,
    /// Section names, ascending.
    sections: Vec<String>,
}

impl Registry {
    /// Build the catalog from the client's declared surface.
    ///
    /// Fails with [`DispatchError::RegistryBuild`] if the client declares no
    /// sections (a broken dependency) or declares the same operation twice
    /// within a section. Not retried.
    pub fn build(client: &dyn VendorClient) -> Result<Self> {
        Self::from_sections(client.sections())
    }

    /// Build the catalog from explicit declarations.
    pub fn from_sections(declarations: Vec<SectionDeclaration>) -> Result<Self> {
        if declarations.is_empty() {
            return Err(DispatchError::RegistryBuild(
                "client exposes no sections; the vendor client is likely broken".to_string(),
            ));
        }

        let mut grouped: BTreeMap<String, BTreeMap<String, MethodDescriptor>> = BTreeMap::new();
        for section in declarations {
            let methods = grouped.entry(section.name.clone()).or_default();
            for decl in section.methods {
                if methods.contains_key(&decl.name) {
                    return Err(DispatchError::RegistryBuild(format!(
                        "operation '{}' declared twice in section '{}'",
                        decl.name, section.name
                    )));
                }
                let descriptor = MethodDescriptor {
                    section: section.name.clone(),
                    summary: catalog::summary_line(&decl.description),
                    classification: classify(&decl.name),
                    name: decl.name.clone(),
                    parameters: decl.parameters,
                    description: decl.description,
                };
                methods.insert(decl.name, descriptor);
            }
        }

        let sections: Vec<String> = grouped.keys().cloned().collect();
        let mut methods = Vec::new();
        let mut index: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (section, entries) in grouped {
            let by_name = index.entry(section).or_default();
            for (name, descriptor) in entries {
                by_name.insert(name, methods.len());
                methods.push(descriptor);
            }
        }

        info!(
            sections = sections.len(),
            methods = methods.len(),
            "method registry built"
        );

        Ok(Self {
            methods,
            index,
            sections,
        })
    }

    /// Look up an operation.
    ///
    /// An unknown section reports the available ones; an unknown name in a
    /// known section is [`DispatchError::MethodNotFound`].
    pub fn resolve(&self, section: &str, name: &str) -> Result<&MethodDescriptor> {
        let by_name = self
            .index
            .get(section)
            .ok_or_else(|| DispatchError::SectionNotFound {
                section: section.to_string(),
                available: self.sections.clone(),
            })?;
        by_name
            .get(name)
            .map(|&i| &self.methods[i])
            .ok_or_else(|| DispatchError::MethodNotFound {
                section: section.to_string(),
                name: name.to_string(),
            })
    }

    /// List operations, optionally restricted to one section.
    ///
    /// An unknown section yields an empty list.
    pub fn list(&self, section: Option<&str>) -> Vec<&MethodDescriptor> {
        match section {
            Some(section) => self
                .methods
                .iter()
                .filter(|m| m.section == section)
                .collect(),
            None => self.methods.iter().collect(),
        }
    }

    /// Case-insensitive substring search over operation names and summaries.
    ///
    /// An empty keyword returns the full catalog.
    pub fn search(&self, keyword: &str) -> Vec<&MethodDescriptor> {
        let needle = keyword.to_lowercase();
        self.methods
            .iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.summary.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Section names, ascending.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Number of operations in the catalog.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the catalog holds no operations.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Operation names grouped per section, with a total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodListing {
    pub sections: BTreeMap<String, Vec<String>>,
    pub total_methods: usize,
}

impl MethodListing {
    /// Group a listing or search result by section.
    pub fn group(methods: &[MethodDescriptor]) -> Self {
        let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for m in methods {
            sections
                .entry(m.section.clone())
                .or_default()
                .push(m.name.clone());
        }
        Self {
            sections,
            total_methods: methods.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, ParameterSpec};

    fn sample() -> Vec<SectionDeclaration> {
        vec![
            SectionDeclaration::new(
                "networks",
                vec![
                    MethodDeclaration::new("getNetwork")
                        .description("Return a network")
                        .parameter(ParameterSpec::required("networkId")),
                    MethodDeclaration::new("deleteNetwork")
                        .description("Delete a network")
                        .parameter(ParameterSpec::required("networkId")),
                ],
            ),
            SectionDeclaration::new(
                "appliance",
                vec![MethodDeclaration::new("getNetworkApplianceFirewallL3FirewallRules")
                    .description("Return the L3 firewall rules for an MX network")],
            ),
        ]
    }

    #[test]
    fn empty_declaration_fails_build() {
        let err = Registry::from_sections(vec![]).unwrap_err();
        assert!(matches!(err, DispatchError::RegistryBuild(_)));
    }

    #[test]
    fn duplicate_method_fails_build() {
        let decls = vec![SectionDeclaration::new(
            "networks",
            vec![
                MethodDeclaration::new("getNetwork"),
                MethodDeclaration::new("getNetwork"),
            ],
        )];
        assert!(matches!(
            Registry::from_sections(decls),
            Err(DispatchError::RegistryBuild(_))
        ));
    }

    #[test]
    fn descriptors_are_classified_and_summarised() {
        let registry = Registry::from_sections(sample()).unwrap();
        let get = registry.resolve("networks", "getNetwork").unwrap();
        assert_eq!(get.classification, Classification::Read);
        assert_eq!(get.summary, "Return a network");
        assert_eq!(get.parameter_names(), vec!["networkId"]);

        let delete = registry.resolve("networks", "deleteNetwork").unwrap();
        assert_eq!(delete.classification, Classification::Write);
    }

    #[test]
    fn resolve_unknown() {
        let registry = Registry::from_sections(sample()).unwrap();
        assert!(matches!(
            registry.resolve("networks", "getNothing"),
            Err(DispatchError::MethodNotFound { .. })
        ));
        match registry.resolve("bogus", "getNetwork") {
            Err(DispatchError::SectionNotFound { available, .. }) => {
                assert_eq!(available, vec!["appliance", "networks"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn list_is_grouped_and_sorted() {
        let registry = Registry::from_sections(sample()).unwrap();
        let names: Vec<_> = registry
            .list(None)
            .iter()
            .map(|m| (m.section.as_str(), m.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("appliance", "getNetworkApplianceFirewallL3FirewallRules"),
                ("networks", "deleteNetwork"),
                ("networks", "getNetwork"),
            ]
        );
        assert_eq!(registry.list(Some("networks")).len(), 2);
        assert!(registry.list(Some("bogus")).is_empty());
    }

    #[test]
    fn search_matches_name_or_summary() {
        let registry = Registry::from_sections(sample()).unwrap();
        assert_eq!(registry.search("FIREWALL").len(), 1);
        assert_eq!(registry.search("delete a").len(), 1);
        assert!(registry.search("ssid").is_empty());
        assert_eq!(registry.search("").len(), registry.len());
    }

    #[test]
    fn listing_groups_by_section() {
        let registry = Registry::from_sections(sample()).unwrap();
        let all: Vec<MethodDescriptor> = registry.list(None).into_iter().cloned().collect();
        let listing = MethodListing::group(&all);
        assert_eq!(listing.total_methods, 3);
        assert_eq!(
            listing.sections["networks"],
            vec!["deleteNetwork".to_string(), "getNetwork".to_string()]
        );
    }

    #[test]
    fn embedded_catalog_builds() {
        let registry = Registry::from_sections(catalog::embedded_sections().unwrap()).unwrap();
        assert_eq!(registry.sections().len(), 13);
        assert!(registry.resolve("organizations", "getOrganizations").is_ok());
        assert!(registry.resolve("networks", "deleteNetwork").is_ok());
    }
}
