//! Fixed declaration of the vendor's callable surface.
//!
//! The catalog is compiled in as JSON and versioned with the Dashboard API
//! library release its names and parameters follow. It is a curated subset
//! of that release, not the full surface: every section is present, with
//! the commonly used operations of each. Clients that expose more
//! operations declare them through [`VendorClient::sections`](crate::VendorClient::sections)
//! instead of relying on this catalog.

use serde::{Deserialize, Serialize};

use crate::types::ParameterSpec;
use crate::{DispatchError, Result};

/// One declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl MethodDeclaration {
    /// Declare an operation with no documentation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Set the documentation text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Append a parameter.
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }
}

/// A named group of declared operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDeclaration {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
}

impl SectionDeclaration {
    pub fn new(name: impl Into<String>, methods: Vec<MethodDeclaration>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }
}

/// The full compiled-in declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDeclaration {
    /// Dashboard API library release the declaration follows.
    pub version: String,
    pub sections: Vec<SectionDeclaration>,
}

/// Raw JSON declaration compiled into the binary.
const EMBEDDED_CATALOG: &str = include_str!("catalog.json");

/// Parse the compiled-in catalog.
pub fn embedded() -> Result<CatalogDeclaration> {
    serde_json::from_str(EMBEDDED_CATALOG)
        .map_err(|e| DispatchError::RegistryBuild(format!("embedded catalog is malformed: {e}")))
}

/// Sections of the compiled-in catalog.
pub fn embedded_sections() -> Result<Vec<SectionDeclaration>> {
    embedded().map(|catalog| catalog.sections)
}

/// Extract the one-line summary from a documentation block.
///
/// Takes the first non-blank line and strips markdown bold markers.
pub fn summary_line(description: &str) -> String {
    description
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_matches('*').trim().to_string())
        .unwrap_or_default()
}
