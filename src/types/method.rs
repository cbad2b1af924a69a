//! Method descriptors and their classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category of an operation, derived from its name.
///
/// Advisory metadata for caching and the read-only gate. Name heuristics
/// misclassify some vendor operations; this is not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// Side-effect free. Eligible for caching.
    Read,
    /// Mutating. Blocked in read-only mode.
    Write,
    /// Unknown. Allowed to run, never cached.
    Other,
}

impl Classification {
    /// Whether results of this category may be served from the cache.
    pub fn is_cacheable(self) -> bool {
        matches!(self, Classification::Read)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Read => "READ",
            Classification::Write => "WRITE",
            Classification::Other => "OTHER",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Whether the vendor rejects calls that omit this parameter.
    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    /// A required parameter.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// An optional parameter.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Catalog entry for one invokable operation.
///
/// Built once by the [`Registry`](crate::Registry) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Section the operation belongs to (e.g. "organizations").
    pub section: String,
    /// Operation name, unique within its section.
    pub name: String,
    /// Declared parameters, in signature order.
    pub parameters: Vec<ParameterSpec>,
    /// First line of the documentation, or empty.
    pub summary: String,
    /// Full documentation text.
    pub description: String,
    pub classification: Classification,
}

impl MethodDescriptor {
    /// Parameter names in signature order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Names of the parameters a call must supply.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    /// Whether the operation declares a parameter with this name.
    pub fn declares(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|p| p.name == parameter)
    }
}
