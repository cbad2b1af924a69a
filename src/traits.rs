//! Core VendorClient trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::registry::SectionDeclaration;
use crate::types::Parameters;

/// The wrapped vendor client, seen from the dispatch layer.
///
/// Implementations own transport, credentials and the vendor wire format.
/// The dispatcher only needs two things: the declared callable surface
/// (read once, at startup) and a way to invoke one operation.
#[async_trait]
pub trait VendorClient: Send + Sync {
    /// Declared sections and their operations.
    ///
    /// Most clients return [`catalog::embedded_sections()`](crate::registry::catalog::embedded_sections).
    /// An empty list means the client is broken and fails registry construction.
    fn sections(&self) -> Vec<SectionDeclaration>;

    /// Invoke one operation with bound parameters.
    async fn invoke(
        &self,
        section: &str,
        method: &str,
        parameters: &Parameters,
    ) -> Result<Value, ClientError>;
}
