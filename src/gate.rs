//! Read-only safety gate.
//!
//! Runs before any cache lookup or vendor call. In read-only mode, WRITE
//! operations are denied; READ and OTHER always pass, since an OTHER name
//! says nothing reliable about whether the operation mutates.

use tracing::warn;

use crate::telemetry;
use crate::types::{Classification, MethodDescriptor};
use crate::{DispatchError, Result};

/// Whether a call of this classification may proceed.
pub fn check(classification: Classification, read_only_mode: bool) -> bool {
    !(read_only_mode && classification == Classification::Write)
}

/// Gate a resolved operation, producing [`DispatchError::WriteBlocked`] on denial.
pub fn enforce(descriptor: &MethodDescriptor, read_only_mode: bool) -> Result<()> {
    if check(descriptor.classification, read_only_mode) {
        return Ok(());
    }
    metrics::counter!(telemetry::WRITES_BLOCKED_TOTAL,
        "section" => descriptor.section.clone(),
    )
    .increment(1);
    warn!(
        section = %descriptor.section,
        method = %descriptor.name,
        "write operation blocked by read-only mode"
    );
    Err(DispatchError::WriteBlocked {
        section: descriptor.section.clone(),
        name: descriptor.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, classification: Classification) -> MethodDescriptor {
        MethodDescriptor {
            section: "networks".into(),
            name: name.into(),
            parameters: vec![],
            summary: String::new(),
            description: String::new(),
            classification,
        }
    }

    #[test]
    fn read_only_blocks_only_writes() {
        assert!(check(Classification::Read, true));
        assert!(check(Classification::Other, true));
        assert!(!check(Classification::Write, true));
    }

    #[test]
    fn everything_passes_when_writable() {
        for c in [
            Classification::Read,
            Classification::Write,
            Classification::Other,
        ] {
            assert!(check(c, false));
        }
    }

    #[test]
    fn enforce_reports_the_blocked_method() {
        let err = enforce(&descriptor("deleteNetwork", Classification::Write), true).unwrap_err();
        match err {
            DispatchError::WriteBlocked { section, name } => {
                assert_eq!(section, "networks");
                assert_eq!(name, "deleteNetwork");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(enforce(&descriptor("provisionNetworkClients", Classification::Other), true).is_ok());
    }
}
