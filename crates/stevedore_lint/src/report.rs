//! Aggregated diagnostics with counts and the wire projection.

use crate::diagnose::diagnose;
use crate::diagnostic::{Diagnostic, WireDiagnostic};
use serde::Serialize;
use stevedore_compose::ComposeDocument;
use stevedore_policy::Policy;

/// Diagnostic counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Parse-time errors
    pub errors: usize,
    /// Policy and hygiene warnings
    pub warnings: usize,
    /// Diagnostics every fix run resolves
    pub auto_fixable: usize,
    /// Diagnostics only a human can resolve
    pub manual: usize,
}

/// Every diagnostic for a document under a policy, in walk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Name of the policy diagnosed against
    pub policy: String,
    /// Diagnostics in walk order
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    /// Diagnose `doc` against `policy`
    #[must_use]
    pub fn build(doc: &ComposeDocument, policy: &Policy) -> Self {
        Self {
            policy: policy.name().to_string(),
            diagnostics: diagnose(doc, policy),
        }
    }

    /// Check if there is nothing to report
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether any parse-time error is present
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Counts by category
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for diagnostic in &self.diagnostics {
            if diagnostic.is_error() {
                summary.errors += 1;
            } else {
                summary.warnings += 1;
            }
            if diagnostic.auto_fix() {
                summary.auto_fixable += 1;
            }
            if diagnostic.requires_manual_fix() {
                summary.manual += 1;
            }
        }
        summary
    }

    /// Wire form of every diagnostic
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireDiagnostic> {
        self.diagnostics.iter().map(Diagnostic::to_wire).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stevedore_compose::{Field, FieldError, PortList, Scope, Service};
    use stevedore_core::{Image, Port};

    fn doc() -> ComposeDocument {
        let mut doc = ComposeDocument::default();
        let mut web = Service::new("web").unwrap();
        web.set_image(Image::parse("nginx:1.25").unwrap());
        web.set_ports(PortList::sequence(vec![Port::parse("80:80").unwrap()]));
        web.set(Field::container_name("web-1"));
        web.set(Field::invalid(FieldError::unsupported(Scope::Service, "web", "gpus", json!("all"))));
        doc.add_service(web);
        doc
    }

    #[test]
    fn test_summary() {
        let report = DiagnosticReport::build(&doc(), &Policy::restrictive("shared"));
        assert_eq!(
            report.summary(),
            ReportSummary {
                errors: 1,
                warnings: 3,
                auto_fixable: 1,
                manual: 1,
            }
        );
        assert!(report.has_errors());
        assert!(!report.is_clean());
    }

    #[test]
    fn test_wire_projection() {
        let report = DiagnosticReport::build(&doc(), &Policy::permissive("pro"));
        let wire = serde_json::to_value(report.to_wire()).unwrap();
        assert_eq!(
            wire,
            json!([
                {
                    "name": "image-missing-owner",
                    "actual": "nginx:1.25",
                    "suggestion": "library/nginx:1.25",
                    "message": "Image 'nginx:1.25' has no owner; use 'library/nginx:1.25'",
                    "autoFix": false,
                    "requireManuallyFix": false
                },
                {
                    "fieldName": "gpus",
                    "fieldData": "all",
                    "message": "Unsupported field 'gpus' in service 'web'",
                    "requireManuallyFix": true
                }
            ])
        );
    }
}
