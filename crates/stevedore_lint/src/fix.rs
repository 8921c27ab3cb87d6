//! Fix engine: applies registered remedies for current diagnostics.

use crate::diagnose::diagnose;
use crate::diagnostic::{Diagnostic, FixMode, WarningKind};
use crate::remedy::{FixError, Fixable};
use serde::Serialize;
use stevedore_compose::ComposeDocument;
use tracing::{debug, info};

/// Passes before the fixer gives up on reaching a fixed point
///
/// Replacing `build` can introduce an untagged image, which the next pass
/// completes; nothing chains further than that.
const MAX_PASSES: usize = 4;

/// A remedy that was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    /// Warning kind that triggered it
    pub kind: WarningKind,
    /// Location path
    pub path: String,
    /// What changed
    pub description: String,
}

/// Why a diagnostic was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Only a human can resolve it
    ManualFix,
    /// The run was restricted to automatic fixes
    AssistedOnly,
    /// The remedy could not be applied
    Failed,
}

/// A diagnostic still present after fixing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFix {
    /// Warning kind name, or `error` for a rejected field
    pub name: String,
    /// Location path
    pub path: String,
    /// Reason
    pub reason: SkipReason,
}

/// Outcome of a fix run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixReport {
    /// Applied remedies, in application order
    pub applied: Vec<AppliedFix>,
    /// Diagnostics left in place
    pub skipped: Vec<SkippedFix>,
    /// Diagnostic passes run
    pub passes: usize,
}

impl FixReport {
    /// Whether anything changed
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies remedies to a document under its attached policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixer {
    /// Apply only remedies marked automatic
    pub auto_only: bool,
}

impl Fixer {
    /// Create a fixer
    #[must_use]
    pub fn new(auto_only: bool) -> Self {
        Self { auto_only }
    }

    fn eligible(&self, diagnostic: &Diagnostic) -> Result<(), SkipReason> {
        match diagnostic {
            Diagnostic::Error(_) => Err(SkipReason::ManualFix),
            Diagnostic::Warning(warning) => match warning.fix_mode() {
                FixMode::Manual => Err(SkipReason::ManualFix),
                FixMode::Assisted if self.auto_only => Err(SkipReason::AssistedOnly),
                _ => Ok(()),
            },
        }
    }

    /// Fix `doc` in place
    ///
    /// Re-diagnoses after each pass until no eligible diagnostic remains, so a
    /// second run with the same setting changes nothing.
    pub fn fix(&self, doc: &mut ComposeDocument) -> FixReport {
        let policy = doc.policy().clone();
        let mut report = FixReport::default();
        let mut failed = Vec::new();

        loop {
            let diagnostics = diagnose(doc, &policy);
            report.passes += 1;

            let mut changed = false;
            for diagnostic in &diagnostics {
                let Diagnostic::Warning(warning) = diagnostic else {
                    continue;
                };
                if self.eligible(diagnostic).is_err() {
                    continue;
                }
                match doc.remediate(&warning.remedy, &warning.location) {
                    Ok(true) => {
                        let description = warning.remedy.describe(&warning.location);
                        info!(kind = %warning.kind, path = %warning.location.path(), "{}", description);
                        report.applied.push(AppliedFix {
                            kind: warning.kind,
                            path: warning.location.path(),
                            description,
                        });
                        changed = true;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        debug!(error = %e, "remedy not applied");
                        failed.push(warning.location.path());
                    }
                }
            }

            if !changed || report.passes >= MAX_PASSES {
                report.skipped = self.remaining(&diagnose(doc, &policy), &failed);
                return report;
            }
        }
    }

    fn remaining(&self, diagnostics: &[Diagnostic], failed: &[String]) -> Vec<SkippedFix> {
        diagnostics
            .iter()
            .filter_map(|diagnostic| {
                let path = diagnostic.path();
                let reason = match self.eligible(diagnostic) {
                    Err(reason) => reason,
                    Ok(()) if failed.contains(&path) => SkipReason::Failed,
                    Ok(()) => return None,
                };
                let name = match diagnostic {
                    Diagnostic::Warning(warning) => warning.kind.name().to_string(),
                    Diagnostic::Error(_) => "error".to_string(),
                };
                Some(SkippedFix { name, path, reason })
            })
            .collect()
    }
}

/// Fix `doc` in place under its attached policy
///
/// With `auto_only`, only remedies marked automatic are applied; otherwise
/// assisted remedies are applied too. Manual ones never are.
pub fn fix(doc: &mut ComposeDocument, auto_only: bool) -> FixReport {
    Fixer::new(auto_only).fix(doc)
}

/// Apply a single remedy to a document
///
/// # Errors
///
/// Returns error if the warning needs a manual fix or its target is gone
pub fn apply(doc: &mut ComposeDocument, diagnostic: &Diagnostic) -> Result<bool, FixError> {
    match diagnostic {
        Diagnostic::Warning(warning) => doc.remediate(&warning.remedy, &warning.location),
        Diagnostic::Error(error) => Err(FixError::Manual { path: error.path() }),
    }
}
