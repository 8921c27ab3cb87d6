//! STEVEDORE Lint
//!
//! Policy-driven diagnostics over the canonical document and the fix engine
//! that applies their registered remedies.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnose;
pub mod diagnostic;
pub mod fix;
pub mod remedy;
pub mod report;

pub use diagnose::{diagnose, Diagnosable};
pub use diagnostic::{
    Diagnostic, FixMode, Location, Warning, WarningKind, WireDiagnostic, WireError, WireWarning,
};
pub use fix::{apply, fix, AppliedFix, FixReport, Fixer, SkipReason, SkippedFix};
pub use remedy::{FixError, Fixable, Remedy};
pub use report::{DiagnosticReport, ReportSummary};
