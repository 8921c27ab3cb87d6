//! Subcommand implementations.

use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use stevedore_compose::ComposeDocument;
use stevedore_core::Dialect;
use stevedore_dialect::{detect, parse, translate, ParseFailure, ParseResult};
use stevedore_lint::{DiagnosticReport, Fixer};
use stevedore_policy::{preset, Policy, PolicyConfig};
use tracing::{debug, info};

/// Resolve the policy from a config file, or a preset name
pub fn load_policy(name: &str, file: Option<&Path>) -> Result<Policy> {
    match file {
        Some(path) => {
            let reader = File::open(path)
                .wrap_err_with(|| format!("cannot open policy file {}", path.display()))?;
            let config = PolicyConfig::from_reader(BufReader::new(reader))?;
            Ok(config.resolve()?)
        }
        None => Ok(preset(name)?.clone()),
    }
}

/// Read a JSON tree
pub fn load_tree(path: &Path) -> Result<Value> {
    let reader =
        File::open(path).wrap_err_with(|| format!("cannot open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(reader))
        .wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

fn parse_tree(raw: &Value, dialect: Option<Dialect>, policy: &Policy) -> ParseResult {
    match dialect {
        Some(dialect) => parse(raw, dialect, policy),
        None => stevedore_dialect::parse_detected(raw, policy),
    }
}

fn source_dialect(raw: &Value, dialect: Option<Dialect>) -> Result<Dialect> {
    match dialect {
        Some(dialect) => Ok(dialect),
        None => detect(raw).map_err(|e| eyre!("{}", e)),
    }
}

fn require_parsed(result: ParseResult) -> Result<ComposeDocument> {
    result.map_err(|failure: ParseFailure| {
        let lines: Vec<String> = failure
            .errors
            .iter()
            .map(|e| format!("  {}: {}", e.path(), e.message))
            .collect();
        eyre!("{}\n{}", failure, lines.join("\n"))
    })
}

fn emit(tree: &Value, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(tree)?;
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .wrap_err_with(|| format!("cannot create {}", path.display()))?;
            writeln!(file, "{}", rendered)?;
            info!(path = %path.display(), "wrote document");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Diagnostics report for a file
pub fn report(file: &Path, dialect: Option<Dialect>, policy: &Policy) -> Result<DiagnosticReport> {
    let raw = load_tree(file)?;
    let doc = match parse_tree(&raw, dialect, policy) {
        Ok(doc) => doc,
        Err(failure) => {
            debug!(errors = failure.errors.len(), "reporting over a partial document");
            failure.document
        }
    };
    Ok(DiagnosticReport::build(&doc, policy))
}

/// `stevedore check`
pub fn check(file: &Path, dialect: Option<Dialect>, policy: &Policy, json: bool) -> Result<()> {
    let report = report(file, dialect, policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_wire())?);
    } else {
        for diagnostic in &report.diagnostics {
            println!("{}", diagnostic);
        }
        let summary = report.summary();
        println!(
            "{} error(s), {} warning(s) under policy '{}' ({} auto-fixable, {} manual)",
            summary.errors, summary.warnings, report.policy, summary.auto_fixable, summary.manual
        );
    }

    if report.has_errors() {
        bail!("{} has errors", file.display());
    }
    Ok(())
}

/// `stevedore fix`
pub fn fix(
    file: &Path,
    dialect: Option<Dialect>,
    policy: &Policy,
    auto_only: bool,
    to: Option<Dialect>,
    output: Option<&Path>,
) -> Result<()> {
    let raw = load_tree(file)?;
    let source = source_dialect(&raw, dialect)?;
    let mut doc = require_parsed(parse(&raw, source, policy))?;

    let report = Fixer::new(auto_only).fix(&mut doc);
    for skipped in &report.skipped {
        eprintln!("skipped {} at {} ({:?})", skipped.name, skipped.path, skipped.reason);
    }
    eprintln!("applied {} fix(es)", report.applied.len());

    emit(&translate(&doc, to.unwrap_or(source)), output)
}

/// `stevedore convert`
pub fn convert(
    file: &Path,
    dialect: Option<Dialect>,
    to: Dialect,
    output: Option<&Path>,
) -> Result<()> {
    let raw = load_tree(file)?;
    let policy = Policy::permissive("convert");
    let doc = require_parsed(parse_tree(&raw, dialect, &policy))?;
    emit(&translate(&doc, to), output)
}

/// `stevedore policy`
pub fn show_policy(policy: &Policy) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(policy)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write as _;
    use stevedore_core::Capability;
    use tempfile::NamedTempFile;

    fn write_json(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[test]
    fn test_load_policy_preset() {
        let policy = load_policy("PRO", None).unwrap();
        assert!(policy.allows(Capability::Build));
        assert!(load_policy("enterprise", None).is_err());
    }

    #[test]
    fn test_load_policy_file() {
        let file = write_json(&json!({"preset": "shared", "allow": ["port_mapping"]}));
        let policy = load_policy("pro", Some(file.path())).unwrap();
        assert!(policy.allows(Capability::PortMapping));
        assert!(!policy.allows(Capability::Build));
    }

    #[test]
    fn test_report_partial_document() {
        let file = write_json(&json!({
            "version": "3",
            "services": {"web": {"image": "nginx", "gpus": "all"}}
        }));
        let report = report(file.path(), None, &Policy::permissive("pro")).unwrap();
        let summary = report.summary();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 2);
    }

    #[test]
    fn test_fix_writes_output() {
        let input = write_json(&json!({
            "version": "3.8",
            "services": {"web": {"build": ".", "ports": ["80:80"]}}
        }));
        let output = NamedTempFile::new().unwrap();
        let shared = load_policy("shared", None).unwrap();
        fix(input.path(), None, &shared, true, None, Some(output.path())).unwrap();

        let written = load_tree(output.path()).unwrap();
        assert_eq!(
            written,
            json!({
                "version": "3.8",
                "services": {"web": {"image": "web:latest", "ports": ["80:80"]}}
            })
        );
    }

    #[test]
    fn test_fix_refuses_invalid_document() {
        let input = write_json(&json!({"services": {"web": {"privileged": "yes"}}}));
        let pro = Policy::permissive("pro");
        assert!(fix(input.path(), None, &pro, true, None, None).is_err());
    }

    #[test]
    fn test_convert_v1_to_v2() {
        let input = write_json(&json!({"web": {"image": "nginx:1", "ports": ["8080:80"]}}));
        let output = NamedTempFile::new().unwrap();
        convert(input.path(), None, Dialect::V2, Some(output.path())).unwrap();
        let written = load_tree(output.path()).unwrap();
        assert_eq!(written["version"], json!("2"));
        assert_eq!(written["services"]["web"]["ports"], json!(["8080:80"]));
    }
}
