//! Developer tasks (schema generation, fixture conformance).
//!
//! Keeping this separate keeps developer-only dependencies out of the library crates.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("cannot determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .context("xtask has no parent")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_profile_schema() -> schemars::Schema {
    schema_for!(attest_settings::ProfileMetadataV1)
}

fn generate_inputs_schema() -> schemars::Schema {
    schema_for!(attest_settings::InputFileV1)
}

fn generate_validation_schema() -> schemars::Schema {
    schema_for!(attest_types::ValidationReport)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "attest.profile.v1.json",
            generate: generate_profile_schema,
        },
        SchemaSpec {
            filename: "attest.inputs.v1.json",
            generate: generate_inputs_schema,
        },
        SchemaSpec {
            filename: "attest.validation.v1.json",
            generate: generate_validation_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that schemas/ matches what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn compile(schema: &schemars::Schema) -> anyhow::Result<jsonschema::Validator> {
    let value = serde_json::to_value(schema).context("Failed to serialize schema")?;
    jsonschema::validator_for(&value).map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

/// Every `.toml` under `dir`, recursively, sorted by path.
fn toml_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "toml") {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Check every fixture profile and input file against the generated schemas, and every
/// fixture profile's validation report against the report schema.
fn conform() -> anyhow::Result<()> {
    let root = project_root()?;
    let profile_schema = compile(&generate_profile_schema())?;
    let inputs_schema = compile(&generate_inputs_schema())?;
    let report_schema = compile(&generate_validation_schema())?;

    let mut files = Vec::new();
    for entry in fs::read_dir(root.join("crates")).context("Failed to read crates/")? {
        let fixtures = entry?.path().join("tests").join("fixtures");
        if fixtures.is_dir() {
            files.extend(toml_files(&fixtures)?);
        }
    }
    files.sort();

    let mut errors = Vec::new();
    for path in &files {
        let rel = path.strip_prefix(&root).unwrap_or(path).display().to_string();
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {rel}"))?;
        let value: serde_json::Value =
            toml::from_str(&text).with_context(|| format!("Failed to parse {rel} as TOML"))?;

        let is_profile = path.file_name().is_some_and(|n| n == "attest.toml");
        let schema = if is_profile { &profile_schema } else { &inputs_schema };
        for err in schema.iter_errors(&value) {
            errors.push(format!("{rel}: schema validation: {err}"));
        }

        if is_profile {
            let output = attest_app::run_check(attest_app::ProfileInput::<()> {
                metadata_text: &text,
                input_files: Vec::new(),
                overrides: Default::default(),
                platform: None,
                resources: (),
                units: Vec::new(),
            })
            .with_context(|| format!("{rel}: run check"))?;
            let report = serde_json::to_value(&output.report)?;
            for err in report_schema.iter_errors(&report) {
                errors.push(format!("{rel}: validation report: {err}"));
            }
        }
        println!("✓ {rel}");
    }

    if errors.is_empty() {
        println!("\n✓ {} fixture files conform", files.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Conformance failed with {} errors", errors.len())
    }
}

/// Validate that every code has a complete explanation.
fn explain_coverage() -> anyhow::Result<()> {
    let codes = attest_types::explain::all_codes();
    let mut errors = Vec::new();

    for code in codes {
        match attest_types::explain::lookup_explanation(code) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("Code '{code}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("Code '{code}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("Code '{code}' has empty remediation"));
                }
            }
            None => errors.push(format!("Code '{code}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} codes have explanations", codes.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Explain coverage validation failed with {} errors", errors.len())
    }
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate fixture profiles and input files against the schemas");
    eprintln!("  explain-coverage  Validate all codes have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
