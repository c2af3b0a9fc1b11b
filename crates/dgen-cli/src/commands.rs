//! Subcommand implementations.

use dgen_ast::{Decl, DeclKind, TranslationUnit};
use dgen_config::{GenConfig, ManglingScheme};
use dgen_emit::{emit_unit, EmitOptions};
use miette::{miette, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Command-line values that override the loaded configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub standard: Option<String>,
    pub extras: Vec<String>,
    pub mangling: Option<ManglingScheme>,
}

/// Load `dgen.toml` (or the defaults) and apply the overrides on top.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<GenConfig> {
    let mut config = match path {
        Some(path) => {
            debug!(config = %path.display(), "loading configuration");
            GenConfig::from_file(path)?
        }
        None => GenConfig::default(),
    };

    if let Some(output) = overrides.output {
        config.output.path = output;
    }
    for root in overrides.paths {
        config = config.with_path(root);
    }
    if let Some(standard) = overrides.standard {
        config = config.with_standard(&standard);
    }
    for extra in &overrides.extras {
        config = config.with_extra(extra);
    }
    if let Some(mangling) = overrides.mangling {
        config.output.mangling = mangling;
    }
    config.validate()?;
    Ok(config)
}

/// Read a JSON translation-unit dump written by the front end.
pub fn load_unit(path: &Path) -> Result<TranslationUnit> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| miette!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| miette!("Invalid translation unit {}: {}", path.display(), e))
}

/// Emit the unit and return the module text.
pub fn generate(unit_path: &Path, config: &GenConfig, preamble: bool) -> Result<String> {
    let unit = load_unit(unit_path)?;
    let options = EmitOptions::from_config(config).with_preamble(preamble);
    let code = emit_unit(&unit, options)?;
    info!(
        unit = %unit_path.display(),
        files = unit.files.len(),
        bytes = code.len(),
        "generated bindings"
    );
    Ok(code)
}

/// Write the module, or print it when the target is `-`.
pub fn write_output(path: &Path, code: &str) -> Result<()> {
    if path == Path::new("-") {
        print!("{}", code);
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(path, code).map_err(|e| miette!("Failed to write {}: {}", path.display(), e))
}

/// One line per declaration, indented by nesting depth.
pub fn dump(unit: &TranslationUnit) -> String {
    let mut out = String::new();
    for file in &unit.files {
        out.push_str(&format!("{}\n", file.path.display()));
        for decl in &file.decls {
            dump_decl(decl, 1, &mut out);
        }
    }
    out
}

fn dump_decl(decl: &Decl, depth: usize, out: &mut String) {
    let name = decl.name.as_deref().unwrap_or("<anonymous>");
    out.push_str(&format!(
        "{}{} {} #{} @ {}\n",
        "  ".repeat(depth),
        kind_label(&decl.kind),
        name,
        decl.id.0,
        decl.loc
    ));
    match &decl.kind {
        DeclKind::Namespace(ns) => {
            for member in &ns.members {
                dump_decl(member, depth + 1, out);
            }
        }
        DeclKind::Record(rec) => {
            for member in rec.members.iter().chain(&rec.methods) {
                dump_decl(member, depth + 1, out);
            }
        }
        _ => {}
    }
}

fn kind_label(kind: &DeclKind) -> &'static str {
    match kind {
        DeclKind::Namespace(_) => "namespace",
        DeclKind::Record(_) => "record",
        DeclKind::Enum(_) => "enum",
        DeclKind::Function(_) => "function",
        DeclKind::Typedef(_) => "typedef",
        DeclKind::Variable(_) => "variable",
        DeclKind::Macro(_) => "macro",
    }
}

/// Serialize the default configuration as a starting `dgen.toml`.
pub fn default_config_text() -> Result<String> {
    toml::to_string_pretty(&GenConfig::default())
        .map_err(|e| miette!("Failed to render default config: {}", e))
}
