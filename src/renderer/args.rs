//! Renderer argument derivation.
//!
//! The argument vector is a pure function of the render settings, which is
//! also what makes it usable as the settings part of a fingerprint.

use crate::config::RenderSettings;

/// Fixed arguments: PDF output, written to stdout.
const OUTPUT_ARGS: [&str; 2] = ["--generate=PDF", "--output=-"];

/// Arguments derived from `settings`, in renderer order.
pub fn settings_args(settings: &RenderSettings) -> Vec<String> {
    let mut args = Vec::new();

    for config in &settings.configs {
        args.push(format!("--config={}", config.display()));
    }
    if let Some(task) = &settings.task {
        args.push(format!("--config={}", task.display()));
    }
    if let Some(notation) = settings.notation.as_deref().filter(|n| !n.is_empty()) {
        args.push(format!("--config=notes:{notation}"));
    }
    if settings.transpose != 0 {
        args.push(format!("--transpose={}", settings.transpose));
    }
    if !settings.diagrams {
        args.push("--no-chord-grids".to_string());
    }
    if let Some(paper) = settings.paper.as_deref().filter(|p| !p.is_empty()) {
        args.push(format!("--define=pdf.papersize={paper}"));
    }
    // BTreeMap iterates in key order
    for (key, value) in &settings.defines {
        args.push(format!("--define={key}={value}"));
    }
    args.extend(settings.extra_args.iter().cloned());

    args
}

/// Full argument list after the leading command words, ending with `input`
/// (a file path, or `-` for stdin).
pub fn build_args(settings: &RenderSettings, input: &str) -> Vec<String> {
    let mut args: Vec<String> = OUTPUT_ARGS.iter().map(|s| s.to_string()).collect();
    args.extend(settings_args(settings));
    args.push(input.to_string());
    args
}
