//! Renderer runtime metadata (`chordpro -A -A -A`).
//!
//! Queried once per session. A failed query is remembered as "no info":
//! the preview keeps working, only the `info` output and the directive list
//! are empty.

use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::config::RendererConfig;
use crate::utils::exec::Cmd;

#[derive(Debug, Error)]
pub enum InfoError {
    #[error("renderer command is empty")]
    EmptyCommand,
    #[error("renderer info query failed: {0}")]
    Query(String),
    #[error("renderer info is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RendererInfo {
    pub general: General,
    pub resources: Vec<Resource>,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct General {
    pub chordpro: Component,
    pub perl: Perl,
    /// ABC converter in use, if any.
    pub abc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Component {
    pub version: String,
    pub aux: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Perl {
    pub version: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Module {
    pub name: String,
    pub version: String,
}

impl RendererInfo {
    pub fn has_abc(&self) -> bool {
        self.general
            .abc
            .as_deref()
            .is_some_and(|abc| !abc.is_empty() && !abc.eq_ignore_ascii_case("none"))
    }
}

static INFO: OnceLock<Option<RendererInfo>> = OnceLock::new();

/// Session-cached runtime info; `None` if the query failed.
pub fn renderer_info(config: &RendererConfig) -> Option<&'static RendererInfo> {
    INFO.get_or_init(|| match query_info(config) {
        Ok(info) => Some(info),
        Err(e) => {
            crate::debug!("info"; "{}", e);
            None
        }
    })
    .as_ref()
}

/// Run the info query without caching.
pub fn query_info(config: &RendererConfig) -> Result<RendererInfo, InfoError> {
    if config.program().is_none_or(|p| p.trim().is_empty()) {
        return Err(InfoError::EmptyCommand);
    }
    let output = Cmd::from_slice(&config.command)
        .args(&config.info_args)
        .run()
        .map_err(|e| InfoError::Query(e.to_string()))?;
    parse_info(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the JSON document, skipping any banner printed before it.
fn parse_info(stdout: &str) -> Result<RendererInfo, InfoError> {
    let json = stdout.find('{').map_or(stdout, |start| &stdout[start..]);
    Ok(serde_json::from_str(json)?)
}

/// Human-readable runtime report, appended to the log as a notice.
pub fn runtime_report(info: &RendererInfo) -> String {
    let general = &info.general;
    let mut text = format!(
        "ChordPro Preview version {}\nhttps://www.chordpro.org\n\nRun-time information:\n  ChordProCore:\n    {}",
        env!("CARGO_PKG_VERSION"),
        general.chordpro.version,
    );
    if let Some(aux) = &general.chordpro.aux {
        text.push_str(&format!(" ({aux})"));
    }
    text.push_str("\n  Perl:\n    ");
    text.push_str(general.perl.version.as_deref().unwrap_or("unknown"));
    if let Some(path) = &general.perl.path {
        text.push_str(&format!(" ({path})"));
    }
    text.push_str("\n  Resource path:\n");
    for resource in &info.resources {
        text.push_str(&format!("    {}\n", resource.path));
    }
    text.push_str("  ABC support:\n    ");
    text.push_str(general.abc.as_deref().unwrap_or("none"));
    text.push_str("\n\nModules and libraries:\n");
    for module in &info.modules {
        text.push_str(&format!("    {:<22}{}\n", module.name, module.version));
    }
    text
}

// ============================================================================
// Directives
// ============================================================================

/// A ChordPro directive offered for completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub name: &'static str,
    pub short: Option<&'static str>,
    /// Takes a `{name: value}` argument.
    pub argument: bool,
}

const fn d(name: &'static str, short: Option<&'static str>, argument: bool) -> Directive {
    Directive {
        name,
        short,
        argument,
    }
}

const CORE_DIRECTIVES: &[Directive] = &[
    // Metadata
    d("title", Some("t"), true),
    d("subtitle", Some("st"), true),
    d("artist", None, true),
    d("composer", None, true),
    d("lyricist", None, true),
    d("arranger", None, true),
    d("copyright", None, true),
    d("album", None, true),
    d("year", None, true),
    d("key", None, true),
    d("time", None, true),
    d("tempo", None, true),
    d("duration", None, true),
    d("capo", None, true),
    d("meta", None, true),
    // Formatting
    d("comment", Some("c"), true),
    d("comment_italic", Some("ci"), true),
    d("comment_box", Some("cb"), true),
    d("highlight", None, true),
    d("image", None, true),
    // Environments
    d("start_of_chorus", Some("soc"), false),
    d("end_of_chorus", Some("eoc"), false),
    d("chorus", None, false),
    d("start_of_verse", Some("sov"), false),
    d("end_of_verse", Some("eov"), false),
    d("start_of_bridge", Some("sob"), false),
    d("end_of_bridge", Some("eob"), false),
    d("start_of_tab", Some("sot"), false),
    d("end_of_tab", Some("eot"), false),
    d("start_of_grid", Some("sog"), false),
    d("end_of_grid", Some("eog"), false),
    d("start_of_svg", None, false),
    d("end_of_svg", None, false),
    d("start_of_textblock", None, false),
    d("end_of_textblock", None, false),
    // Chords and transposition
    d("define", None, true),
    d("chord", None, true),
    d("transpose", None, true),
    // Output
    d("new_page", Some("np"), false),
    d("new_physical_page", Some("npp"), false),
    d("column_break", Some("colb"), false),
    d("columns", Some("col"), true),
    d("pagetype", None, true),
    d("diagrams", None, true),
    d("no_grid", Some("ng"), false),
    d("grid", Some("g"), false),
    d("new_song", Some("ns"), false),
];

const ABC_DIRECTIVES: &[Directive] = &[d("start_of_abc", None, false), d("end_of_abc", None, false)];

/// Directives the installed renderer understands. Empty without info.
pub fn directives(info: Option<&RendererInfo>) -> Vec<Directive> {
    let Some(info) = info else {
        return Vec::new();
    };

    let mut list = CORE_DIRECTIVES.to_vec();
    if info.has_abc() {
        list.extend_from_slice(ABC_DIRECTIVES);
    }
    list
}
