//! `info` command: renderer runtime report and directive list.

use anyhow::{Context, Result};

use crate::config::ProjectConfig;
use crate::renderer::{directives, query_info, runtime_report};

pub fn show_info(config: &ProjectConfig, list_directives: bool) -> Result<()> {
    let info = query_info(&config.renderer).context("Failed to query the renderer")?;

    if !list_directives {
        print!("{}", runtime_report(&info));
        return Ok(());
    }

    for directive in directives(Some(&info)) {
        let short = directive
            .short
            .map(|s| format!("({s})"))
            .unwrap_or_default();
        let usage = if directive.argument {
            format!("{{{}: ...}}", directive.name)
        } else {
            format!("{{{}}}", directive.name)
        };
        println!("{usage:<28} {short}");
    }
    Ok(())
}
