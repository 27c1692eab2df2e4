use std::fs;
use std::path::Path;

use anyhow::Context;
use cake_core::{ComposeConfig, Discipline};

use crate::cli::{LayoutArgs, Shape};

/// Load the compositor configuration, falling back to defaults when no
/// file is given. Keys missing from the file take their default values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ComposeConfig> {
    let Some(path) = path else {
        return Ok(ComposeConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing configuration in {}", path.display()))
}

/// Apply command-line overrides and pick the point shape.
pub fn resolve(base: &ComposeConfig, layout: &LayoutArgs) -> (ComposeConfig, Shape) {
    let mut config = base.clone();
    if let Some(discipline) = layout.discipline {
        config.discipline = discipline.into();
    }
    let shape = layout.shape.unwrap_or(match config.discipline {
        Discipline::Override => Shape::Class,
        Discipline::Disjoint => Shape::Trait,
    });
    (config, shape)
}

pub fn render_config(config: &ComposeConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("serializing configuration")
}
