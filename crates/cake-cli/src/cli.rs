use std::path::PathBuf;

use cake_core::Discipline;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cake",
    about = "Layer cake compositor — build one object from ordered layers",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file holding the compositor configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DisciplineArg {
    Override,
    Disjoint,
}

impl From<DisciplineArg> for Discipline {
    fn from(arg: DisciplineArg) -> Self {
        match arg {
            DisciplineArg::Override => Discipline::Override,
            DisciplineArg::Disjoint => Discipline::Disjoint,
        }
    }
}

/// Which point layers to stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Shape {
    /// Base point plus a wobble layer that overrides `getX` via super
    Class,
    /// Abstract point (`baseGetX`) plus a wobble layer that uses self
    Trait,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build independent wobbly points and render each one repeatedly
    Wobble(WobbleArgs),
    /// Show what each layer of a point contributes
    Inspect(InspectArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args, Clone, Debug, Default)]
pub struct LayoutArgs {
    /// Overrides the configured discipline
    #[arg(long)]
    pub discipline: Option<DisciplineArg>,
    /// Defaults to `class` under override and `trait` under disjoint
    #[arg(long)]
    pub shape: Option<Shape>,
}

#[derive(Args, Clone, Debug)]
pub struct PointArgs {
    #[arg(long, default_value_t = 3)]
    pub x: i64,
    #[arg(long, default_value_t = 5)]
    pub y: i64,
    #[arg(long, default_value_t = 0.1)]
    pub wobble: f64,
}

impl Default for PointArgs {
    fn default() -> Self {
        Self {
            x: 3,
            y: 5,
            wobble: 0.1,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct WobbleArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
    #[command(flatten)]
    pub point: PointArgs,
    /// Renders per instance
    #[arg(long, default_value_t = 2)]
    pub calls: usize,
    /// Independently composed points
    #[arg(long, default_value_t = 2)]
    pub instances: usize,
}

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
    #[command(flatten)]
    pub point: PointArgs,
}
