use cake_core::{ComposeConfig, CompositionReport, Compositor};
use colored::Colorize;

use crate::cli::*;
use crate::point::point_layers;
use crate::settings::{load_config, render_config, resolve};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let base = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Wobble(args) => cmd_wobble(&base, &args),
        Command::Inspect(args) => cmd_inspect(&base, &args, cli.format),
        Command::Config => {
            print!("{}", render_config(&base)?);
            Ok(())
        }
    }
}

fn cmd_wobble(base: &ComposeConfig, args: &WobbleArgs) -> anyhow::Result<()> {
    let (config, shape) = resolve(base, &args.layout);
    println!(
        "{} {} points, {} discipline",
        "●".cyan(),
        format!("{shape:?}").to_lowercase().bold(),
        config.discipline.as_str().yellow()
    );
    for (i, renders) in wobble_renders(base, args)?.into_iter().enumerate() {
        println!("  point {}: {}", i.to_string().bold(), renders.join("  "));
    }
    Ok(())
}

/// Compose `instances` independent points and render each `calls` times.
pub fn wobble_renders(base: &ComposeConfig, args: &WobbleArgs) -> anyhow::Result<Vec<Vec<String>>> {
    let (config, shape) = resolve(base, &args.layout);
    let compositor = Compositor::new(config);
    let PointArgs { x, y, wobble } = args.point;

    let mut all = Vec::with_capacity(args.instances);
    for _ in 0..args.instances {
        let cake = compositor.compose(point_layers(shape, x, y, wobble))?;
        let renders = (0..args.calls)
            .map(|_| cake.render())
            .collect::<Result<Vec<_>, _>>()?;
        all.push(renders);
    }
    Ok(all)
}

fn cmd_inspect(base: &ComposeConfig, args: &InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = inspect_report(base, args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("{} Composed {} layers ({})", "✓".green().bold(), report.layers.len(), report.discipline.as_str().yellow());
            for record in &report.layers {
                println!("  #{} {}", record.index, record.name.bold());
                for name in &record.added {
                    println!("      {} {}", "+".green(), name);
                }
                for name in &record.overridden {
                    println!("      {} {}", "~".yellow(), name);
                }
            }
        }
    }
    Ok(())
}

pub fn inspect_report(base: &ComposeConfig, args: &InspectArgs) -> anyhow::Result<CompositionReport> {
    let (config, shape) = resolve(base, &args.layout);
    let PointArgs { x, y, wobble } = args.point;
    let composition = Compositor::new(config).compose_with_report(point_layers(shape, x, y, wobble))?;
    Ok(composition.report)
}
