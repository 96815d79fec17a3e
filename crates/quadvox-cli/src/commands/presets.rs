//! Preset listing and export.

use anyhow::Context;
use clap::{Args, Subcommand};
use quadvox_config::paths::{ensure_user_presets_dir, list_user_presets};
use quadvox_config::{PresetBank, PresetFile, load_named_preset, user_presets_dir};
use quadvox_core::{FACTORY_PRESETS, Param};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand, Debug)]
enum PresetsCommand {
    /// List factory and user presets
    List,

    /// Show the parameters of a preset
    Show {
        /// Preset path, user preset name, factory name or factory index
        name: String,

        /// Print as TOML instead of a table
        #[arg(long)]
        toml: bool,
    },

    /// Write presets to disk
    Export {
        /// A single preset to export; the whole factory bank when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Destination file; with --user, the directory is the user presets directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write each factory preset as its own file in the user presets directory
        #[arg(long, conflicts_with_all = ["name", "output"])]
        user: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list(),
        PresetsCommand::Show { name, toml } => show(&name, toml),
        PresetsCommand::Export { name, output, user } => {
            if user {
                export_user()
            } else {
                export(name.as_deref(), output)
            }
        }
    }
}

fn list() -> anyhow::Result<()> {
    println!("Factory presets:");
    for (index, factory) in FACTORY_PRESETS.iter().enumerate() {
        println!("  {index}  {}", factory.name);
    }

    let user = list_user_presets();
    println!("\nUser presets ({}):", user_presets_dir().display());
    if user.is_empty() {
        println!("  (none)");
    }
    for path in user {
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        match PresetFile::load(&path) {
            Ok(file) => println!("  {:<16} {}", stem.unwrap_or_default(), file.name),
            Err(e) => println!("  {:<16} (unreadable: {e})", stem.unwrap_or_default()),
        }
    }
    Ok(())
}

fn show(name: &str, as_toml: bool) -> anyhow::Result<()> {
    let file = load_named_preset(name)?;
    if as_toml {
        print!("{}", file.to_toml()?);
        return Ok(());
    }
    println!("{}", file.name);
    if let Some(description) = &file.description {
        println!("{description}");
    }
    let preset = file.to_preset()?;
    for param in Param::ALL {
        println!("  {:<18}: {:4}", param.label(), preset.get(param));
    }
    Ok(())
}

fn export(name: Option<&str>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match name {
        Some(name) => {
            let file = load_named_preset(name)?;
            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("{}.toml", file_stem(&file.name))));
            file.save(&path)?;
            path
        }
        None => {
            let path = output.unwrap_or_else(|| PathBuf::from("factory.toml"));
            PresetBank::factory().save(&path)?;
            path
        }
    };
    println!("Wrote {}", path.display());
    Ok(())
}

fn export_user() -> anyhow::Result<()> {
    let dir = ensure_user_presets_dir()?;
    for factory in &FACTORY_PRESETS {
        let file = PresetFile::from_factory(factory);
        let path = dir.join(format!("{}.toml", file_stem(&file.name)));
        file.save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// File stem for a preset name: lowercase, non-alphanumerics as `_`.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
