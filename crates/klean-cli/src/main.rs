#![forbid(unsafe_code)]

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use klean_config::{Lockfile, Manifest};
use klean_pipeline::FormatPipeline;
use klean_steps::ktfmt::KtfmtStyle;
use klean_steps::MavenProvisioner;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "klean", about = "A formatter pipeline compiler for Kotlin sources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile the configured pipeline and show its steps and cache keys
    Plan {
        /// Show the canonical serialization of each step
        #[arg(long)]
        verbose: bool,
        /// Resolve tools from the local cache only; no downloads
        #[arg(long)]
        offline: bool,
        /// Maven registry to resolve tools from (defaults to Maven Central)
        #[arg(long)]
        registry: Option<String>,
    },
    /// Download the configured formatter jars and pin their hashes
    Fetch {
        /// Require klean.lock to already pin every tool; no downloads
        #[arg(long)]
        locked: bool,
        /// Maven registry to resolve tools from (defaults to Maven Central)
        #[arg(long)]
        registry: Option<String>,
    },
    /// Show the newest released version of each configured formatter
    Versions {
        /// Maven registry to query (defaults to Maven Central)
        #[arg(long)]
        registry: Option<String>,
    },
    /// Remove the tool cache
    Clean,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan {
            verbose,
            offline,
            registry,
        } => cmd_plan(verbose, offline, registry.as_deref()),
        Command::Fetch { locked, registry } => cmd_fetch(locked, registry.as_deref()),
        Command::Versions { registry } => cmd_versions(registry.as_deref()),
        Command::Clean => cmd_clean(),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

/// Find the project root by looking for `klean.toml` in the current directory.
fn project_root() -> Result<PathBuf, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    if !cwd.join("klean.toml").exists() {
        return Err("no klean.toml found in current directory".into());
    }
    Ok(cwd)
}

/// Build a provisioner caching into `~/.klean/tools`, pinned from the
/// lockfile and pointed at `registry` when one is given.
fn provisioner(
    lockfile: &Lockfile,
    offline: bool,
    registry: Option<&str>,
) -> Result<MavenProvisioner, Box<dyn Error>> {
    let tools_root = klean_util::fs::klean_home()?.join("tools");
    let mut provisioner = MavenProvisioner::new(&tools_root);
    if let Some(registry) = registry {
        provisioner = provisioner.with_registry(registry);
    }
    if offline {
        provisioner = provisioner.offline();
    }
    for tool in &lockfile.tools {
        provisioner.pin(&tool.coordinate, &tool.jar_sha256);
    }
    Ok(provisioner)
}

/// Drive the builders from the manifest. Every configured formatter
/// registers exactly one step, in manifest order; each later setter
/// replaces that step in place.
fn build_pipeline(
    root: &Path,
    manifest: &Manifest,
    provisioner: MavenProvisioner,
) -> Result<FormatPipeline, Box<dyn Error>> {
    let mut pipeline = FormatPipeline::new(root, Box::new(provisioner));
    pipeline.set_targets(manifest.format.targets.clone());

    if let Some(section) = &manifest.format.ktlint {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::ktlint::DEFAULT_VERSION);
        let mut ktlint = pipeline.ktlint_version(version)?;
        if let Some(path) = &section.editor_config {
            ktlint.editor_config_path(Some(Path::new(path)))?;
        }
        if !section.user_data.is_empty() {
            ktlint.user_data(klean_config::manifest::string_entries(&section.user_data)?)?;
        }
        if !section.editor_config_override.is_empty() {
            ktlint.editor_config_override(klean_config::manifest::value_entries(
                &section.editor_config_override,
            )?)?;
        }
    }

    if let Some(section) = &manifest.format.ktfmt {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::ktfmt::DEFAULT_VERSION);
        let mut ktfmt = pipeline.ktfmt_version(version)?;
        if let Some(style) = &section.style {
            match KtfmtStyle::parse(style)? {
                KtfmtStyle::Meta => ktfmt.meta_style()?,
                KtfmtStyle::Google => ktfmt.google_style()?,
                KtfmtStyle::KotlinLang => ktfmt.kotlinlang_style()?,
            };
        }
        let has_options = section.max_width.is_some()
            || section.block_indent.is_some()
            || section.continuation_indent.is_some()
            || section.remove_unused_imports.is_some()
            || section.manage_trailing_commas.is_some();
        if has_options {
            ktfmt.configure(|options| {
                options.max_width = section.max_width;
                options.block_indent = section.block_indent;
                options.continuation_indent = section.continuation_indent;
                options.remove_unused_imports = section.remove_unused_imports;
                options.manage_trailing_commas = section.manage_trailing_commas;
            })?;
        }
    }

    if let Some(section) = &manifest.format.diktat {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::diktat::DEFAULT_VERSION);
        let mut diktat = pipeline.diktat_version(version)?;
        if let Some(path) = &section.config_file {
            diktat.config_file(Some(Path::new(path)))?;
        }
    }

    if pipeline.steps().is_empty() {
        return Err("no formatters configured — add a [format.ktlint], \
                    [format.ktfmt], or [format.diktat] table to klean.toml"
            .into());
    }

    Ok(pipeline)
}

fn cmd_plan(verbose: bool, offline: bool, registry: Option<&str>) -> CliResult {
    let root = project_root()?;
    let manifest = Manifest::from_path(&root.join("klean.toml"))?;
    let lockfile = Lockfile::from_path(&root.join("klean.lock"))?;

    let pipeline = build_pipeline(&root, &manifest, provisioner(&lockfile, offline, registry)?)?;

    println!("pipeline: {} steps", pipeline.steps().len());
    for step in pipeline.steps() {
        println!("  {}  {}", step.name(), step.tool().coordinate.label());
        println!("    jar:       {}", step.tool().jar_path.display());
        println!("    cache key: {}", step.cache_key());
        if verbose {
            for line in step.canonical_config().lines() {
                println!("      {line}");
            }
        }
    }

    let files = pipeline.matched_files()?;
    println!(
        "targets: {} ({} files matched)",
        pipeline.targets().join(", "),
        files.len()
    );
    Ok(())
}

fn cmd_fetch(locked: bool, registry: Option<&str>) -> CliResult {
    let root = project_root()?;
    let manifest = Manifest::from_path(&root.join("klean.toml"))?;
    let lock_path = root.join("klean.lock");
    let mut lockfile = Lockfile::from_path(&lock_path)?;

    // In --locked mode nothing may be downloaded, so every configured
    // tool must already be pinned and cached.
    let pipeline = build_pipeline(&root, &manifest, provisioner(&lockfile, locked, registry)?)?;

    if locked {
        for step in pipeline.steps() {
            let label = step.tool().coordinate.label();
            if lockfile.sha_for(&label).is_none() {
                return Err(format!(
                    "{label} is not pinned in klean.lock — run `klean fetch` without --locked"
                )
                .into());
            }
        }
        eprintln!("    Verified {} pinned tools", pipeline.steps().len());
        return Ok(());
    }

    for step in pipeline.steps() {
        lockfile.pin(&step.tool().coordinate.label(), &step.tool().sha256);
    }
    lockfile.write_to(&lock_path)?;
    eprintln!(
        "    Pinned {} tools in {}",
        pipeline.steps().len(),
        lock_path.display()
    );
    Ok(())
}

fn cmd_versions(registry: Option<&str>) -> CliResult {
    let root = project_root()?;
    let manifest = Manifest::from_path(&root.join("klean.toml"))?;
    let tools_root = klean_util::fs::klean_home()?.join("tools");
    let mut provisioner = MavenProvisioner::new(&tools_root);
    if let Some(registry) = registry {
        provisioner = provisioner.with_registry(registry);
    }

    let mut bindings: Vec<(&str, klean_util::maven::MavenCoordinate)> = Vec::new();
    if let Some(section) = &manifest.format.ktlint {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::ktlint::DEFAULT_VERSION);
        bindings.push(("ktlint", klean_steps::ktlint::coordinate(version)));
    }
    if let Some(section) = &manifest.format.ktfmt {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::ktfmt::DEFAULT_VERSION);
        bindings.push(("ktfmt", klean_steps::ktfmt::coordinate(version)));
    }
    if let Some(section) = &manifest.format.diktat {
        let version = section
            .version
            .as_deref()
            .unwrap_or(klean_steps::diktat::DEFAULT_VERSION);
        bindings.push(("diktat", klean_steps::diktat::coordinate(version)));
    }

    if bindings.is_empty() {
        return Err("no formatters configured in klean.toml".into());
    }

    for (name, coordinate) in &bindings {
        let latest = provisioner.latest_release(coordinate)?;
        let marker = if latest == coordinate.version { "" } else { "  (update available)" };
        println!(
            "{name}: configured {}, latest {latest}{marker}",
            coordinate.version
        );
    }
    Ok(())
}

fn cmd_clean() -> CliResult {
    let tools_root = klean_util::fs::klean_home()?.join("tools");
    klean_util::fs::remove_dir_all_if_exists(&tools_root)?;
    eprintln!("    Removed {}", tools_root.display());
    Ok(())
}
