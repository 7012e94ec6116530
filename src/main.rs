use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dirsync::cli::Cli;
use dirsync::config::Config;
use dirsync::sync::{SubdirPolicy, SyncEngine, SyncOptions, SyncStats};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

// Warnings listed individually in the summary; the rest are counted
const MAX_LISTED_WARNINGS: usize = 10;

fn main() -> Result<()> {
    // Parse CLI arguments
    let mut cli = Cli::parse();

    // Load config file
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Handle profile-only flags (print and exit)
    if cli.list_profiles {
        let profiles = config.list_profiles();
        if profiles.is_empty() {
            println!("No profiles configured");
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            println!("\nCreate profiles in: {}", path.display());
        } else {
            println!("Available profiles:");
            for name in profiles {
                println!("  {}", name);
            }
        }
        return Ok(());
    }

    if let Some(ref profile_name) = cli.show_profile {
        match config.show_profile(profile_name) {
            Some(output) => {
                println!("{}", output);
                return Ok(());
            }
            None => {
                anyhow::bail!("Profile '{}' not found", profile_name);
            }
        }
    }

    // Merge profile with CLI args if --profile is set (CLI args take precedence)
    if let Some(ref profile_name) = cli.profile {
        let profile = config
            .get_profile(profile_name)
            .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", profile_name))?;

        if cli.source.is_none() {
            cli.source = profile.source.as_ref().map(PathBuf::from);
        }
        if cli.destination.is_none() {
            cli.destination = profile.destination.as_ref().map(PathBuf::from);
        }
        if cli.mode.is_none() {
            cli.mode = profile.mode;
        }
        cli.dry_run |= profile.dry_run.unwrap_or(false);
        cli.times |= profile.times.unwrap_or(false);
        cli.force_subdirs |= profile.force_subdirs.unwrap_or(false);
        cli.quiet |= profile.quiet.unwrap_or(false);
        cli.json |= profile.json.unwrap_or(false);
        if let Some(verbose) = profile.verbose {
            if cli.verbose == 0 {
                cli.verbose = verbose;
            }
        }
    }

    // Setup logging (stderr, so stdout stays clean for --json)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Validate arguments
    cli.validate()?;

    let (Some(source), Some(destination)) = (cli.source.clone(), cli.destination.clone()) else {
        anyhow::bail!("Source and destination are required (or use --profile)");
    };
    let mode = cli.sync_mode();

    // Print header (skip if JSON mode)
    if !cli.quiet && !cli.json {
        println!("dirsync v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Syncing {} → {} ({})",
            source.display(),
            destination.display(),
            mode
        );

        if cli.dry_run {
            println!("Mode: Dry-run (no changes will be made)\n");
        }
    }

    let engine = SyncEngine::new(SyncOptions {
        dry_run: cli.dry_run,
        preserve_times: cli.times,
        subdir_policy: if cli.force_subdirs {
            SubdirPolicy::ForceCopy
        } else {
            SubdirPolicy::Incremental
        },
        quiet: cli.quiet,
        json: cli.json,
    });

    let stats = engine.run(mode, &source, &destination)?;

    // Print summary (skip if JSON mode - already emitted JSON summary)
    if !cli.quiet && !cli.json {
        print_summary(&stats, cli.dry_run);
    }

    Ok(())
}

fn print_summary(stats: &SyncStats, dry_run: bool) {
    if dry_run {
        println!("\n{}\n", "✓ Dry-run complete (no changes made)".green().bold());
    } else if stats.has_changes() {
        println!("\n{}\n", "✓ Sync complete".green().bold());
    } else {
        println!("\n{}\n", "✓ Sync complete (already up to date)".green().bold());
    }

    let count = |n: usize, color: fn(&str) -> colored::ColoredString| {
        let text = n.to_string();
        if n > 0 {
            color(&text)
        } else {
            text.bright_black()
        }
    };

    let (created, updated, deleted, removed) = if dry_run {
        ("Would create:", "Would update:", "Would delete:", "Would remove:")
    } else {
        ("Files created:", "Files updated:", "Files deleted:", "Dirs removed:")
    };

    println!("  {:<19}{}", "Dirs created:", count(stats.dirs_created, |s| s.green()));
    println!("  {:<19}{}", created, count(stats.files_created, |s| s.green()));
    println!("  {:<19}{}", updated, count(stats.files_updated, |s| s.yellow()));
    println!("  {:<19}{}", "Files skipped:", stats.files_skipped.to_string().bright_black());
    println!("  {:<19}{}", deleted, count(stats.files_deleted, |s| s.red()));
    println!("  {:<19}{}", removed, count(stats.dirs_deleted, |s| s.red()));

    println!();
    println!(
        "  {:<19}{}",
        "Bytes copied:",
        format_bytes(stats.bytes_transferred).cyan()
    );
    println!(
        "  {:<19}{}",
        "Duration:",
        format_duration(stats.duration).cyan()
    );

    if !stats.warnings.is_empty() {
        println!();
        println!(
            "  {:<19}{}",
            "Warnings:",
            stats.warnings.len().to_string().yellow()
        );
        for warning in stats.warnings.iter().take(MAX_LISTED_WARNINGS) {
            println!("    {} {}", "!".yellow(), warning);
        }
        if stats.warnings.len() > MAX_LISTED_WARNINGS {
            println!(
                "    … and {} more",
                stats.warnings.len() - MAX_LISTED_WARNINGS
            );
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        let mins = secs / 60;
        let secs = secs % 60;
        if mins >= 60 {
            let hours = mins / 60;
            let mins = mins % 60;
            format!("{}h {}m {}s", hours, mins, secs)
        } else {
            format!("{}m {}s", mins, secs)
        }
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
