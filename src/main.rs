/// sortbox entry point
mod cli;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use sortbox::config::ConfigError;
use sortbox::label_tools;
use sortbox::terminal::{self, Input};
use sortbox::{Action, AppConfig, Session, SessionOptions};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let loaded = match config_path.as_deref() {
        Some(path) => AppConfig::load_if_present(path),
        None => Ok(None),
    };
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };

    // RUST_LOG, when set, overrides the configured level
    env_logger::Builder::new()
        .filter_level(config.startup_level(cli.verbose))
        .parse_env(env_logger::Env::default())
        .init();

    match loaded {
        Ok(Some(_)) => log::info!("Loaded configuration from {:?}", config_path),
        Ok(None) => log::debug!("No config file at {:?}, using defaults", config_path),
        Err(e) => log::warn!("Ignoring config file {:?}: {}", config_path, e),
    }
    log::debug!("Log level: {}", config.preferences.log_level.name());

    let result = match cli.command {
        Commands::Sort { folder } => {
            run_session(folder, &config);
            Ok(())
        }
        Commands::Stats { dir } => stats(&dir),
        Commands::Minority { dir } => minority(&dir),
        Commands::Relabel { dir, from, to } => relabel(&dir, &from, &to),
        Commands::ImportLabelme { json_dir, out, classes } => {
            import_labelme(&json_dir, out.as_deref(), &classes)
        }
        Commands::Split {
            dir,
            out,
            train_ratio,
            seed,
        } => split(&dir, &out, train_ratio, seed),
        Commands::Config { write_default } => show_config(config_path.as_deref(), &config, write_default),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Interactive session: one event per stdin line until quit or end of input.
fn run_session(folder: PathBuf, config: &AppConfig) {
    let mut session = Session::new(SessionOptions::from_config(config));
    log::info!("Label font: {}", session.font().name());

    println!("{}", config.keybindings.help());
    dispatch(&mut session, Action::OpenFolder(folder));
    print_frame(&session);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Cannot read input: {}", e);
                break;
            }
        };

        match terminal::parse_line(&line, &config.keybindings, session.is_editing()) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => println!("{}", config.keybindings.help()),
            Ok(Input::Nothing) => continue,
            Ok(Input::Action(action)) => dispatch(&mut session, action),
            Err(e) => {
                eprintln!("  ! {}", e);
                continue;
            }
        }
        print_frame(&session);
    }

    if let Some(project) = session.project() {
        log::info!(
            "Session ended with {} images pending and {} history entries",
            project.len(),
            session.history().len()
        );
    }
}

fn dispatch(session: &mut Session, action: Action) {
    match session.handle(action) {
        Ok(effects) => {
            for effect in effects {
                println!("  {}", effect);
            }
        }
        Err(e) => eprintln!("  ! {}", e),
    }
}

fn print_frame(session: &Session) {
    println!("{}", session.status());
    for command in session.frame() {
        println!("    {}", command);
    }
}

fn stats(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let distribution = label_tools::label_distribution(dir)?;
    if distribution.is_empty() {
        println!("No boxes found in {}", dir.display());
        return Ok(());
    }
    for (label, count) in &distribution {
        println!("{label}: {count}");
    }
    Ok(())
}

fn minority(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let distribution = label_tools::label_distribution(dir)?;
    let Some(label) = label_tools::minority_label(&distribution) else {
        println!("No boxes found in {}", dir.display());
        return Ok(());
    };
    println!("Minority label: {label}");
    for file in label_tools::files_with_label(dir, label)? {
        println!("  {}", file.display());
    }
    Ok(())
}

fn relabel(dir: &Path, from: &str, to: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = label_tools::relabel_all(dir, from, to)?;
    println!(
        "Relabeled {} boxes in {} files ({} -> {})",
        report.boxes_changed, report.files_changed, from, to
    );
    Ok(())
}

fn import_labelme(
    json_dir: &Path,
    out: Option<&Path>,
    classes: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let report = label_tools::import_labelme(json_dir, out.unwrap_or(json_dir), classes)?;
    println!(
        "Converted {} files ({} boxes); {} shapes skipped, {} files without boxes, {} failed",
        report.files_converted,
        report.boxes_written,
        report.shapes_skipped,
        report.files_without_boxes,
        report.files_failed
    );
    Ok(())
}

fn split(dir: &Path, out: &Path, train_ratio: f32, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    let split = label_tools::split_images(dir, train_ratio, seed)?;
    let (train, valid) = label_tools::write_split(&split, out)?;
    println!("{}: {} images", train.display(), split.train.len());
    println!("{}: {} images", valid.display(), split.valid.len());
    Ok(())
}

fn show_config(
    path: Option<&Path>,
    config: &AppConfig,
    write_default: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if write_default {
        let path = path.ok_or_else(|| {
            ConfigError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        AppConfig::default().save_to(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    match path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config path"),
    }
    println!("{}", config.to_json()?);
    Ok(())
}
