//! DWE CLI Tool
//!
//! Command-line interface for creating and editing dynamic wallpapers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dwe_core::{
    format_duration, DocumentModel, EditorConfig, Notice, Operation, StartTime,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dwe")]
#[command(about = "Dynamic Wallpaper Editor - create and edit time-based wallpapers")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where an edited wallpaper is written
#[derive(Args)]
struct OutputArgs {
    /// Output file path (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl OutputArgs {
    fn resolve<'a>(&'a self, input: &'a Path) -> &'a Path {
        self.output.as_deref().unwrap_or(input)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the content and schedule of a wallpaper file
    Info {
        /// Input XML file path
        input: PathBuf,

        /// Print the document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a wallpaper from pictures
    Create {
        /// Output XML file path
        output: PathBuf,

        /// Picture paths, in cycle order
        #[arg(required = true)]
        pictures: Vec<PathBuf>,

        /// Seconds each picture is shown alone
        #[arg(long = "static", default_value = "10")]
        static_seconds: u32,

        /// Seconds of transition into the next picture
        #[arg(long = "transition", default_value = "0")]
        transition_seconds: u32,

        /// Rescale durations so the cycle lasts 24 hours
        #[arg(long)]
        fit: bool,
    },

    /// Rescale every duration so the cycle lasts 24 hours
    Fit {
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Set the time at which the cycle starts
    StartTime {
        input: PathBuf,

        #[arg(long, default_value = "2018")]
        year: u32,
        #[arg(long, default_value = "1")]
        month: u32,
        #[arg(long, default_value = "1")]
        day: u32,
        #[arg(long, default_value = "0")]
        hour: u32,
        #[arg(long, default_value = "0")]
        minute: u32,
        #[arg(long, default_value = "0")]
        second: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Give every picture the same durations
    Durations {
        input: PathBuf,

        #[arg(long = "static")]
        static_seconds: u32,

        #[arg(long = "transition", default_value = "0")]
        transition_seconds: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Replace text in every picture path
    Replace {
        input: PathBuf,

        /// Text to search for
        search: String,

        /// Replacement text
        replacement: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Remove the picture at a position (0-based)
    Remove {
        input: PathBuf,

        index: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Move a picture to another position (0-based)
    Move {
        input: PathBuf,

        from: usize,

        to: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => show_info(&input, json)?,

        Commands::Create {
            output,
            pictures,
            static_seconds,
            transition_seconds,
            fit,
        } => {
            let config = EditorConfig {
                static_seconds,
                transition_seconds,
                ..EditorConfig::default()
            };
            create_wallpaper(config, &output, &pictures, fit)?
        }

        Commands::Fit { input, output } => {
            edit_wallpaper(&input, output.resolve(&input), |model| {
                model.fit_to_day();
                println!(
                    "Total duration: {}",
                    format_duration(total_seconds(model))
                );
                Ok(())
            })?
        }

        Commands::StartTime {
            input,
            year,
            month,
            day,
            hour,
            minute,
            second,
            output,
        } => {
            let start = StartTime::new(year, month, day, hour, minute, second);
            edit_wallpaper(&input, output.resolve(&input), |model| {
                model.apply_operation(Operation::SetStartTime(start));
                Ok(())
            })?
        }

        Commands::Durations {
            input,
            static_seconds,
            transition_seconds,
            output,
        } => edit_wallpaper(&input, output.resolve(&input), |model| {
            let operation = model
                .document()
                .set_all_durations(static_seconds, transition_seconds);
            model.apply_operation(operation);
            Ok(())
        })?,

        Commands::Replace {
            input,
            search,
            replacement,
            output,
        } => edit_wallpaper(&input, output.resolve(&input), |model| {
            let operation = model
                .document()
                .replace_in_paths(&search, &replacement)
                .with_context(|| format!("No picture path contains '{}'", search))?;
            model.apply_operation(operation);
            Ok(())
        })?,

        Commands::Remove {
            input,
            index,
            output,
        } => edit_wallpaper(&input, output.resolve(&input), |model| {
            let picture = model
                .document()
                .at_index(index)
                .with_context(|| format!("No picture at position {}", index))?;
            let id = picture.id;
            println!("Removing {}", picture.path);
            model.apply_operation(Operation::delete(id));
            Ok(())
        })?,

        Commands::Move {
            input,
            from,
            to,
            output,
        } => edit_wallpaper(&input, output.resolve(&input), |model| {
            let picture = model
                .document()
                .at_index(from)
                .with_context(|| format!("No picture at position {}", from))?;
            let operation = model.document().move_picture(picture.id, to);
            model.apply_operation(operation);
            Ok(())
        })?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads a wallpaper file into a fresh model
fn open_wallpaper(input: &Path) -> Result<DocumentModel> {
    let mut model = DocumentModel::new();
    let notices = model
        .load_file(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    report_notices(&notices);
    Ok(model)
}

/// Loads, edits and saves a wallpaper
fn edit_wallpaper<F>(input: &Path, output: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&mut DocumentModel) -> Result<()>,
{
    let mut model = open_wallpaper(input)?;
    edit(&mut model)?;

    model
        .save_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {}", output.display());
    Ok(())
}

fn create_wallpaper(
    config: EditorConfig,
    output: &Path,
    pictures: &[PathBuf],
    fit: bool,
) -> Result<()> {
    let mut model = DocumentModel::with_config(config);
    model.add_pictures(pictures.iter().map(|p| p.display().to_string()));
    if fit {
        model.fit_to_day();
    }

    model
        .save_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Created {} with {} pictures ({})",
        output.display(),
        model.document().len(),
        format_duration(total_seconds(&model))
    );
    Ok(())
}

fn show_info(input: &Path, json: bool) -> Result<()> {
    let model = open_wallpaper(input)?;
    let document = model.document();

    if json {
        println!("{}", document.to_json().context("Failed to convert to JSON")?);
        return Ok(());
    }

    let start = &document.start_time;
    println!("\n=== Dynamic Wallpaper ===");
    println!(
        "Start time: {}-{:02}-{:02} {:02}:{:02}:{:02}",
        start.year, start.month, start.day, start.hour, start.minute, start.second
    );
    println!("Pictures: {}", document.len());
    println!(
        "Total duration: {} ({} seconds)",
        format_duration(total_seconds(&model)),
        document.total_duration()
    );
    if let Some((static_seconds, transition_seconds)) = document.uniform_durations() {
        println!(
            "Every picture: {}s static, {}s transition",
            static_seconds, transition_seconds
        );
    }

    println!("\n=== Schedule ===");
    for (picture, slot) in document.pictures.iter().zip(document.schedule()) {
        println!("  [{}] {}", picture.index, picture.path);
        println!(
            "      This picture lasts from {} to {}",
            slot.static_start, slot.static_end
        );
        if picture.transition_seconds > 0 {
            let next = document
                .next_of(picture.index)
                .map(|p| p.path.as_str())
                .unwrap_or_default();
            println!(
                "      The transition to {} lasts from {} to {}",
                next, slot.static_end, slot.transition_end
            );
        }
    }

    Ok(())
}

fn total_seconds(model: &DocumentModel) -> u32 {
    u32::try_from(model.document().total_duration()).unwrap_or(u32::MAX)
}

fn report_notices(notices: &[Notice]) {
    for notice in notices.iter().filter(|n| n.is_user_visible()) {
        eprintln!("warning: {}", notice);
    }
}
