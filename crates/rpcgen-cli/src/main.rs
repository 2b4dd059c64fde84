//! rpcgen command line interface.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use tracing_subscriber::EnvFilter;

use rpcgen::{Generator, GeneratorConfig, Target};

mod ui;

#[derive(Parser)]
#[command(name = "rpcgen")]
#[command(about = "Generate typed RPC clients from an application definition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a client from an application definition
    Generate(GenerateArgs),

    /// Validate an application definition without writing anything
    Check {
        /// Application definition JSON file
        #[arg(short, long, default_value = "app_definition.json")]
        input: PathBuf,
    },

    /// Regenerate the client whenever the definition changes
    Watch(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// Application definition JSON file
    #[arg(short, long, default_value = "app_definition.json")]
    input: PathBuf,

    /// File the generated client is written to [default: src/client.<ext>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language (rust, typescript)
    #[arg(short, long, default_value = "rust")]
    target: String,

    /// Prefix added to every generated type name
    #[arg(long, default_value = "")]
    type_prefix: String,

    /// Name of the root client
    #[arg(long, default_value = "Api")]
    root_service: String,

    /// Skip running the formatter on the output
    #[arg(long)]
    no_format: bool,

    /// Formatter executable to use instead of the target's default
    #[arg(long)]
    formatter: Option<PathBuf>,

    /// Omit the `#![allow(..)]` header, for output pulled in with `include!`
    #[arg(long)]
    no_inner_attributes: bool,
}

impl GenerateArgs {
    fn into_config(self) -> GeneratorConfig {
        let defaults = GeneratorConfig::default();
        let output = self.output.unwrap_or_else(|| match self.target.parse::<Target>() {
            Ok(target) => defaults.output.with_extension(target.extension()),
            Err(_) => defaults.output.clone(),
        });
        GeneratorConfig {
            input: self.input,
            output,
            target: self.target,
            type_prefix: self.type_prefix,
            root_service: self.root_service,
            format: !self.no_format,
            formatter: self.formatter,
            rust_inner_attributes: !self.no_inner_attributes,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RPCGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(args.into_config())?,
        Commands::Check { input } => check(input)?,
        Commands::Watch(args) => run_watch_mode(args.into_config()).await?,
    }

    Ok(())
}

fn generate(config: GeneratorConfig) -> miette::Result<()> {
    let spinner = ui::spinner("Generating client...");
    let start = Instant::now();

    let generator = Generator::new(config);
    match generator.generate() {
        Ok(result) => {
            spinner.finish_and_clear();
            ui::success(&format!(
                "Wrote {} client to {}",
                result.target,
                ui::file_link(&result.output)
            ));
            println!(
                "    {} procedures {} {} definitions",
                result.procedures,
                ui::symbols::DOT,
                result.definitions
            );
            if generator.config().format && !result.formatted {
                ui::dim("Formatter did not run, output left unformatted.");
            }
            ui::timing("Generated", start.elapsed().as_millis());
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

fn check(input: PathBuf) -> miette::Result<()> {
    let spinner = ui::spinner("Checking application definition...");

    let generator = Generator::new(GeneratorConfig {
        input,
        ..GeneratorConfig::default()
    });
    let result = generator.check();
    spinner.finish_and_clear();
    let result = result?;

    if result.is_valid() {
        ui::looking_good();
        println!();
        println!(
            "    {} procedures {} {} definitions",
            result.procedures,
            ui::symbols::DOT,
            result.definitions
        );
        return Ok(());
    }

    ui::nope_header();
    for problem in &result.problems {
        ui::error(&problem.to_string());
    }
    println!();
    Err(miette::miette!(
        "{} problem(s) found in {}",
        result.problems.len(),
        generator.config().input.display()
    ))
}

/// Runs generation once, then again after every change to the input file.
async fn run_watch_mode(config: GeneratorConfig) -> miette::Result<()> {
    let input = config.input.clone();
    let watch_dir = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    ui::info(&format!("Watching for changes in {}", input.display()));
    println!();

    let generator = Generator::new(config);
    regenerate(&generator, "Generating client...");

    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    let file_name = input.file_name().map(|name| name.to_os_string());

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                let touched = events
                    .iter()
                    .any(|event| event.path.file_name() == file_name.as_deref());
                if touched {
                    let _ = tx.try_send(());
                }
            }
            Err(e) => tracing::warn!(error = ?e, "file watcher error"),
        },
    )
    .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| miette::miette!("Failed to watch {}: {}", watch_dir.display(), e))?;

    ui::info("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            received = rx.recv() => {
                if received.is_none() {
                    break;
                }
                println!();
                regenerate(&generator, "Change detected, regenerating...");
                println!();
                ui::info("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

fn regenerate(generator: &Generator, message: &str) {
    let spinner = ui::spinner(message);
    let start = Instant::now();

    match generator.generate() {
        Ok(result) => {
            spinner.finish_and_clear();
            ui::success(&format!(
                "Generated {} procedure(s) into {} in {}ms",
                result.procedures,
                result.output.display(),
                start.elapsed().as_millis()
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            ui::error(&format!("{}", e));
        }
    }
}
