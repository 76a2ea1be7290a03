use clap::{Parser, Subcommand};
use routegen::{config, output, site};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "routegen")]
#[command(about = "Static site generator built around declared routes")]
#[command(long_about = "\
Static site generator built around declared routes

Markdown posts and pages become routes, listings are paginated, and static
files are copied alongside. Nothing is written unless every route is valid.

Content structure:

  content/
  ├── routegen.toml        # Site config (optional)
  ├── posts/*.md           # Posts with front matter → /post/{slug}/
  ├── pages/*.md           # Standalone pages → /{slug}/
  ├── assets/              # Copied to /assets/ (style.css is linked)
  └── 404.html             # Copied to /404.html

ROUTEGEN_SRC and ROUTEGEN_DEST override the content and output directories.

Run 'routegen gen-config' to generate a documented routegen.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory (overrides `destination` in routegen.toml)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory
    Build {
        /// Also write a JSON report of the build to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate all routes without writing anything
    Check,
    /// Print a stock routegen.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { report } => {
            let config = load_site_config(&cli.source, cli.output)?;
            let generator = site::build(config)?;
            println!(
                "==> Building {} → {}",
                generator.source().display(),
                generator.destination().display()
            );
            let result = generator.commit()?;
            output::print_commit_report(&result);
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&path, json)?;
            }
        }
        Command::Check => {
            let config = load_site_config(&cli.source, cli.output)?;
            let generator = site::build(config)?;
            println!("==> Checking {}", generator.source().display());
            let result = generator.check();
            output::print_check_output(&generator.planned_pages(), result.as_ref().copied());
            result?;
            println!("==> Routes are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `routegen.toml` from the effective content directory and apply CLI overrides.
fn load_site_config(
    source: &Path,
    output: Option<PathBuf>,
) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site_config = config::load_for_source(source)?;
    if let Some(output) = output {
        site_config.destination = output;
    }
    Ok(site_config)
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
