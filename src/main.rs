use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::Result;
use gigstore::export::ExportOutcome;
use gigstore::generate::{
    DEFAULT_FIVERR_EXPERIENCE, DEFAULT_UPWORK_EXPERIENCE, FIVERR_CATEGORIES, FIVERR_EXPERIENCE_LEVELS,
    UPWORK_CATEGORIES, UPWORK_EXPERIENCE_LEVELS,
};
use gigstore::{Config, Generated, Generator, GigRequest, NoSuggester, PlatformFilter, ProposalRequest, Store};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gigstore")]
#[command(about = "Generate Fiverr gigs and Upwork proposals, browse the history, export it as CSV or JSON")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: ./gigstore.yaml, then the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Results file (overrides config and GIGSTORE_RESULTS_FILE)
    #[arg(short, long)]
    results_file: Option<PathBuf>,

    /// Directory for exports (overrides config and GIGSTORE_EXPORT_DIR)
    #[arg(short, long)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Fiverr gig listing
    Gig {
        #[arg(long)]
        category: String,

        #[arg(long, default_value = DEFAULT_FIVERR_EXPERIENCE)]
        experience: String,

        /// Skills or short description
        #[arg(long)]
        skills: String,

        /// Base package price in dollars
        #[arg(long)]
        pricing: Option<String>,
    },

    /// Generate an Upwork proposal
    Proposal {
        #[arg(long)]
        category: String,

        #[arg(long, default_value = DEFAULT_UPWORK_EXPERIENCE)]
        experience: String,

        /// Skills or expertise
        #[arg(long)]
        skills: String,

        /// Hourly rate in whole dollars
        #[arg(long)]
        rate: Option<String>,
    },

    /// List generated results
    List {
        /// All, Fiverr or Upwork
        #[arg(short, long, default_value = "All")]
        platform: String,

        /// Print rows as JSON objects keyed by column
        #[arg(long)]
        json: bool,
    },

    /// Export every result to a timestamped file
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
    },

    /// Show the category and experience choices for each platform
    Categories,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.results_file {
        config.results_file = path;
    }
    if let Some(dir) = cli.export_dir {
        config.export_dir = dir;
    }

    match cli.command {
        Commands::Gig {
            category,
            experience,
            skills,
            pricing,
        } => {
            let req = GigRequest {
                category,
                experience,
                skills,
                pricing,
            };
            let mut store = Store::open(&config.results_file);
            let generated = match config.title_suggester() {
                Some(suggester) => Generator::new(suggester).fiverr_gig(&req)?,
                None => Generator::new(NoSuggester).fiverr_gig(&req)?,
            };
            save_and_print(&mut store, generated)
        }
        Commands::Proposal {
            category,
            experience,
            skills,
            rate,
        } => {
            let req = ProposalRequest {
                category,
                experience,
                skills,
                hourly_rate: rate,
            };
            let mut store = Store::open(&config.results_file);
            let generated = Generator::new(NoSuggester).upwork_proposal(&req)?;
            save_and_print(&mut store, generated)
        }
        Commands::List { platform, json } => {
            let store = Store::open(&config.results_file);
            print_list(&store, &PlatformFilter::parse(&platform), json)
        }
        Commands::Export { format } => {
            let store = Store::open(&config.results_file);
            let exporter = config.exporter();
            let outcome = match format {
                ExportFormat::Csv => exporter.export_csv(&store)?,
                ExportFormat::Json => exporter.export_json(&store)?,
            };
            print_export(&outcome);
            Ok(())
        }
        Commands::Categories => {
            print_choices("Fiverr", FIVERR_CATEGORIES, FIVERR_EXPERIENCE_LEVELS);
            print_choices("Upwork", UPWORK_CATEGORIES, UPWORK_EXPERIENCE_LEVELS);
            Ok(())
        }
    }
}

fn save_and_print(store: &mut Store, generated: Generated) -> Result<()> {
    let Generated { record, document } = generated;
    println!("{}", document);

    store.append(record)?;
    eprintln!(
        "{} Saved to {} ({} results)",
        "✓".green(),
        store.path().display(),
        store.len()
    );
    Ok(())
}

fn print_list(store: &Store, filter: &PlatformFilter, json: bool) -> Result<()> {
    let table = gigstore::list(store, filter);

    if json {
        println!("{}", gigstore::json::to_pretty_json(&table)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("No results for {}", filter.to_string().bold());
        return Ok(());
    }

    println!("{}", table.columns().join(" | ").bold());
    for row in table.rows() {
        let [platform, category, title, description, tags, pricing, timestamp] = row;
        let summary = description.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        println!(
            "{} | {} | {} | {} | {} | {} | {}",
            platform.cyan(),
            category,
            title.bold(),
            summary.dimmed(),
            tags,
            pricing.green(),
            timestamp
        );
    }
    println!("{} results", table.len());
    Ok(())
}

fn print_export(outcome: &ExportOutcome) {
    match outcome.path() {
        Some(path) => println!("{} {}: {}", "✓".green(), outcome.status(), path.display()),
        None => println!("{} {}", "!".yellow(), outcome.status()),
    }
}

fn print_choices(platform: &str, categories: &[&str], levels: &[&str]) {
    println!("{}", platform.bold());
    println!("  Categories:");
    for category in categories {
        println!("    {}", category);
    }
    println!("  Experience levels:");
    for level in levels {
        println!("    {}", level);
    }
}
