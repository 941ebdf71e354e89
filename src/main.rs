use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use langpulse_core::{LangpulseConfig, OutputFormat};
use langpulse_report::{RenderOptions, Section};
use langpulse_source::{DataSource, SqliteSource};

const CONFIG_FILE: &str = ".langpulse.toml";

#[derive(Parser)]
#[command(
    name = "langpulse",
    version,
    about = "Programming language activity analytics",
    long_about = "Langpulse turns per-language issue, pull request and repository counts\n\
                   into market share, growth, momentum and cluster competition reports.\n\n\
                   Inputs are CSV files mounted as SQLite virtual tables, so the same data\n\
                   can also be explored with plain SQL.\n\n\
                   Examples:\n  \
                     langpulse analyze                          Full report from ./issues.csv, ./prs.csv, ./repos.csv\n  \
                     langpulse analyze --analysis momentum      Only the momentum table\n  \
                     langpulse --format json analyze            Machine-readable report\n  \
                     langpulse query 'SELECT * FROM repos_csv'  Ad-hoc SQL over the inputs\n  \
                     langpulse clusters                         List language clusters"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .langpulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,

    /// Issue counts CSV (overrides [sources] issues)
    #[arg(long, global = true)]
    issues: Option<PathBuf>,

    /// Pull request counts CSV (overrides [sources] prs)
    #[arg(long, global = true)]
    prs: Option<PathBuf>,

    /// Repository counts CSV (overrides [sources] repos)
    #[arg(long, global = true)]
    repos: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the analytics pipeline and print the report
    #[command(long_about = "Run the analytics pipeline and print the report.\n\n\
        Normalizes the three inputs, builds the composite activity table and derives\n\
        market leaders, yearly issue growth, quarterly momentum, cluster competition\n\
        and performance profiles.\n\n\
        Examples:\n  langpulse analyze\n  langpulse analyze --analysis growth --limit 50\n  langpulse --format markdown analyze > report.md")]
    Analyze {
        /// Analysis to show
        #[arg(long, default_value = "all")]
        analysis: Analysis,

        /// Maximum rows per table (default: 20)
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Run a SQL query against the input tables
    #[command(long_about = "Run a SQL query against the input tables.\n\n\
        The inputs are registered as issues_csv, prs_csv and repos_csv. Every cell\n\
        is returned as text.\n\n\
        Examples:\n  langpulse query 'SELECT * FROM issues_csv'\n  langpulse query 'SELECT language, num_repos FROM repos_csv ORDER BY 2 DESC LIMIT 5'")]
    Query {
        /// SQL statement
        sql: String,
    },
    /// List language clusters used by the competition analysis
    Clusters,
    /// Create a default .langpulse.toml configuration file
    #[command(long_about = "Create a default .langpulse.toml configuration file.\n\n\
        Writes source paths, analysis sizes and the built-in cluster definitions.\n\
        Fails if .langpulse.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Analysis {
    /// Every section
    All,
    /// KPIs, ingestion counts and the composite activity table
    Overview,
    /// Repository market leaders
    Market,
    /// Year-over-year issue growth
    Growth,
    /// Quarterly pull request momentum
    Momentum,
    /// Market share shifts inside language clusters
    Competition,
    /// Volume and stability profiles
    Performance,
    /// Highlights and validation stats
    Insights,
}

impl Analysis {
    fn sections(self) -> Result<Vec<Section>> {
        if self == Analysis::All {
            return Ok(Section::ALL.to_vec());
        }
        let name = self
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        let section = name.parse::<Section>().map_err(|e| miette::miette!("{e}"))?;
        Ok(vec![section])
    }
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[36m▲\x1b[0m \x1b[1mlangpulse\x1b[0m v{version}: programming language activity analytics\n");

        println!("Quick start:");
        println!("  \x1b[36mlangpulse init\x1b[0m                 Create a .langpulse.toml config file");
        println!("  \x1b[36mlangpulse analyze\x1b[0m              Run the full report\n");

        println!("All commands:");
        println!("  \x1b[32manalyze\x1b[0m   Market share, growth, momentum, competition, performance");
        println!("  \x1b[32mquery\x1b[0m     Ad-hoc SQL over the input tables");
        println!("  \x1b[32mclusters\x1b[0m  List language clusters");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("langpulse v{version}: programming language activity analytics\n");

        println!("Quick start:");
        println!("  langpulse init                 Create a .langpulse.toml config file");
        println!("  langpulse analyze              Run the full report\n");

        println!("All commands:");
        println!("  analyze   Market share, growth, momentum, competition, performance");
        println!("  query     Ad-hoc SQL over the input tables");
        println!("  clusters  List language clusters");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'langpulse <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load_config(cli: &Cli) -> Result<LangpulseConfig> {
    let mut config = match &cli.config {
        Some(path) => LangpulseConfig::from_file(path)
            .wrap_err(format!("loading config {}", path.display()))?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                LangpulseConfig::from_file(default_path)?
            } else {
                LangpulseConfig::default()
            }
        }
    };

    if let Some(path) = &cli.issues {
        config.sources.issues = path.clone();
    }
    if let Some(path) = &cli.prs {
        config.sources.prs = path.clone();
    }
    if let Some(path) = &cli.repos {
        config.sources.repos = path.clone();
    }
    Ok(config)
}

fn connect(config: &LangpulseConfig) -> Result<SqliteSource> {
    SqliteSource::connect(&config.sources).map_err(|e| {
        miette::miette!(
            help = "Run from the directory holding issues.csv, prs.csv and repos.csv, \
                    or point to them with --issues/--prs/--repos",
            "{e}"
        )
    })
}

const DEFAULT_CONFIG: &str = r#"# Langpulse Configuration

[sources]
# issues = "issues.csv"
# prs = "prs.csv"
# repos = "repos.csv"

[analysis]
# growth_top_n = 100
# leaders_page_size = 10
# insight_top_n = 3

"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    tracing::debug!(
        format = %cli.format,
        issues = %config.sources.issues.display(),
        prs = %config.sources.prs.display(),
        repos = %config.sources.repos.display(),
        "resolved configuration"
    );

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Analyze { analysis, limit }) => {
            let source = connect(&config)?;
            let report = langpulse_metrics::run_pipeline(&source, &config)?;
            let options = RenderOptions {
                sections: analysis.sections()?,
                limit,
                leaders_page_size: config.analysis.leaders_page_size,
                use_color: use_color && cli.format == OutputFormat::Text,
            };
            let output = langpulse_report::render(&report, cli.format, &options)?;
            print!("{output}");
            if cli.format == OutputFormat::Json {
                println!();
            }
        }
        Some(Command::Query { ref sql }) => {
            let source = connect(&config)?;
            let table = source.query(sql).map_err(|e| {
                miette::miette!(
                    help = format!(
                        "registered tables: {}",
                        source.table_names().join(", ")
                    ),
                    "{e}"
                )
            })?;
            let output = langpulse_report::format_table(&table, cli.format)?;
            print!("{output}");
            if cli.format == OutputFormat::Json {
                println!();
            }
        }
        Some(Command::Clusters) => {
            let clusters = config.resolved_clusters();
            let output = langpulse_report::format_clusters(&clusters, cli.format)?;
            print!("{output}");
            if cli.format == OutputFormat::Json {
                println!();
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file or remove it first",
                    "{CONFIG_FILE} already exists"
                ));
            }
            let content = format!(
                "{DEFAULT_CONFIG}{}",
                langpulse_core::builtin_clusters_toml()
            );
            std::fs::write(path, content)
                .into_diagnostic()
                .wrap_err(format!("writing {CONFIG_FILE}"))?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "langpulse", &mut std::io::stdout());
        }
    }

    Ok(())
}
