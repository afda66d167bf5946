use clap::{Parser, Subcommand, ValueEnum};
use lincs_store::cli::{self as prog_cli, Command, OutputMode};
use lincs_store::config::Config;
use lincs_store::document::DocumentKind;
use lincs_store::store::MemoryStore;
use lincs_store::Lincs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "lincs", version, about = "LINCS document store client", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, the usual locations are searched.")]
    config: Option<PathBuf>,
    /// Use the devel environment section (same as setting LINCS_DEVEL)
    #[arg(long)]
    devel: bool,
    /// NDJSON file seeding the in-process store (one document per line, keyed by `id`)
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Human)]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Human,
    Plain,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Kind {
    Pert,
    Instance,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print the statement a filter compiles to")]
    Compile {
        #[arg(help = "Filter as a JSON object, e.g. '{\"cell_id\":\"A375\"}'")]
        filter: String,
        #[arg(long, help = "Comma-separated projection")]
        fields: Option<String>,
        #[arg(long)]
        skip: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        count: bool,
    },
    #[command(about = "Print the key lookup statement for a list of ids")]
    Keys {
        ids: Vec<String>,
        #[arg(long)]
        fields: Option<String>,
    },
    #[command(about = "Check a JSON document against a record schema")]
    Validate {
        #[arg(value_enum)]
        kind: Kind,
        file: PathBuf,
    },
    #[command(about = "Filtered read")]
    Query {
        filter: String,
        #[arg(long)]
        fields: Option<String>,
        #[arg(long)]
        skip: Option<usize>,
        #[arg(long)]
        limit: Option<usize>,
    },
    #[command(about = "Filtered count")]
    Count { filter: String },
    #[command(about = "Read documents by key")]
    Get {
        ids: Vec<String>,
        #[arg(long)]
        fields: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if std::env::var_os("LINCS_LOG_DIR").is_some() {
        if let Err(e) = lincs_store::logger::configure_from_env() {
            eprintln!("logging disabled: {e}");
        }
    } else if std::path::Path::new("log4rs.yaml").exists()
        && let Err(e) = lincs_store::init()
    {
        eprintln!("logging disabled: {e}");
    }
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let devel = cli.devel;
    let cfg = Config::load_with(cli.config.as_deref(), |k| {
        if k == "LINCS_DEVEL" && devel { Some("1".into()) } else { std::env::var(k).ok() }
    })?;
    let store = MemoryStore::connect(&cfg.store)?;
    if let Some(path) = &cli.data {
        let n = store.load_ndjson(path)?;
        log::info!("loaded {n} documents from {}", path.display());
    }
    let lincs = Lincs::open(&cfg, Arc::new(store));

    let mode = match cli.format {
        Format::Human => OutputMode::Human,
        Format::Plain => OutputMode::Plain,
        Format::Json => OutputMode::Json,
    };
    let cmd = match cli.command {
        Commands::Compile { filter, fields, skip, limit, count } => {
            Command::Compile { filter_json: filter, fields, skip, limit, count }
        }
        Commands::Keys { ids, fields } => Command::Keys { ids, fields },
        Commands::Validate { kind, file } => {
            let kind = match kind {
                Kind::Pert => DocumentKind::Pert,
                Kind::Instance => DocumentKind::Instance,
            };
            Command::Validate { kind, file }
        }
        Commands::Query { filter, fields, skip, limit } => {
            Command::Query { filter_json: filter, fields, skip, limit }
        }
        Commands::Count { filter } => Command::Count { filter_json: filter },
        Commands::Get { ids, fields } => Command::Get { ids, fields },
    };
    let mut stdout = std::io::stdout().lock();
    let res = prog_cli::run_with_format(&lincs, cmd, mode, &mut stdout).await;
    lincs.close().await?;
    res
}
