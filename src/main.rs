/// Version injected at compile time via RESTADMIN_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("RESTADMIN_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use restadmin::api::{format_api_error, ApiHttpClient};
use restadmin::config::{Config, DEFAULT_GATEWAY_URL};
use restadmin::output::render_table;
use restadmin::resource::{
    Filter, FilterValue, QueryOptions, Record, ResourceAdapter, ResourceError, ResourceRegistry,
    Sort, SortDirection,
};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Admin access to REST collections
#[derive(Parser, Debug)]
#[command(name = "restadmin", version = VERSION, about, long_about = None)]
struct Cli {
    /// Resource configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token (overrides RESTADMIN_TOKEN and the config file)
    #[arg(short, long, global = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect every configured resource and show its status
    Resources,
    /// Show the admin properties projection of a resource
    Properties { resource: String },
    /// List records
    List {
        resource: String,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
        /// Accepted for compatibility; sorting is not forwarded to the backend
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Count records matching the filters
    Count {
        resource: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one record
    Get { resource: String, id: String },
    /// Create a record
    Create {
        resource: String,
        /// Field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Update a record
    Update {
        resource: String,
        id: String,
        /// Field as key=value (repeatable)
        #[arg(long = "field", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },
    /// Delete a record
    Delete { resource: String, id: String },
    /// Write a starter configuration file
    Init {
        /// API gateway base URL
        #[arg(long, default_value = DEFAULT_GATEWAY_URL)]
        gateway: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Equality filter as path=value (repeatable)
    #[arg(long = "filter", value_parser = parse_assignment)]
    filters: Vec<(String, String)>,

    /// Range filter as path=from..to; either side may be empty (repeatable)
    #[arg(long = "range", value_parser = parse_range)]
    ranges: Vec<RangeArg>,
}

#[derive(Debug, Clone)]
struct RangeArg {
    path: String,
    from: Option<String>,
    to: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        for (path, value) in &self.filters {
            filter.insert(path.clone(), parse_value(value));
        }
        for range in &self.ranges {
            filter.insert(
                range.path.clone(),
                FilterValue::range(range.from.as_deref(), range.to.as_deref()),
            );
        }
        filter
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_range(s: &str) -> Result<RangeArg, String> {
    let (path, bounds) = parse_assignment(s)?;
    let (from, to) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected path=from..to, got '{}'", s))?;
    let side = |v: &str| (!v.is_empty()).then(|| v.to_string());
    Ok(RangeArg {
        path,
        from: side(from),
        to: side(to),
    })
}

/// Parse a command-line value as JSON when possible, otherwise as a string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn to_fields(pairs: &[(String, String)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.clone(), parse_value(value)))
        .collect()
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok());

    let filter = match (env_filter, level.to_tracing_level()) {
        (Some(filter), _) => filter,
        (None, Some(level)) => EnvFilter::new(level.to_string().to_lowercase()),
        (None, None) => return None,
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("restadmin {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("restadmin").join("restadmin.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".restadmin").join("restadmin.log");
    }
    PathBuf::from("restadmin.log")
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        if let Some(resource_err) = err.downcast_ref::<ResourceError>() {
            eprintln!("Hint: {}", format_api_error(resource_err.api_error()));
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Init { gateway, force } = &cli.command {
        return init_config(cli.config.clone(), gateway, *force);
    }

    let config = Config::load(cli.config.as_deref())?;
    let token = config.effective_token(cli.token.as_deref());
    let token = token.as_deref();
    let http = ApiHttpClient::new()?;

    match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Resources => {
            let registry = ResourceRegistry::connect_all(config.resources, &http).await;
            let summary: Vec<Value> = registry
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "name": a.name(),
                        "database": a.database_type(),
                        "state": format!("{:?}", a.state()),
                        "properties": a.properties().len(),
                    })
                })
                .collect();
            print_json(&summary)
        }
        Command::Properties { resource } => {
            let adapter = connect(&config, &http, &resource).await?;
            print_json(&adapter.admin_properties())
        }
        Command::List {
            resource,
            filters,
            limit,
            offset,
            sort,
            desc,
        } => {
            let adapter = connect(&config, &http, &resource).await?;
            let options = QueryOptions {
                limit,
                offset,
                sort: sort.map(|sort_by| Sort {
                    sort_by,
                    direction: if desc {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    },
                }),
            };
            let records = adapter.list(&filters.to_filter(), &options, token).await;
            print_records(cli.output, &adapter, &records)
        }
        Command::Count { resource, filters } => {
            let adapter = connect(&config, &http, &resource).await?;
            let count = adapter.count(&filters.to_filter(), token).await;
            println!("{}", count);
            Ok(())
        }
        Command::Get { resource, id } => {
            let adapter = connect(&config, &http, &resource).await?;
            match adapter.get_by_id(&id, token).await {
                Some(record) => print_records(cli.output, &adapter, &[record]),
                None => {
                    eprintln!("{} {} not found", adapter.name(), id);
                    Ok(())
                }
            }
        }
        Command::Create { resource, fields } => {
            let adapter = connect(&config, &http, &resource).await?;
            let created = adapter.create(to_fields(&fields), token).await?;
            print_json(&created)
        }
        Command::Update {
            resource,
            id,
            fields,
        } => {
            let adapter = connect(&config, &http, &resource).await?;
            let updated = adapter.update(&id, to_fields(&fields), token).await?;
            print_json(&updated)
        }
        Command::Delete { resource, id } => {
            let adapter = connect(&config, &http, &resource).await?;
            adapter.delete(&id, token).await?;
            println!("Deleted {} {}", adapter.name(), id);
            Ok(())
        }
    }
}

/// Connect the single resource named on the command line
async fn connect(
    config: &Config,
    http: &ApiHttpClient,
    name: &str,
) -> Result<Arc<ResourceAdapter>> {
    let def = config
        .resources
        .iter()
        .find(|def| def.name.eq_ignore_ascii_case(name))
        .cloned()
        .with_context(|| {
            let known: Vec<&str> = config.resources.iter().map(|d| d.name.as_str()).collect();
            format!("Unknown resource '{}' (configured: {})", name, known.join(", "))
        })?;

    Ok(ResourceAdapter::connect(def, http.clone()).await)
}

fn init_config(path: Option<PathBuf>, gateway: &str, force: bool) -> Result<()> {
    let path = path
        .or_else(Config::default_path)
        .context("No config directory available; pass --config")?;

    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::starter(gateway)?.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_records(format: OutputFormat, adapter: &ResourceAdapter, records: &[Record]) -> Result<()> {
    match format {
        OutputFormat::Table => {
            print!("{}", render_table(&adapter.properties(), records));
            Ok(())
        }
        OutputFormat::Json => {
            let params: Vec<&Map<String, Value>> = records.iter().map(Record::params).collect();
            print_json(&params)
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("name=Bob").unwrap(),
            ("name".to_string(), "Bob".to_string())
        );
        assert_eq!(
            parse_assignment("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("name").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_parse_range_sides() {
        let r = parse_range("price=10..").unwrap();
        assert_eq!(r.path, "price");
        assert_eq!(r.from.as_deref(), Some("10"));
        assert_eq!(r.to, None);

        let r = parse_range("date_created=..2024-12-31").unwrap();
        assert_eq!(r.from, None);
        assert_eq!(r.to.as_deref(), Some("2024-12-31"));

        assert!(parse_range("price=10").is_err());
    }

    #[test]
    fn test_values_parse_as_json_when_possible() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("Bob"), json!("Bob"));
    }

    #[test]
    fn test_cli_parses_list_command() {
        let cli = Cli::try_parse_from([
            "restadmin",
            "list",
            "user",
            "--limit",
            "10",
            "--filter",
            "role=admin",
            "--range",
            "date_created=2024-01-01..",
            "--output",
            "table",
        ])
        .unwrap();

        let Command::List { filters, limit, .. } = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(limit, Some(10));
        let filter = filters.to_filter();
        assert_eq!(filter.len(), 2);
    }
}
