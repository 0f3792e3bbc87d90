use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use duckdb::Connection;
use greeting::{FunctionInfo, FunctionRegistry, OmlFunction, ScalarValue};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oml-cli")]
#[command(about = "Run the oml greeting functions in an in-memory DuckDB")]
struct Args {
    /// Name to greet.
    #[arg(long)]
    name: Option<String>,

    /// Scalar function to call with --name.
    #[arg(long, default_value = OmlFunction::NAME)]
    function: String,

    /// Run an arbitrary query instead; the first column must be VARCHAR.
    #[arg(long, conflicts_with = "name")]
    sql: Option<String>,

    /// Evaluate --name without opening a database.
    #[arg(long, conflicts_with = "sql")]
    direct: bool,

    /// List the registered functions and exit.
    #[arg(long)]
    list: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct QueryOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    duckdb_version: Option<String>,
    query: String,
    rows: Vec<Option<String>>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("opening in-memory DuckDB")?;
    oml::register(&conn).context("registering oml functions")?;
    Ok(conn)
}

/// Build `SELECT <function>(?)` for a function known to the catalog.
fn call_query(catalog: &FunctionRegistry, function: &str) -> Result<String> {
    let info = catalog
        .get(function)
        .map(|f| f.info())
        .ok_or_else(|| anyhow!("unknown function {function:?}; try --list"))?;
    Ok(format!("SELECT {}(?)", info.name))
}

/// Call `function` through the catalog, bypassing DuckDB.
fn call_direct(catalog: &FunctionRegistry, function: &str, name: &str) -> Result<Option<String>> {
    let value = catalog
        .call(function, &[ScalarValue::from(name)])
        .with_context(|| format!("calling {function}"))?;
    Ok(value.as_str().map(str::to_string))
}

fn run_query(conn: &Connection, sql: &str, params: &[&str]) -> Result<Vec<Option<String>>> {
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("preparing {sql:?}"))?;
    let rows = stmt
        .query_map(duckdb::params_from_iter(params.iter()), |row| {
            row.get::<_, Option<String>>(0)
        })
        .with_context(|| format!("running {sql:?}"))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("reading result rows")?;
    Ok(rows)
}

fn print_list(infos: &[FunctionInfo], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(infos).context("encoding function list")?
        );
    } else {
        for info in infos {
            println!("{}({} arg) - {}", info.name, info.arity, info.description);
        }
    }
    Ok(())
}

fn print_rows(output: &QueryOutput, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(output).context("encoding query output")?
        );
    } else {
        for row in &output.rows {
            println!("{}", row.as_deref().unwrap_or("NULL"));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let catalog = FunctionRegistry::with_linked_crypto().context("detecting linked OpenSSL")?;
    if args.list {
        return print_list(&catalog.infos(), args.json);
    }

    if args.direct {
        let name = args
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("--direct needs --name"))?;
        let row = call_direct(&catalog, &args.function, name)?;
        return print_rows(
            &QueryOutput {
                duckdb_version: None,
                query: format!("{}(?)", args.function),
                rows: vec![row],
            },
            args.json,
        );
    }

    let conn = open_connection()?;
    let duckdb_version = oml::extension_version(&conn).context("reading DuckDB version")?;
    tracing::debug!(%duckdb_version, "connection ready");

    let (query, rows) = match (&args.sql, &args.name) {
        (Some(sql), _) => (sql.clone(), run_query(&conn, sql, &[])?),
        (None, Some(name)) => {
            let query = call_query(&catalog, &args.function)?;
            let rows = run_query(&conn, &query, &[name.as_str()])?;
            (query, rows)
        }
        (None, None) => bail!("pass --name, --sql or --list"),
    };

    print_rows(
        &QueryOutput {
            duckdb_version: Some(duckdb_version),
            query,
            rows,
        },
        args.json,
    )
}
