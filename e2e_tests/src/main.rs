use anyhow::{bail, ensure, Context, Result};
use duckdb::{Config, Connection};
use greeting::GREETING_PREFIX;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Read configuration from environment variables (set by the build script)
    let extension_binary = std::env::var("OML_EXTENSION_BINARY_PATH").ok();

    let conn = match extension_binary.as_deref() {
        Some("") => {
            bail!("OML_EXTENSION_BINARY_PATH is set but empty; unset it to test in-process")
        }
        Some(path) => {
            tracing::info!(path, "loading extension binary");
            load_extension(path)?
        }
        None => {
            tracing::info!("OML_EXTENSION_BINARY_PATH not set, registering functions in-process");
            let conn = Connection::open_in_memory().context("opening in-memory DuckDB")?;
            oml::register(&conn).context("registering oml functions")?;
            conn
        }
    };

    run(&conn)?;
    Ok(())
}

/// Fresh connection with the extension binary at `path` loaded.
fn load_extension(path: &str) -> Result<Connection> {
    let config = Config::default()
        .with("allow_unsigned_extensions", "true")
        .context("enabling unsigned extensions")?;
    let conn = Connection::open_in_memory_with_flags(config).context("opening DuckDB")?;
    conn.execute_batch(&format!("LOAD '{}'", path.replace('\'', "''")))
        .with_context(|| format!("loading {path}"))?;
    Ok(conn)
}

fn query_value(conn: &Connection, sql: &str) -> Result<Option<String>> {
    conn.query_row(sql, [], |row| row.get(0))
        .with_context(|| format!("running {sql:?}"))
}

pub fn run(conn: &Connection) -> Result<()> {
    tracing::info!("Testing oml('Sam')...");
    let value = query_value(conn, "SELECT oml('Sam') as value;")?;
    ensure!(
        value.as_deref() == Some("Oml Sam 🐥"),
        "oml('Sam') returned {value:?}"
    );

    tracing::info!("Testing oml('')...");
    let value = query_value(conn, "SELECT oml('');")?;
    ensure!(
        value.as_deref() == Some("Oml  🐥"),
        "oml('') returned {value:?}"
    );

    tracing::info!("Testing oml_openssl_version('Michael')...");
    let value = query_value(conn, "SELECT oml_openssl_version('Michael');")?;
    let expected = format!("{GREETING_PREFIX}Michael, my linked OpenSSL version is OpenSSL");
    ensure!(
        value.as_deref().is_some_and(|v| v.starts_with(&expected)),
        "oml_openssl_version('Michael') returned {value:?}"
    );

    tracing::info!("Testing repeated calls are stable...");
    let first = query_value(conn, "SELECT oml_openssl_version('Sam');")?;
    let second = query_value(conn, "SELECT oml_openssl_version('Sam');")?;
    ensure!(first == second, "{first:?} != {second:?}");

    tracing::info!("Testing missing argument is rejected...");
    for sql in ["SELECT oml();", "SELECT oml_openssl_version();"] {
        ensure!(
            query_value(conn, sql).is_err(),
            "{sql} should fail without an argument"
        );
    }

    tracing::info!("Testing NULL passes through...");
    let value = query_value(conn, "SELECT oml(NULL::VARCHAR);")?;
    ensure!(value.is_none(), "oml(NULL) returned {value:?}");

    tracing::info!("All tests passed!");

    Ok(())
}
