//! DuckDB extension `oml`.
//!
//! Registers two scalar functions on a connection:
//!
//! ```sql
//! SELECT oml('Sam');                     -- Oml Sam 🐥
//! SELECT oml_openssl_version('Michael'); -- Oml Michael, my linked OpenSSL version is OpenSSL 3...
//! ```
//!
//! Embedders call [`register`] on their own connection. Built with the
//! `loadable-extension` feature, the cdylib also exports the C API entrypoint
//! and can be loaded with `LOAD '<path>'` from a host started with
//! `allow_unsigned_extensions`.

use duckdb::Connection;
use greeting::{
    GreetingError, LinkedCryptoLibrary, OmlFunction, OmlOpenSslVersionFunction, ScalarFunction,
};
use thiserror::Error;

mod scalar;

#[cfg(feature = "loadable-extension")]
mod entrypoint;

pub use scalar::{LinkedGreetingState, OmlOpenSslVersionScalar, OmlScalar};

/// Name the extension is loaded under.
pub const EXTENSION_NAME: &str = "oml";

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error(transparent)]
    Greeting(#[from] GreetingError),
    #[error("duckdb: {0}")]
    DuckDb(#[from] duckdb::Error),
}

/// Register `oml` and `oml_openssl_version` on `conn`.
///
/// Fails before registering anything if the linked crypto library cannot be
/// queried.
pub fn register(conn: &Connection) -> Result<(), ExtensionError> {
    let crypto = LinkedCryptoLibrary::detect()?;

    conn.register_scalar_function::<OmlScalar>(OmlFunction::NAME)?;
    conn.register_scalar_function::<OmlOpenSslVersionScalar>(OmlOpenSslVersionFunction::NAME)?;

    let versioned = OmlOpenSslVersionFunction::new(crypto);
    for info in [OmlFunction.info(), versioned.info()] {
        tracing::debug!(
            extension = EXTENSION_NAME,
            function = info.name,
            arity = info.arity,
            "registered scalar function"
        );
    }
    Ok(())
}

/// Version of the DuckDB library the extension is running in, e.g. `v1.3.2`.
pub fn extension_version(conn: &Connection) -> Result<String, ExtensionError> {
    let version = conn.query_row(
        "SELECT library_version FROM pragma_version()",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();
        conn
    }

    fn query_string(conn: &Connection, sql: &str) -> Option<String> {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_oml_sam() {
        let conn = connection();
        assert_eq!(
            query_string(&conn, "SELECT oml('Sam') AS value"),
            Some("Oml Sam 🐥".to_string())
        );
    }

    #[test]
    fn test_oml_empty_name() {
        let conn = connection();
        assert_eq!(
            query_string(&conn, "SELECT oml('')"),
            Some("Oml  🐥".to_string())
        );
    }

    #[test]
    fn test_oml_openssl_version_michael() {
        let conn = connection();
        let value = query_string(&conn, "SELECT oml_openssl_version('Michael')").unwrap();
        assert!(
            value.starts_with("Oml Michael, my linked OpenSSL version is OpenSSL"),
            "unexpected value: {value}"
        );
    }

    #[test]
    fn test_oml_openssl_version_matches_core() {
        let conn = connection();
        let crypto = greeting::LinkedCryptoLibrary::detect().unwrap();
        assert_eq!(
            query_string(&conn, "SELECT oml_openssl_version('Michael')"),
            Some(greeting::greet_with_crypto_version("Michael", &crypto))
        );
    }

    #[test]
    fn test_null_name_yields_null() {
        let conn = connection();
        assert_eq!(query_string(&conn, "SELECT oml(NULL::VARCHAR)"), None);
        assert_eq!(
            query_string(&conn, "SELECT oml_openssl_version(NULL::VARCHAR)"),
            None
        );
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        let conn = connection();
        assert!(conn
            .query_row("SELECT oml()", [], |row| row.get::<_, String>(0))
            .is_err());
        assert!(conn
            .query_row("SELECT oml_openssl_version()", [], |row| row
                .get::<_, String>(0))
            .is_err());
    }

    #[test]
    fn test_rows_keep_their_order() {
        let conn = connection();
        let mut stmt = conn
            .prepare(
                "SELECT oml(name) FROM (VALUES (1, 'Sam'), (2, NULL), (3, 'a much longer name than twelve bytes')) t(i, name) ORDER BY i",
            )
            .unwrap();
        let rows: Vec<Option<String>> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                Some("Oml Sam 🐥".to_string()),
                None,
                Some("Oml a much longer name than twelve bytes 🐥".to_string()),
            ]
        );
    }

    #[test]
    fn test_many_chunks() {
        let conn = connection();
        let matching: i64 = conn
            .query_row(
                "SELECT count(*) FROM range(5000) t(i) WHERE oml(i::VARCHAR) = 'Oml ' || i::VARCHAR || ' 🐥'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(matching, 5000);
    }

    #[test]
    fn test_repeated_calls_agree() {
        let conn = connection();
        let first = query_string(&conn, "SELECT oml_openssl_version('Sam')");
        let second = query_string(&conn, "SELECT oml_openssl_version('Sam')");
        assert_eq!(first, second);
    }

    #[test]
    fn test_extension_version() {
        let conn = connection();
        let version = extension_version(&conn).unwrap();
        assert!(version.starts_with('v'), "unexpected version: {version}");
    }
}
