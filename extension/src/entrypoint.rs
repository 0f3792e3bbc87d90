use std::error::Error;

use duckdb::Connection;
use duckdb_loadable_macros::duckdb_entrypoint_c_api;
#[allow(unused_imports)]
use libduckdb_sys as ffi;

/// C API entrypoint, exported as `oml_init_c_api`.
#[duckdb_entrypoint_c_api(ext_name = "oml", min_duckdb_version = "v1.2.0")]
pub unsafe fn extension_entrypoint(con: Connection) -> Result<(), Box<dyn Error>> {
    crate::register(&con)?;
    tracing::info!(extension = crate::EXTENSION_NAME, "extension loaded");
    Ok(())
}
