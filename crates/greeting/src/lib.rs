//! # Greeting - scalar functions of the `oml` extension
//!
//! This crate holds the host-independent core of the `oml` DuckDB extension:
//! two pure functions that turn a name into a greeting, plus the small amount
//! of plumbing a query engine needs to call them through a uniform interface.
//!
//! ## Functions
//!
//! | SQL name              | Result                                                        |
//! |-----------------------|---------------------------------------------------------------|
//! | `oml`                 | `"Oml " + name + " 🐥"`                                        |
//! | `oml_openssl_version` | `"Oml " + name + ", my linked OpenSSL version is " + version` |
//!
//! The version text comes from whatever OpenSSL build is linked into the
//! process. It is never read implicitly: callers detect it once with
//! [`LinkedCryptoLibrary::detect`] and pass it in.
//!
//! ## Example
//!
//! ```
//! use greeting::{greet, greet_with_crypto_version, LinkedCryptoLibrary};
//!
//! assert_eq!(greet("Sam"), "Oml Sam 🐥");
//!
//! let crypto = LinkedCryptoLibrary::from_version_text("OpenSSL 3.0.13 30 Jan 2024").unwrap();
//! assert_eq!(
//!     greet_with_crypto_version("Michael", &crypto),
//!     "Oml Michael, my linked OpenSSL version is OpenSSL 3.0.13 30 Jan 2024"
//! );
//! ```
//!
//! ## Calling through a host
//!
//! Query engines do not call [`greet`] directly; they hand over a row of
//! dynamically typed arguments. [`FunctionRegistry`] resolves a function by
//! name and validates the arguments, reporting [`GreetingError::InvalidArgument`]
//! for a missing, extra or non-string argument. SQL `NULL` passes through as
//! `NULL`.

mod crypto;
mod error;
mod function;

pub use crypto::LinkedCryptoLibrary;
pub use error::{GreetingError, Result};
pub use function::{
    FunctionInfo, FunctionRegistry, OmlFunction, OmlOpenSslVersionFunction, ScalarFunction,
    ScalarValue,
};

/// Prefix shared by every greeting.
pub const GREETING_PREFIX: &str = "Oml ";

/// Suffix appended by [`greet`].
pub const GREETING_SUFFIX: &str = " 🐥";

/// Text placed between the name and the crypto library version.
pub const CRYPTO_VERSION_INFIX: &str = ", my linked OpenSSL version is ";

/// Build the plain greeting for `name`.
///
/// Any string is accepted, including the empty string.
pub fn greet(name: &str) -> String {
    let mut out =
        String::with_capacity(GREETING_PREFIX.len() + name.len() + GREETING_SUFFIX.len());
    out.push_str(GREETING_PREFIX);
    out.push_str(name);
    out.push_str(GREETING_SUFFIX);
    out
}

/// Build the greeting that also reports the linked crypto library version.
pub fn greet_with_crypto_version(name: &str, crypto: &LinkedCryptoLibrary) -> String {
    let version = crypto.version_text();
    let mut out = String::with_capacity(
        GREETING_PREFIX.len() + name.len() + CRYPTO_VERSION_INFIX.len() + version.len(),
    );
    out.push_str(GREETING_PREFIX);
    out.push_str(name);
    out.push_str(CRYPTO_VERSION_INFIX);
    out.push_str(version);
    out
}
