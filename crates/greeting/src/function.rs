use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::crypto::LinkedCryptoLibrary;
use crate::error::{GreetingError, Result};
use crate::{greet, greet_with_crypto_version};

/// A single argument or result value as handed over by a query engine.
///
/// The non-text variants only exist so a host can pass what it has and get
/// `InvalidArgument` back.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Varchar(String),
}

impl ScalarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "NULL",
            ScalarValue::Boolean(_) => "BOOLEAN",
            ScalarValue::Integer(_) => "BIGINT",
            ScalarValue::Double(_) => "DOUBLE",
            ScalarValue::Varchar(_) => "VARCHAR",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Varchar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Varchar(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Varchar(value)
    }
}

/// Name and signature of a registered function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FunctionInfo {
    pub name: &'static str,
    pub arity: usize,
    pub description: &'static str,
}

/// A scalar function callable by a query engine.
///
/// Implementations are stateless apart from values fixed at construction, so
/// one instance can serve concurrent calls.
pub trait ScalarFunction: Send + Sync {
    fn info(&self) -> FunctionInfo;

    /// Evaluate one row. `NULL` input yields `NULL` output.
    fn invoke(&self, args: &[ScalarValue]) -> Result<ScalarValue>;
}

/// Pull the single `name` argument out of an argument row.
///
/// `Ok(None)` means the argument is SQL `NULL`.
fn single_name_arg<'a>(
    function: &'static str,
    args: &'a [ScalarValue],
) -> Result<Option<&'a str>> {
    match args {
        [] => Err(GreetingError::invalid_argument(
            function,
            "missing required argument `name`",
        )),
        [ScalarValue::Null] => Ok(None),
        [ScalarValue::Varchar(name)] => Ok(Some(name)),
        [other] => Err(GreetingError::invalid_argument(
            function,
            format!("expected VARCHAR, got {}", other.type_name()),
        )),
        _ => Err(GreetingError::invalid_argument(
            function,
            format!("expected 1 argument, got {}", args.len()),
        )),
    }
}

/// `oml(name)`: the plain greeting.
#[derive(Clone, Copy, Debug, Default)]
pub struct OmlFunction;

impl OmlFunction {
    pub const NAME: &'static str = "oml";
}

impl ScalarFunction for OmlFunction {
    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            name: Self::NAME,
            arity: 1,
            description: "Greets `name` with a duckling",
        }
    }

    fn invoke(&self, args: &[ScalarValue]) -> Result<ScalarValue> {
        Ok(match single_name_arg(Self::NAME, args)? {
            Some(name) => ScalarValue::Varchar(greet(name)),
            None => ScalarValue::Null,
        })
    }
}

/// `oml_openssl_version(name)`: the greeting plus the linked OpenSSL version.
#[derive(Clone, Debug)]
pub struct OmlOpenSslVersionFunction {
    crypto: LinkedCryptoLibrary,
}

impl OmlOpenSslVersionFunction {
    pub const NAME: &'static str = "oml_openssl_version";

    pub fn new(crypto: LinkedCryptoLibrary) -> Self {
        Self { crypto }
    }

    pub fn crypto(&self) -> &LinkedCryptoLibrary {
        &self.crypto
    }
}

impl ScalarFunction for OmlOpenSslVersionFunction {
    fn info(&self) -> FunctionInfo {
        FunctionInfo {
            name: Self::NAME,
            arity: 1,
            description: "Greets `name` and reports the linked OpenSSL version",
        }
    }

    fn invoke(&self, args: &[ScalarValue]) -> Result<ScalarValue> {
        Ok(match single_name_arg(Self::NAME, args)? {
            Some(name) => ScalarValue::Varchar(greet_with_crypto_version(name, &self.crypto)),
            None => ScalarValue::Null,
        })
    }
}

/// The functions exported by the extension, looked up by name.
pub struct FunctionRegistry {
    functions: Vec<Box<dyn ScalarFunction>>,
}

impl FunctionRegistry {
    /// Registry with both greeting functions, bound to `crypto`.
    pub fn new(crypto: LinkedCryptoLibrary) -> Self {
        Self {
            functions: vec![
                Box::new(OmlFunction),
                Box::new(OmlOpenSslVersionFunction::new(crypto)),
            ],
        }
    }

    /// Registry bound to the OpenSSL linked into this process.
    pub fn with_linked_crypto() -> Result<Self> {
        Ok(Self::new(LinkedCryptoLibrary::detect()?))
    }

    /// Function names are matched case-insensitively, as in SQL.
    pub fn get(&self, name: &str) -> Option<&dyn ScalarFunction> {
        self.functions
            .iter()
            .find(|f| f.info().name.eq_ignore_ascii_case(name))
            .map(|f| &**f)
    }

    /// Evaluate one row without a database, as embedders and `oml-cli --direct` do.
    pub fn call(&self, name: &str, args: &[ScalarValue]) -> Result<ScalarValue> {
        let function = self
            .get(name)
            .ok_or_else(|| GreetingError::UnknownFunction(name.to_string()))?;
        function.invoke(args)
    }

    pub fn infos(&self) -> Vec<FunctionInfo> {
        self.functions.iter().map(|f| f.info()).collect()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.infos()).finish()
    }
}
