use std::error::Error;

use duckdb::{
    core::{DataChunkHandle, Inserter, LogicalTypeId},
    ffi::duckdb_string_t,
    types::DuckString,
    vscalar::{ScalarFunctionSignature, VScalar},
    vtab::arrow::WritableVector,
};
use greeting::{
    GreetingError, LinkedCryptoLibrary, OmlFunction, OmlOpenSslVersionFunction, ScalarFunction,
    ScalarValue,
};

/// `(VARCHAR) -> VARCHAR`, shared by both functions.
fn name_signature() -> ScalarFunctionSignature {
    ScalarFunctionSignature::exact(
        vec![LogicalTypeId::Varchar.into()],
        LogicalTypeId::Varchar.into(),
    )
}

/// Run `function` over every row of a single-column VARCHAR chunk.
///
/// # Safety
///
/// `input` must hold a VARCHAR vector in column 0 and `output` must be a
/// VARCHAR vector sized for `input.len()` rows.
unsafe fn evaluate_chunk(
    function: &dyn ScalarFunction,
    input: &mut DataChunkHandle,
    output: &mut dyn WritableVector,
) -> Result<(), Box<dyn Error>> {
    let rows = input.len();
    let names = input.flat_vector(0);
    let values = names.as_slice_with_len::<duckdb_string_t>(rows);
    let mut out = output.flat_vector();

    for (row, value) in values.iter().enumerate() {
        let arg = if names.row_is_null(row as u64) {
            ScalarValue::Null
        } else {
            ScalarValue::Varchar(DuckString::new(&mut { *value }).as_str().to_string())
        };
        match function.invoke(std::slice::from_ref(&arg))? {
            ScalarValue::Varchar(greeting) => out.insert(row, greeting.as_str()),
            ScalarValue::Null => out.set_null(row),
            other => {
                return Err(format!(
                    "{}() produced {} where VARCHAR was expected",
                    function.info().name,
                    other.type_name()
                )
                .into())
            }
        }
    }
    Ok(())
}

/// DuckDB binding for `oml(name)`.
pub struct OmlScalar;

impl VScalar for OmlScalar {
    type State = OmlFunction;

    unsafe fn invoke(
        state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        evaluate_chunk(state, input, output)
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![name_signature()]
    }
}

/// Per-registration state of `oml_openssl_version`.
///
/// DuckDB builds the state through `Default`, so a failed crypto library
/// lookup is kept and reported by every call instead of being replaced.
/// [`crate::register`] detects the library first, so in practice the error
/// surfaces at load time.
#[derive(Debug)]
pub struct LinkedGreetingState(Result<OmlOpenSslVersionFunction, GreetingError>);

impl LinkedGreetingState {
    /// The bound function, or the detection error captured at registration.
    pub fn function(&self) -> Result<&OmlOpenSslVersionFunction, GreetingError> {
        self.0.as_ref().map_err(Clone::clone)
    }
}

impl Default for LinkedGreetingState {
    fn default() -> Self {
        Self(LinkedCryptoLibrary::detect().map(OmlOpenSslVersionFunction::new))
    }
}

/// DuckDB binding for `oml_openssl_version(name)`.
pub struct OmlOpenSslVersionScalar;

impl VScalar for OmlOpenSslVersionScalar {
    type State = LinkedGreetingState;

    unsafe fn invoke(
        state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        let function = state.function()?;
        evaluate_chunk(function, input, output)
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![name_signature()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_state_detects_openssl() {
        let state = LinkedGreetingState::default();
        let function = state.function().unwrap();
        assert!(function.crypto().version_text().starts_with("OpenSSL"));
    }

    #[test]
    fn test_linked_state_reports_missing_crypto() {
        let missing = GreetingError::CryptoLibraryUnavailable("empty version text".to_string());
        let state = LinkedGreetingState(Err(missing.clone()));
        assert_eq!(state.function().unwrap_err(), missing);
    }

    #[test]
    fn test_linked_state_error_converts_to_call_error() {
        let state = LinkedGreetingState(LinkedCryptoLibrary::from_version_text("").map(
            OmlOpenSslVersionFunction::new,
        ));
        let err: Box<dyn Error> = state.function().map(|_| ()).unwrap_err().into();
        assert!(
            err.to_string().contains("linked crypto library is unavailable"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_signature_lists_single_overload() {
        assert_eq!(OmlScalar::signatures().len(), 1);
        assert_eq!(OmlOpenSslVersionScalar::signatures().len(), 1);
    }
}
