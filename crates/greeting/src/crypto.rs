use crate::error::{GreetingError, Result};

/// Identity of the crypto library linked into the process.
///
/// Detected once and then passed by reference, so the functions that report
/// it stay pure and can be tested against a fixed version text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedCryptoLibrary {
    version_text: String,
}

impl LinkedCryptoLibrary {
    /// Query the linked OpenSSL for its version text, e.g.
    /// `"OpenSSL 3.0.13 30 Jan 2024"`.
    ///
    /// # Example
    ///
    /// ```
    /// use greeting::LinkedCryptoLibrary;
    ///
    /// let crypto = LinkedCryptoLibrary::detect().unwrap();
    /// assert!(crypto.version_text().starts_with("OpenSSL"));
    /// ```
    pub fn detect() -> Result<Self> {
        let text = openssl::version::version();
        let crypto = Self::from_version_text(text)?;
        tracing::debug!(
            version = crypto.version_text(),
            number = openssl::version::number(),
            "detected linked crypto library"
        );
        Ok(crypto)
    }

    /// Wrap a known version text. Blank text is rejected rather than replaced
    /// with a placeholder.
    pub fn from_version_text(text: impl Into<String>) -> Result<Self> {
        let version_text = text.into();
        if version_text.trim().is_empty() {
            return Err(GreetingError::CryptoLibraryUnavailable(
                "empty version text".to_string(),
            ));
        }
        Ok(Self { version_text })
    }

    pub fn version_text(&self) -> &str {
        &self.version_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_reports_openssl() {
        let crypto = LinkedCryptoLibrary::detect().unwrap();
        assert!(crypto.version_text().starts_with("OpenSSL"));
    }

    #[test]
    fn test_detect_is_stable() {
        assert_eq!(
            LinkedCryptoLibrary::detect().unwrap(),
            LinkedCryptoLibrary::detect().unwrap()
        );
    }

    #[test]
    fn test_from_version_text_rejects_blank() {
        for text in ["", "   "] {
            let err = LinkedCryptoLibrary::from_version_text(text).unwrap_err();
            assert!(matches!(err, GreetingError::CryptoLibraryUnavailable(_)));
        }
    }

    #[test]
    fn test_from_version_text_keeps_text() {
        let crypto = LinkedCryptoLibrary::from_version_text("OpenSSL 1.1.1w 11 Sep 2023").unwrap();
        assert_eq!(crypto.version_text(), "OpenSSL 1.1.1w 11 Sep 2023");
    }
}
