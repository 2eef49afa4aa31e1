use crate::api::errors::RankingError;
use serde::Deserialize;

/// Service-account identity used for the JWT bearer exchange.
#[derive(Clone, Deserialize, veil::Redact)]
pub struct ServiceAccountCredential {
    pub client_email: String,
    #[redact]
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

/// Parse the double-encoded credential blob.
///
/// Raw newlines inside the stored value are escaped first, then the outer JSON
/// string is decoded and its contents parsed into the credential object.
pub fn parse_credential(raw: Option<&str>) -> Result<ServiceAccountCredential, RankingError> {
    let raw = raw.ok_or_else(|| {
        RankingError::CredentialParse("ANALYTICS_API_CREDENTIAL is not set".to_string())
    })?;
    let escaped = raw.replace('\n', "\\n");

    let inner: String = serde_json::from_str(&escaped)
        .map_err(|e| RankingError::CredentialParse(format!("outer layer: {e}")))?;
    serde_json::from_str(&inner)
        .map_err(|e| RankingError::CredentialParse(format!("inner layer: {e}")))
}
