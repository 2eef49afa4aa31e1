use crate::api::errors::RankingError;
use crate::ranking::credential::ServiceAccountCredential;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_MINUTES: i64 = 60;

/// Claims of the self-signed assertion traded for an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access token scoped to read-only analytics, valid for a single request.
#[derive(Clone, veil::Redact)]
pub struct AuthClient {
    #[redact(partial)]
    access_token: String,
    token_type: String,
}

impl AuthClient {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
}

/// Pick the token endpoint: explicit override, then the credential's own, then Google's.
pub fn resolve_token_url<'a>(
    override_url: Option<&'a str>,
    credential: &'a ServiceAccountCredential,
) -> &'a str {
    override_url
        .or(credential.token_uri.as_deref())
        .unwrap_or(DEFAULT_TOKEN_URL)
}

/// Sign the RS256 assertion for the read-only analytics scope.
pub fn build_assertion(
    credential: &ServiceAccountCredential,
    token_url: &str,
    now: DateTime<Utc>,
) -> Result<String, RankingError> {
    let key = EncodingKey::from_rsa_pem(credential.private_key.as_bytes())
        .map_err(|e| RankingError::Auth(format!("invalid private key: {e}")))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&credential.private_key_id);

    let claims = AssertionClaims {
        iss: credential.client_email.clone(),
        scope: ANALYTICS_READONLY_SCOPE.to_string(),
        aud: token_url.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ASSERTION_LIFETIME_MINUTES)).timestamp(),
    };

    encode(&header, &claims, &key)
        .map_err(|e| RankingError::Auth(format!("failed to sign assertion: {e}")))
}

/// Exchange the service-account credential for an access token.
pub async fn exchange(
    http: &reqwest::Client,
    credential: &ServiceAccountCredential,
    token_url_override: Option<&str>,
) -> Result<AuthClient, RankingError> {
    let token_url = resolve_token_url(token_url_override, credential);
    let assertion = build_assertion(credential, token_url, Utc::now())?;

    let response = http
        .post(token_url)
        .form(&[
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .map_err(|e| RankingError::Auth(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RankingError::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| RankingError::Auth(format!("unreadable token response: {e}")))?;
    let access_token = token
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RankingError::Auth("token response has no access_token".to_string()))?;

    tracing::debug!(client_email = %credential.client_email, "Obtained analytics access token");
    Ok(AuthClient::new(
        access_token,
        token.token_type.unwrap_or_else(|| "Bearer".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const TEST_PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_key.pub.pem");

    fn credential(token_uri: Option<&str>) -> ServiceAccountCredential {
        ServiceAccountCredential {
            client_email: "ranking@example.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PRIVATE_KEY.to_string(),
            private_key_id: Some("key-1".to_string()),
            token_uri: token_uri.map(str::to_string),
        }
    }

    #[test]
    fn test_assertion_claims() {
        let cred = credential(None);
        let now = Utc::now();
        let jwt = build_assertion(&cred, DEFAULT_TOKEN_URL, now).unwrap();

        let header = decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[DEFAULT_TOKEN_URL]);
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let data = decode::<AssertionClaims>(&jwt, &key, &validation).unwrap();

        assert_eq!(data.claims.iss, cred.client_email);
        assert_eq!(data.claims.scope, ANALYTICS_READONLY_SCOPE);
        assert_eq!(data.claims.aud, DEFAULT_TOKEN_URL);
        assert_eq!(data.claims.iat, now.timestamp());
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn test_invalid_private_key() {
        let mut cred = credential(None);
        cred.private_key = "not a pem".to_string();
        let err = build_assertion(&cred, DEFAULT_TOKEN_URL, Utc::now()).unwrap_err();
        assert!(matches!(err, RankingError::Auth(_)));
    }

    #[test]
    fn test_resolve_token_url_precedence() {
        let with_uri = credential(Some("https://tokens.example/token"));
        assert_eq!(
            resolve_token_url(Some("http://override/token"), &with_uri),
            "http://override/token"
        );
        assert_eq!(
            resolve_token_url(None, &with_uri),
            "https://tokens.example/token"
        );
        assert_eq!(resolve_token_url(None, &credential(None)), DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_auth_client_debug_hides_token() {
        let client = AuthClient::new("ya29.abcdefghijklmnopqrstuvwxyz", "Bearer");
        assert!(!format!("{client:?}").contains("abcdefghijklmnopqrstuvwxyz"));
        assert_eq!(client.token_type(), "Bearer");
    }

    #[tokio::test]
    async fn test_exchange_unreachable_endpoint() {
        let http = reqwest::Client::new();
        let err = exchange(&http, &credential(None), Some("http://127.0.0.1:9/token"))
            .await
            .unwrap_err();
        assert!(matches!(err, RankingError::Auth(_)));
    }
}
