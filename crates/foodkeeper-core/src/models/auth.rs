use serde::{Deserialize, Serialize};

/// Payload of the token reissue endpoint. The server may rotate only one of
/// the two tokens, so both are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SocialLoginRequest<'a> {
    #[serde(rename = "accessToken")]
    pub provider_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "isNewUser", default)]
    pub is_new_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_allows_partial_rotation() {
        let pair: TokenPair = serde_json::from_str(r#"{"accessToken": "A2"}"#).unwrap();
        assert_eq!(pair.access_token.as_deref(), Some("A2"));
        assert_eq!(pair.refresh_token, None);
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"accessToken": "A1", "refreshToken": "R1", "userId": 42, "isNewUser": true}"#;
        let login: LoginResponse = serde_json::from_str(json).expect("Failed to parse login JSON");
        assert_eq!(login.user_id, 42);
        assert!(login.is_new_user);
    }
}
