//! Client configuration pointed at a mock server

use gembridge_config::GeminiConfig;
use secrecy::SecretString;
use url::Url;

/// API-key configuration for a mock server base URL
pub fn api_key_config(base_url: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: Some(SecretString::from("test-key".to_owned())),
        access_token: None,
        project_id: None,
        base_url: Some(Url::parse(base_url).expect("mock base URL must parse")),
        model: "gemini-2.5-flash".to_owned(),
        temperature: None,
        max_output_tokens: None,
        thinking: None,
        pricing: None,
    }
}

/// Bearer-token configuration billed to `project`
pub fn access_token_config(base_url: &str, project: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: None,
        access_token: Some(SecretString::from("ya29.test-token".to_owned())),
        project_id: Some(project.to_owned()),
        ..api_key_config(base_url)
    }
}
