//! Environment variable interpolation for configuration

use super::error::ConfigError;
use super::secrets::SecretString;
use regex::Regex;
use std::env;

fn env_var_pattern() -> Regex {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap()
}

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let pattern = env_var_pattern();
    let mut result = content.to_string();

    for cap in pattern.captures_iter(content) {
        let full_match = cap.get(0).unwrap().as_str();
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(ConfigError::EnvVarNotFound {
                    var: var_name.to_string(),
                });
            }
        }
    }

    Ok(result)
}

/// Interpolate environment variables in provider fields after parsing.
/// Catches values that were produced from already-parsed sources, such
/// as the `PROVIDERS_JSON` environment variable.
pub fn interpolate_config_env_vars(
    config: &mut super::schema::GatewayConfig,
) -> Result<(), ConfigError> {
    let pattern = env_var_pattern();

    for provider in &mut config.providers {
        let api_key_str = provider.api_key.expose_secret();
        if pattern.is_match(api_key_str) {
            let interpolated = interpolate_env_vars(api_key_str)?;
            provider.api_key = SecretString::new(interpolated);
        }

        if pattern.is_match(&provider.base_url) {
            provider.base_url = interpolate_env_vars(&provider.base_url)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars() {
        env::set_var("LLMGATE_TEST_VAR", "test_value");

        let content = "api_key: ${LLMGATE_TEST_VAR}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "api_key: test_value");

        env::remove_var("LLMGATE_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let content = "api_key: ${LLMGATE_MISSING_VAR}";
        let result = interpolate_env_vars(content);

        assert!(result.is_err());
        if let Err(ConfigError::EnvVarNotFound { var }) = result {
            assert_eq!(var, "LLMGATE_MISSING_VAR");
        } else {
            panic!("Expected EnvVarNotFound error");
        }
    }

    #[test]
    fn test_multiple_env_vars() {
        env::set_var("LLMGATE_VAR1", "value1");
        env::set_var("LLMGATE_VAR2", "value2");

        let content = "key1: ${LLMGATE_VAR1}, key2: ${LLMGATE_VAR2}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "key1: value1, key2: value2");

        env::remove_var("LLMGATE_VAR1");
        env::remove_var("LLMGATE_VAR2");
    }
}
