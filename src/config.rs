use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::warn;

use crate::llm::LlmSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub logs_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    pub groq_temperature: f32,
    pub groq_max_tokens: u32,
    pub groq_timeout_seconds: u64,
    pub upload_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    let value = env_string(name, default);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        PathBuf::from(default)
    } else {
        PathBuf::from(trimmed)
    }
}

fn normalize_temperature(value: f32) -> f32 {
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        warn!("GROQ_TEMPERATURE value {value} is out of range; defaulting to 0.7.");
        return 0.7;
    }
    value
}

fn validate_port(port: u16) -> Result<u16> {
    if port == 0 {
        return Err(anyhow!("PORT must be a non-zero port number"));
    }
    Ok(port)
}

impl Config {
    pub fn load() -> Result<Self> {
        let port = validate_port(env_u16("PORT", 5000))?;

        let groq_api_key = env_string("GROQ_API_KEY", "");
        if groq_api_key.trim().is_empty() {
            warn!("GROQ_API_KEY is not set; styling requests will fail until it is configured.");
        }

        let max_upload_bytes = env_usize("MAX_UPLOAD_BYTES", 10 * 1024 * 1024).max(1);

        let config = Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            logs_dir: env_path("LOGS_DIR", "logs"),
            host: env_string("HOST", "127.0.0.1").trim().to_string(),
            port,
            groq_api_key,
            groq_base_url: env_string("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
            groq_model: env_string("GROQ_MODEL", "llama-3.3-70b-versatile"),
            groq_temperature: normalize_temperature(env_f32("GROQ_TEMPERATURE", 0.7)),
            groq_max_tokens: env_u32("GROQ_MAX_TOKENS", 1200).max(1),
            groq_timeout_seconds: env_u64("GROQ_TIMEOUT_SECONDS", 60).max(1),
            upload_dir: env_path("UPLOAD_DIR", "static/uploads"),
            templates_dir: env_path("TEMPLATES_DIR", "templates"),
            static_dir: env_path("STATIC_DIR", "static"),
            max_upload_bytes,
        };

        config.socket_addr()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|_| anyhow!("Invalid HOST value: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.groq_api_key.clone(),
            base_url: self.groq_base_url.clone(),
            model: self.groq_model.clone(),
            temperature: self.groq_temperature,
            max_tokens: self.groq_max_tokens,
            timeout: Duration::from_secs(self.groq_timeout_seconds),
        }
    }
}

pub const STYLIST_SYSTEM_PROMPT: &str =
    "You are a backend API that only responds in valid JSON format.";

pub const STYLING_PROMPT_TEMPLATE: &str = r#"You are an expert personal fashion stylist.
A {gender} user with a '{skin_tone}' skin tone has asked for styling recommendations for a '{occasion}' occasion.

Provide a JSON-formatted response with the following keys:
- "outfit_description": A detailed, descriptive paragraph of the ideal outfit for this occasion.
- "shopping_terms": A list of 3-4 short, highly searchable e-commerce terms for the main clothing items (e.g., ["emerald green shirt", "brown chinos", "tan loafers"]). Keep these under 4 words each!
- "color_palette": A dictionary with keys "primary", "secondary", and "accent".
- "accessories": A list of 2-3 recommended accessories.
- "hairstyle": A brief hairstyle recommendation.
- "why_it_works": A detailed explanation of why these recommendations work for their skin tone and the occasion.

Return ONLY valid JSON. Do not include introductory text or markdown tags."#;

#[cfg(test)]
pub(crate) fn test_config(base_url: &str, root: &std::path::Path) -> Config {
    Config {
        log_level: "debug".to_string(),
        logs_dir: root.join("logs"),
        host: "127.0.0.1".to_string(),
        port: 5000,
        groq_api_key: "test-key".to_string(),
        groq_base_url: base_url.to_string(),
        groq_model: "llama-3.3-70b-versatile".to_string(),
        groq_temperature: 0.7,
        groq_max_tokens: 1200,
        groq_timeout_seconds: 5,
        upload_dir: root.join("uploads"),
        templates_dir: root.join("templates"),
        static_dir: root.join("static"),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_temperature_falls_back() {
        assert_eq!(normalize_temperature(3.5), 0.7);
        assert_eq!(normalize_temperature(f32::NAN), 0.7);
        assert_eq!(normalize_temperature(1.1), 1.1);
    }

    #[test]
    fn port_zero_is_rejected() {
        let err = validate_port(0).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a non-zero port number");
        assert_eq!(validate_port(5000).unwrap(), 5000);
        assert_eq!(validate_port(u16::MAX).unwrap(), u16::MAX);
    }

    #[test]
    fn socket_addr_rejects_hostnames() {
        let mut config = test_config("http://127.0.0.1:1", std::path::Path::new("."));
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );

        config.host = "not a host".to_string();
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn llm_settings_carry_groq_values() {
        let config = test_config("http://localhost:9999", std::path::Path::new("."));
        let settings = config.llm_settings();
        assert_eq!(settings.base_url, "http://localhost:9999");
        assert_eq!(settings.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.max_tokens, 1200);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }
}
