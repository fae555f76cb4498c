use anyhow::Context;
use serde::Deserialize;

/// Runtime configuration for the demo server binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the server listens on.
    pub port: u16,
    /// Base URL relayed by the `/proxy` handler.
    pub upstream: String,
    /// File served by the `/video` handler.
    pub video_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            upstream: "http://httpbin.org".to_string(),
            video_path: "assets/sample.mp4".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the YAML file named by `WIRELINE_CONFIG`,
    /// falling back to defaults when the variable is unset. A `PORT`
    /// environment variable overrides the configured port either way.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("WIRELINE_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("parsing config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        if let Ok(port) = std::env::var("PORT") {
            cfg.port = port.parse().context("PORT must be a port number")?;
        }
        Ok(cfg)
    }
}
