use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate expected by the speech backend (16kHz)
    pub sample_rate: u32,
    /// Samples per outbound frame
    pub frame_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    /// WebSocket path on the backend host
    pub path: String,
    /// Use the encrypted scheme (wss) for the channel
    pub tls: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
