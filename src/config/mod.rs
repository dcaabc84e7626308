use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Redis connection string for the job queue and job registry
    pub redis_url: String,

    /// Directory for raw uploaded images
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Directory for processed output images
    #[serde(default = "default_processed_dir")]
    pub processed_dir: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_processed_dir() -> String {
    "processed".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
