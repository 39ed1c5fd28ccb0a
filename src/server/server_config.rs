// General imports
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to serve the application on
    #[arg(long, env = "ADDRESS", default_value = "127.0.0.1:6000")]
    pub address: String,

    /// Directory where uploaded PDFs are written; created at startup
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: String,

    /// Origins allowed to call the JSON endpoints, comma separated
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        default_value = "http://localhost:5173",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// Credential for the Gemini API
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Model submitted to the Gemini API
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Base URL of the Gemini API
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_base_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::parse_from(["docchat-server"]);
        assert_eq!(config.address, "127.0.0.1:6000");
        assert_eq!(config.upload_dir, "uploads");
        assert_eq!(config.allowed_origins, ["http://localhost:5173"]);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_server_config_origin_list() {
        let config = ServerConfig::parse_from([
            "docchat-server",
            "--allowed-origins",
            "http://localhost:5173,https://docchat.example.com",
        ]);
        assert_eq!(
            config.allowed_origins,
            ["http://localhost:5173", "https://docchat.example.com"]
        );
    }
}
