use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub tidepool: TidepoolConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under /static (css, js, images for the form page).
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_static_dir() -> String {
    "static".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TidepoolConfig {
    /// API root, e.g. https://int-api.tidepool.org (no trailing slash needed).
    pub base_url: String,
    /// Bounded timeout applied to both the login and the data call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_value_header")]
    pub value_header: String,
}

fn default_title() -> String {
    "Glucose Values".into()
}

fn default_value_header() -> String {
    "Glucose value".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            value_header: default_value_header(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        let base = self.tidepool.base_url.trim();
        anyhow::ensure!(
            base.starts_with("http://") || base.starts_with("https://"),
            "tidepool.base_url must be an http(s) URL, got {:?}",
            self.tidepool.base_url
        );
        anyhow::ensure!(
            self.tidepool.timeout_secs > 0,
            "tidepool.timeout_secs must be > 0, got {}",
            self.tidepool.timeout_secs
        );
        anyhow::ensure!(
            !self.report.title.trim().is_empty(),
            "report.title must be non-empty"
        );
        anyhow::ensure!(
            !self.report.value_header.trim().is_empty(),
            "report.value_header must be non-empty"
        );
        Ok(())
    }
}
