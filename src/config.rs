use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Optional directory with a built player UI, served as fallback.
    pub ui_dir: Option<String>,
    pub cors_permissive: bool,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Initial courses root. Can be switched at runtime via the config API.
    pub root: String,
    pub excludes: Vec<String>,
    pub follow_symlinks: bool,
    pub max_depth: Option<u32>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub durations_file: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    pub cache: CacheConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: kursbrowser.toml (in CWD)
        .add_source(::config::File::with_name("kursbrowser").required(false));

    if let Ok(custom_path) = std::env::var("KURSBROWSER_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("KURSBROWSER").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.max_body_bytes == 0 {
        return Err(anyhow::anyhow!("server.max_body_bytes must be > 0"));
    }

    // Library
    if cfg.library.root.trim().is_empty() {
        return Err(anyhow::anyhow!("library.root must not be empty"));
    }
    if let Some(c) = cfg.library.concurrency {
        if c == 0 || c > 256 {
            return Err(anyhow::anyhow!("library.concurrency must be in 1..=256"));
        }
    }
    if let Some(d) = cfg.library.max_depth {
        if d > 256 {
            return Err(anyhow::anyhow!("library.max_depth must be <= 256"));
        }
    }
    crate::indexer::build_globset(&cfg.library.excludes)
        .map_err(|e| anyhow::anyhow!("invalid library.excludes: {}", e))?;

    // Cache
    if cfg.cache.durations_file.trim().is_empty() {
        return Err(anyhow::anyhow!("cache.durations_file must not be empty"));
    }

    Ok(())
}

/// Creates the parent directory of the durations file if it does not exist yet.
pub fn ensure_parent_dir(file: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
