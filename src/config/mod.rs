use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub sheets: SheetConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Path of the JSON sheet document the server binary opens.
    pub data_path: Option<String>,
    /// Sheets excluded from the catch-all route. `apiusers` is treated as
    /// protected on top of whatever this list contains.
    pub protected: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// The page parameter is historically clamped with `min(page - 1, 0)`,
    /// which collapses every page above 1 back to the first. Turning this on
    /// uses the non-negative clamp instead.
    pub corrected_paging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SHEETGATE_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SHEETGATE_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }
        if let Ok(v) = env::var("SHEETGATE_DATA") {
            self.sheets.data_path = Some(v);
        }
        if let Ok(v) = env::var("SHEETGATE_PROTECTED_SHEETS") {
            self.sheets.protected = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SHEETGATE_DEFAULT_LIMIT") {
            self.api.default_limit = v.parse().unwrap_or(self.api.default_limit);
        }
        if let Ok(v) = env::var("SHEETGATE_MAX_LIMIT") {
            self.api.max_limit = v.parse().unwrap_or(self.api.max_limit);
        }
        if let Ok(v) = env::var("SHEETGATE_CORRECTED_PAGING") {
            self.api.corrected_paging = v.parse().unwrap_or(self.api.corrected_paging);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
            },
            sheets: SheetConfig {
                data_path: None,
                protected: vec!["users".to_string(), "roles".to_string()],
            },
            api: ApiConfig {
                default_limit: 10,
                max_limit: 250,
                corrected_paging: false,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                // Deployments front the API with their own CORS policy
                enable_cors: false,
            },
            sheets: SheetConfig {
                data_path: None,
                protected: vec!["users".to_string(), "roles".to_string()],
            },
            api: ApiConfig {
                default_limit: 10,
                max_limit: 250,
                corrected_paging: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
