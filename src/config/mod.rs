use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_in;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_faces_dir")]
    pub faces_dir: String,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    #[serde(default = "default_person_name")]
    pub person_name: String,
    #[serde(default = "default_person_role")]
    pub person_role: String,
    /// Seconds without a detection before the subject is declared absent.
    #[serde(default = "default_absence_threshold")]
    pub absence_threshold: f64,
    /// Legacy capture interval. Read and shown, never used for gating.
    #[serde(default = "default_save_interval")]
    pub save_interval: f64,
    #[serde(default = "default_min_frame_bytes")]
    pub min_frame_bytes: usize,
    #[serde(default = "default_image_ext")]
    pub image_ext: String,
    #[serde(default = "default_store_retries")]
    pub store_retries: u32,
}

fn default_faces_dir() -> String {
    Config::config_dir()
        .join("detected_faces")
        .to_string_lossy()
        .to_string()
}
fn default_logs_dir() -> String {
    Config::config_dir()
        .join("attendance_logs")
        .to_string_lossy()
        .to_string()
}
fn default_person_name() -> String {
    "Person 1".to_string()
}
fn default_person_role() -> String {
    crate::models::person::DEFAULT_ROLE.to_string()
}
fn default_absence_threshold() -> f64 {
    5.0
}
fn default_save_interval() -> f64 {
    2.0
}
fn default_min_frame_bytes() -> usize {
    1000
}
fn default_image_ext() -> String {
    "jpg".to_string()
}
fn default_store_retries() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            faces_dir: default_faces_dir(),
            logs_dir: default_logs_dir(),
            person_name: default_person_name(),
            person_role: default_person_role(),
            absence_threshold: default_absence_threshold(),
            save_interval: default_save_interval(),
            min_frame_bytes: default_min_frame_bytes(),
            image_ext: default_image_ext(),
            store_retries: default_store_retries(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rpresence")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rpresence")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rpresence.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rpresence.sqlite")
    }

    /// Load configuration from the standard file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::ConfigLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|e| AppError::ConfigSave(e.to_string()))?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// When the database lives outside the config dir (e.g. `--db` in tests),
    /// keep faces and day logs next to it instead of in the shared home dir.
    pub fn with_database(mut self, db: &str) -> Self {
        let default_dir = Self::config_dir();
        let parent = Path::new(db)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if parent != default_dir {
            let stem = Path::new(db)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "rpresence".to_string());
            if self.faces_dir == default_faces_dir() {
                self.faces_dir = parent
                    .join(format!("{stem}_faces"))
                    .to_string_lossy()
                    .to_string();
            }
            if self.logs_dir == default_logs_dir() {
                self.logs_dir = parent
                    .join(format!("{stem}_logs"))
                    .to_string_lossy()
                    .to_string();
            }
        }
        self.database = db.to_string();
        self
    }

    pub fn faces_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.faces_dir)
    }

    pub fn logs_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.logs_dir)
    }

    /// Report the first invalid value, if any.
    pub fn check(&self) -> AppResult<()> {
        if !(self.absence_threshold.is_finite() && self.absence_threshold > 0.0) {
            return Err(AppError::Config(format!(
                "absence_threshold must be a positive number of seconds (got {})",
                self.absence_threshold
            )));
        }
        if self.save_interval < 0.0 {
            return Err(AppError::Config(format!(
                "save_interval must not be negative (got {})",
                self.save_interval
            )));
        }
        if self.person_name.trim().is_empty() {
            return Err(AppError::Config("person_name must not be empty".into()));
        }
        let ext = self.image_ext.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(AppError::Config(format!(
                "image_ext is not a usable file extension: '{}'",
                self.image_ext
            )));
        }
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database path must not be empty".into()));
        }
        Ok(())
    }

    /// Initialize configuration, data directories and database file.
    /// Returns the effective configuration.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        if !is_test {
            fs::create_dir_all(&dir)?;
        }

        let config = match custom_db {
            Some(name) => {
                let p = resolve_in(&dir, &name);
                Config::default().with_database(&p.to_string_lossy())
            }
            None => Config::default(),
        };

        if !is_test {
            config.save_to(&Self::config_file())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        let db_path = PathBuf::from(&config.database);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }
        fs::create_dir_all(config.faces_path())?;
        fs::create_dir_all(config.logs_path())?;

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
