//! Main configuration loaded from a YAML or TOML file.
//!
//! ```yaml
//! tmpfolder: ./tmp
//! timezone: America/Guatemala
//! dbs:
//!   reporting:
//!     username: app
//!     password: secret
//!     database: reports
//!     host: db.internal
//!     driver: mysql
//!     port: 3306
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_error_at, RepoError, RepoResult};

/// Settings for one named database connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    name: String,
    username: String,
    password: String,
    host: String,
    database: String,
    driver: String,
    port: String,
}

impl Connection {
    /// The key this connection is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Database (schema) name.
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Port as written in the file; numbers are kept in decimal form.
    pub fn port(&self) -> &str {
        &self.port
    }
}

/// Top-level configuration.
///
/// Every key is required. Call [`MainConfiguration::load`] to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainConfiguration {
    tmp_folder: String,
    tmp_dir: PathBuf,
    timezone: String,
    connections: BTreeMap<String, Connection>,
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    tmpfolder: String,
    timezone: String,
    dbs: BTreeMap<String, RawConnection>,
}

#[derive(Debug, Deserialize)]
struct RawConnection {
    username: String,
    password: String,
    database: String,
    port: PortValue,
    host: String,
    driver: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Text(String),
    Number(u64),
}

impl PortValue {
    fn into_string(self) -> String {
        match self {
            PortValue::Text(s) => s,
            PortValue::Number(n) => n.to_string(),
        }
    }
}

impl MainConfiguration {
    /// Loads the configuration at `path`, resolving `tmpfolder` against the
    /// current working directory.
    ///
    /// # Errors
    ///
    /// See [`MainConfiguration::load_with_base`].
    pub fn load(path: &Path) -> RepoResult<Self> {
        let base = std::env::current_dir()?;
        Self::load_with_base(path, &base)
    }

    /// Loads the configuration at `path`, resolving `tmpfolder` against `base_dir`.
    ///
    /// Files ending in `.toml` are read as TOML, anything else as YAML.
    ///
    /// # Errors
    ///
    /// - [`RepoError::FileNotFound`] if the file does not exist.
    /// - [`RepoError::PermissionDenied`] if the file is not readable.
    /// - [`RepoError::InvalidConfiguration`] if it is malformed or a required key is missing.
    /// - [`RepoError::DirectoryNotFound`] if the temporary folder does not exist.
    pub fn load_with_base(path: &Path, base_dir: &Path) -> RepoResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| io_error_at(e, path))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let raw: RawConfiguration = if is_toml {
            toml::from_str(&content).map_err(|e| RepoError::InvalidConfiguration(e.to_string()))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| RepoError::InvalidConfiguration(e.to_string()))?
        };

        let tmp_dir = base_dir.join(&raw.tmpfolder);
        if !tmp_dir.is_dir() {
            return Err(RepoError::DirectoryNotFound(tmp_dir));
        }

        let connections = raw
            .dbs
            .into_iter()
            .map(|(name, c)| {
                let connection = Connection {
                    name: name.clone(),
                    username: c.username,
                    password: c.password,
                    host: c.host,
                    database: c.database,
                    driver: c.driver,
                    port: c.port.into_string(),
                };
                (name, connection)
            })
            .collect();

        tracing::debug!("loaded configuration from {}", path.display());
        Ok(Self {
            tmp_folder: raw.tmpfolder,
            tmp_dir,
            timezone: raw.timezone,
            connections,
        })
    }

    /// Returns the connection registered under `name`.
    ///
    /// # Errors
    ///
    /// [`RepoError::ConnectionNotFound`] if there is none.
    pub fn connection(&self, name: &str) -> RepoResult<Connection> {
        self.connections
            .get(name)
            .cloned()
            .ok_or_else(|| RepoError::ConnectionNotFound(name.to_string()))
    }

    /// Names of all configured connections, sorted.
    pub fn connection_names(&self) -> Vec<&str> {
        self.connections.keys().map(String::as_str).collect()
    }

    /// The temporary folder exactly as written in the file.
    pub fn tmp_folder(&self) -> &str {
        &self.tmp_folder
    }

    /// The temporary folder resolved against the base directory.
    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// IANA time zone name, e.g. `America/Guatemala`.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}
