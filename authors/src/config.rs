// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Service configuration.

use authors_core::db::postgres::PostgresOptions;
use authors_core::env::get_optional_var;

/// Port to listen on when none is configured.
const DEFAULT_PORT: u16 = 8080;

/// Configuration of the service, gathered once at startup.
#[derive(Debug)]
pub struct Config {
    /// Port to listen on.  The server binds to all interfaces.
    pub port: u16,

    /// Options to connect to the PostgreSQL database.
    pub db_opts: PostgresOptions,
}

impl Config {
    /// Initializes the configuration from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use `<prefix>_PORT` for the listening port and `<prefix>_DB_*` for the database
    /// connection.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            db_opts: PostgresOptions::from_env(&format!("{}_DB", prefix))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Environment for a complete set of required options under the `AUTHORS` prefix.
    const REQUIRED_VARS: [(&str, Option<&str>); 5] = [
        ("AUTHORS_DB_HOST", Some("the-host")),
        ("AUTHORS_DB_PORT", Some("5432")),
        ("AUTHORS_DB_DATABASE", Some("the-database")),
        ("AUTHORS_DB_USERNAME", Some("the-username")),
        ("AUTHORS_DB_PASSWORD", Some("the-password")),
    ];

    #[test]
    fn test_config_from_env_defaults() {
        let mut vars = REQUIRED_VARS.to_vec();
        vars.push(("AUTHORS_PORT", None));
        vars.push(("AUTHORS_DB_MIN_CONNECTIONS", None));
        vars.push(("AUTHORS_DB_MAX_CONNECTIONS", None));
        temp_env::with_vars(vars, || {
            let config = Config::from_env("AUTHORS").unwrap();
            assert_eq!(DEFAULT_PORT, config.port);
            assert_eq!("the-host", config.db_opts.host);
            assert_eq!(5432, config.db_opts.port);
            assert_eq!("the-database", config.db_opts.database);
            assert_eq!("the-username", config.db_opts.username);
            assert_eq!("the-password", config.db_opts.password);
            assert_eq!(None, config.db_opts.min_connections);
            assert_eq!(None, config.db_opts.max_connections);
        });
    }

    #[test]
    fn test_config_from_env_all_present() {
        let mut vars = REQUIRED_VARS.to_vec();
        vars.push(("AUTHORS_PORT", Some("1234")));
        vars.push(("AUTHORS_DB_MIN_CONNECTIONS", Some("2")));
        vars.push(("AUTHORS_DB_MAX_CONNECTIONS", Some("8")));
        temp_env::with_vars(vars, || {
            let config = Config::from_env("AUTHORS").unwrap();
            assert_eq!(1234, config.port);
            assert_eq!(Some(2), config.db_opts.min_connections);
            assert_eq!(Some(8), config.db_opts.max_connections);
        });
    }

    #[test]
    fn test_config_from_env_bad_port() {
        let mut vars = REQUIRED_VARS.to_vec();
        vars.push(("AUTHORS_PORT", Some("80000")));
        temp_env::with_vars(vars, || {
            let err = Config::from_env("AUTHORS").unwrap_err();
            assert!(err.contains("AUTHORS_PORT"), "Unexpected error: {}", err);
        });
    }

    #[test]
    fn test_config_from_env_missing_db() {
        let mut vars = REQUIRED_VARS.to_vec();
        vars[0] = ("AUTHORS_DB_HOST", None);
        temp_env::with_vars(vars, || {
            let err = Config::from_env("AUTHORS").unwrap_err();
            assert!(err.contains("AUTHORS_DB_HOST not present"), "Unexpected error: {}", err);
        });
    }

    #[test]
    fn test_config_debug_hides_password() {
        temp_env::with_vars(REQUIRED_VARS, || {
            let config = Config::from_env("AUTHORS").unwrap();
            assert!(!format!("{:?}", config).contains("the-password"));
        });
    }
}
