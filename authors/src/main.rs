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

//! Entry point to the authors service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use authors::config::Config;
use authors::db::init_schema;
use authors::serve;
use authors_core::db::postgres::PostgresDb;
use authors_core::db::Db;
use log::{error, info};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Reports the outcome of loading the `.env` file, which must happen before the logger is set up
/// so that the file can configure it.  A missing file is not an error.
fn check_dotenv(result: dotenvy::Result<PathBuf>) -> Result<(), String> {
    match result {
        Ok(path) => {
            info!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!("Failed to load .env file: {}", e)),
    }
}

/// Runs the service until it is asked to terminate.
async fn run() -> Result<(), String> {
    let config = Config::from_env("AUTHORS")?;
    info!("Starting with configuration {:?}", config);

    let db = Arc::new(PostgresDb::connect(config.db_opts));
    let result = async {
        init_schema(&mut db.ex().await.map_err(|e| e.to_string())?)
            .await
            .map_err(|e| format!("Failed to initialize schema: {}", e))?;
        serve((Ipv4Addr::UNSPECIFIED, config.port), db.clone()).await.map_err(|e| e.to_string())
    }
    .await;

    db.close().await;
    result
}

#[tokio::main]
async fn main() {
    // Variables already present in the environment take precedence over the ones in the file.
    let dotenv = dotenvy::dotenv();
    env_logger::init();

    if let Err(e) = check_dotenv(dotenv) {
        error!("{}", e);
        process::exit(1);
    }

    if let Err(e) = run().await {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_check_dotenv_loaded() {
        assert_eq!(Ok(()), check_dotenv(Ok(PathBuf::from("/some/.env"))));
    }

    #[test]
    fn test_check_dotenv_missing_file_is_ok() {
        let e = io::Error::new(io::ErrorKind::NotFound, "no such file");
        assert_eq!(Ok(()), check_dotenv(Err(dotenvy::Error::Io(e))));
    }

    #[test]
    fn test_check_dotenv_bad_file() {
        let e = dotenvy::Error::LineParse("FOO BAR".to_owned(), 4);
        let err = check_dotenv(Err(e)).unwrap_err();
        assert!(err.starts_with("Failed to load .env file: "), "Bad error: {}", err);
    }
}
