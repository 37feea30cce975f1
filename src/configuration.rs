use std::{net::SocketAddr, path::PathBuf};

pub const DB_FILE_NAME: &str = "cmscore.sqlite";

#[derive(Clone, Debug)]
pub struct Configuration {
    pub data_dir: String,
    pub log_file: Option<String>,
    pub reset: bool,
    pub api_listen: SocketAddr,
}

impl Configuration {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
            log_file: cli.log_file.clone(),
            reset: cli.reset,
            api_listen: cli.api_listen,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE_NAME)
    }
}
