use crate::shared::RUN_ID_ENV_VAR;
use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[clap(group = ArgGroup::new("config"))]
pub struct ConfigOptions {
    /// Override the working directory. Relative paths and producer commands are
    /// resolved from here.
    #[arg(long, short = 'C', global(true))]
    working_dir: Option<String>,

    /// When outputting logs, the run-id is the unique value that will define where these go.
    /// In the case that the run-id is re-used, the old values will be overwritten.
    #[arg(long, global(true), env = RUN_ID_ENV_VAR)]
    run_id: Option<String>,
}

impl ConfigOptions {
    pub fn generate_run_id() -> String {
        let id = nanoid::nanoid!(4, &nanoid::alphabet::SAFE);
        let now = chrono::Local::now();
        let current_time = now.format("%Y%m%d");
        format!("{}-{}", current_time, id)
    }

    pub fn get_run_id(&self) -> String {
        self.run_id.clone().unwrap_or_else(Self::generate_run_id)
    }

    pub fn working_dir(&self) -> Result<PathBuf> {
        match (std::env::current_dir(), &self.working_dir) {
            (_, Some(dir)) => Ok(PathBuf::from(dir)),
            (Ok(cwd), None) => Ok(cwd),
            (Err(e), None) => {
                error!(target: "user", "Unable to get a working dir");
                Err(anyhow!("Unable to get a working dir. {}", e))
            }
        }
    }
}
