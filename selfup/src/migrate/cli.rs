use super::migrate_file;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Files to rewrite from the beta directive schema into v1
    #[arg(required = true)]
    paths: Vec<String>,
}

pub async fn migrate_root(working_dir: PathBuf, args: &MigrateArgs) -> Result<i32> {
    for path in &args.paths {
        if migrate_file(&working_dir.join(path)).await? {
            info!(target: "always", "{}: migrated schema beta -> v1", path);
        }
    }

    Ok(0)
}
