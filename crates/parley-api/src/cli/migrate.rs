//! `parley migrate` - apply pending schema migrations and exit.

use std::path::Path;

use parley_types::config::AppConfig;

use crate::state::open_database;

pub async fn run(config: &AppConfig, data_dir: &Path, quiet: bool) -> anyhow::Result<()> {
    let pool = open_database(config, data_dir).await?;
    pool.close().await;

    if !quiet {
        println!(
            "  {} Database is up to date",
            console::style("✓").green().bold()
        );
    }
    Ok(())
}
