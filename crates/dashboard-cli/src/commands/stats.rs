use dashboard_core::Config;

use super::{print_json, remote_client, CmdResult};

/// Session statistics are only kept by the server.
pub async fn run() -> CmdResult {
    let config = Config::load()?;
    let stats = remote_client(&config)?.stats().await?;
    print_json(&stats)?;
    Ok(())
}
