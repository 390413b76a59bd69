use dashboard_core::{Config, WeatherClient};

use super::{print_json, CmdResult};

/// Current conditions for the configured location.
pub async fn run() -> CmdResult {
    let config = Config::load()?;
    let client = WeatherClient::new(config.weather.base_url.clone(), config.remote.timeout())?;
    let report = client.current(&config.weather.location()).await?;
    print_json(&report)?;
    Ok(())
}
