pub mod config;
pub mod links;
pub mod notes;
pub mod stats;
pub mod tasks;
pub mod timer;
pub mod weather;

use dashboard_core::{Config, KvStore, RemoteClient, Resource, ResourceStore, StorageMode};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn remote_client(config: &Config) -> Result<RemoteClient, dashboard_core::RemoteError> {
    RemoteClient::new(config.remote.base_url.clone(), config.remote.timeout())
}

/// A loaded store for one resource kind, backed by the configured API and
/// the on-device key-value file.
pub async fn open_store<R: Resource>(
) -> Result<ResourceStore<R, RemoteClient, KvStore>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut store = ResourceStore::new(remote_client(&config)?, KvStore::open()?);
    store.load().await?;
    Ok(store)
}

#[derive(Serialize)]
pub struct Listing<'a, R> {
    pub mode: StorageMode,
    pub records: &'a [R],
}

pub fn print_listing<R: Resource>(
    store: &ResourceStore<R, RemoteClient, KvStore>,
) -> Result<(), serde_json::Error> {
    print_json(&Listing {
        mode: store.mode(),
        records: store.records(),
    })
}
