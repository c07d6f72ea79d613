use anyhow::Context;
use sprout::domain::config::ApiConfig;
use sprout::kernel::config::load_config;
use sprout_logger::Logger;
use sprout_server::Server;

#[sprout_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder().name(env!("CARGO_PKG_NAME")).init()?;

    let cfg: ApiConfig = load_config(Some("server")).context("Configuration is malformed")?;

    Server::builder().config(cfg).build().await?.run().await
}
