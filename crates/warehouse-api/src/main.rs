use warehouse_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Database, optional startup imports, routes
    let (_state, router) = warehouse_api::setup::initialize_app(config.clone()).await?;

    warehouse_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
