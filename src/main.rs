use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snowgate::blob::BlobStore;
use snowgate::config::Config;
use snowgate::db::PortalStorage;
use snowgate::router::{snowgate_router, SnowgateState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let pool = snowgate::db::connect(&cfg.database_url).await?;
    let records = PortalStorage::new(pool);
    records.init_schema().await?;

    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        return match command.as_str() {
            "create-admin" => {
                let (Some(username), Some(password)) = (args.next(), args.next()) else {
                    return Err("usage: snowgate create-admin <username> <password>".into());
                };
                create_admin(&records, &username, &password).await
            }
            other => Err(format!("unknown command {:?}", other).into()),
        };
    }

    let blobs = BlobStore::open(&cfg.upload_dir)?;

    info!(
        bind_addr = %cfg.bind_addr,
        database_url = %cfg.database_url,
        upload_dir = %cfg.upload_dir.display(),
        loglevel = %cfg.loglevel,
        "starting snowgate"
    );

    let state = SnowgateState::new(
        records,
        blobs,
        Arc::from(cfg.device_api_key.as_str()),
        cfg.cookie_key(),
    );
    let app = snowgate_router(state);

    let listener = TcpListener::bind(&cfg.bind_addr).await?;
    info!("HTTP server listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Provision a labeling account from the command line. Accounts are never
/// created over the network.
async fn create_admin(
    records: &PortalStorage,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if records.find_operator(username).await?.is_some() {
        println!("User '{}' already exists.", username);
        return Ok(());
    }
    let hash = snowgate::auth::password::hash_password(password)?;
    records.insert_operator(username, &hash).await?;
    println!("Admin user '{}' created successfully.", username);
    Ok(())
}
