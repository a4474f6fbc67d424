use firestore_bootstrap::{Bootstrapper, Config, service::FileCredential};
use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

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

    info!(
        credential_path = %cfg.credential_path.display(),
        app = %cfg.app_name,
        database_id = %cfg.database_id,
        emulator = %cfg.emulator_host.as_deref().unwrap_or("<none>"),
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>")
    );

    let client = Bootstrapper::new(FileCredential::new(&cfg.credential_path))
        .app_name(cfg.app_name.clone())
        .options(cfg.client_options())
        .initialize()
        .await;

    match client {
        Ok(client) => {
            info!(
                project_id = %client.project_id(),
                database = %client.database_path(),
                "client ready"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Firestore initialization failed");
            ExitCode::FAILURE
        }
    }
}
