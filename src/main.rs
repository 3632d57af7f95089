use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::{error, info};

use pixelpay::{
    application::{
        interfaces::storage::StorageClient,
        usecases::upload_worker::{UploadWorkerSettings, run_upload_worker_loop},
    },
    config::config_loader,
    domain::repositories::{images::ImageRepository, upload_jobs::UploadJobRepository},
    infrastructure::{
        axum_http::http_serve,
        paystack::paystack_client::PaystackClient,
        postgres::{
            postgres_connection,
            repositories::{images::ImagePostgres, upload_jobs::UploadJobPostgres},
        },
        storage::media_store::{MediaStoreClient, MediaStoreConfig},
    },
    observability,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("pixelpay exited with error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("pixelpay")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool = Arc::new(postgres_pool);

    let paystack = Arc::new(PaystackClient::new(
        dotenvy_env.paystack.base_url.clone(),
        dotenvy_env.paystack.secret_key.clone(),
        Duration::from_secs(dotenvy_env.server.timeout),
    )?);

    let storage_client: Arc<dyn StorageClient + Send + Sync> =
        Arc::new(MediaStoreClient::new(&MediaStoreConfig {
            base_url: dotenvy_env.media_store.base_url.clone(),
            api_key: dotenvy_env.media_store.api_key.clone(),
            timeout_secs: dotenvy_env.media_store.timeout_secs,
        })?);

    let job_repository: Arc<dyn UploadJobRepository + Send + Sync> =
        Arc::new(UploadJobPostgres::new(Arc::clone(&db_pool)));
    let image_repository: Arc<dyn ImageRepository + Send + Sync> =
        Arc::new(ImagePostgres::new(Arc::clone(&db_pool)));

    let mut worker_handles = Vec::new();
    for index in 0..dotenvy_env.upload_worker.concurrency {
        let settings = UploadWorkerSettings {
            worker_id: format!("upload-worker-{index}"),
            poll_interval: Duration::from_secs(dotenvy_env.upload_worker.poll_interval_secs),
            lease: Duration::from_secs(dotenvy_env.upload_worker.lease_secs),
        };
        worker_handles.push(tokio::spawn(run_upload_worker_loop(
            Arc::clone(&job_repository),
            Arc::clone(&image_repository),
            Arc::clone(&storage_client),
            settings,
        )));
    }

    let server_config = Arc::clone(&dotenvy_env);
    let server_pool = Arc::clone(&db_pool);
    let server_paystack = Arc::clone(&paystack);
    let http_server =
        tokio::spawn(
            async move { http_serve::start(server_config, server_pool, server_paystack).await },
        );

    tokio::select! {
        result = http_server => result??,
        result = async {
            for handle in worker_handles {
                handle.await??;
            }
            Ok::<(), anyhow::Error>(())
        } => result?,
    };

    Ok(())
}
