use anyhow::Result;

use super::config_model::{
    Database, DotEnvyConfig, JwtSecret, MediaStore, Paystack, Server, UploadWorker,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let paystack = Paystack {
        base_url: std::env::var("PAYSTACK_BASEURL")
            .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
        secret_key: std::env::var("PAYSTACK_SECRET_KEY").expect("PAYSTACK_SECRET_KEY is invalid"),
    };

    let media_store = MediaStore {
        base_url: std::env::var("MEDIA_STORE_BASEURL").expect("MEDIA_STORE_BASEURL is invalid"),
        api_key: std::env::var("MEDIA_STORE_API_KEY").expect("MEDIA_STORE_API_KEY is invalid"),
        timeout_secs: std::env::var("MEDIA_STORE_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?,
    };

    let upload_worker = UploadWorker {
        concurrency: std::env::var("UPLOAD_WORKER_CONCURRENCY")
            .unwrap_or_else(|_| "2".to_string())
            .parse()?,
        poll_interval_secs: std::env::var("UPLOAD_WORKER_POLL_INTERVAL")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?,
        lease_secs: std::env::var("UPLOAD_WORKER_LEASE")
            .unwrap_or_else(|_| "60".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        paystack,
        media_store,
        upload_worker,
    })
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
        ttl_secs: std::env::var("JWT_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()?,
    })
}
