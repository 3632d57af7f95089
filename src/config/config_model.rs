#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub paystack: Paystack,
    pub media_store: MediaStore,
    pub upload_worker: UploadWorker,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Paystack {
    pub base_url: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct UploadWorker {
    pub concurrency: usize,
    pub poll_interval_secs: u64,
    pub lease_secs: u64,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
    pub ttl_secs: i64,
}
