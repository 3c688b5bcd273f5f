use std::sync::Arc;

use wolfstreet_core::Store;
use wolfstreet_core::config::AppConfig;
use wolfstreet_provider_outlook::OutlookService;

use crate::ingest::IngestClient;
use crate::mailer::Mailer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Store>,
    pub outlook: Arc<OutlookService>,
    pub ingest: IngestClient,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<Store>, outlook: OutlookService) -> Self {
        let http = reqwest::Client::new();

        AppState {
            ingest: IngestClient::new(http.clone(), config.ingest.clone()),
            mailer: Mailer::new(http, config.mail.clone()),
            config,
            store,
            outlook: Arc::new(outlook),
        }
    }
}
