use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::Services;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    services: Services,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, services: Services) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, services }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn services(&self) -> &Services {
        &self.inner.services
    }
}
