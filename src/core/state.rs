use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::assessment::AssessmentService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    assessment: AssessmentService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        let assessment = AssessmentService::new(db.clone());
        Self { inner: Arc::new(InnerState { settings, db, assessment }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn assessment(&self) -> &AssessmentService {
        &self.inner.assessment
    }
}
