use std::sync::Arc;

use crate::services::calendar::CalendarClient;
use crate::services::correlation::CorrelationStore;
use crate::services::date_parser::DateResolver;
use crate::services::session_store::SessionStore;

/// Collaborators shared by every handler, injected into the dispatcher tree.
#[derive(Clone)]
pub struct AppContext {
    pub sessions: SessionStore,
    pub correlations: CorrelationStore,
    pub resolver: Arc<dyn DateResolver>,
    pub calendar: Arc<dyn CalendarClient>,
    /// Timezone the date parser interprets user text in.
    pub timezone: String,
}
