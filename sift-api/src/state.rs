//! Shared application state

use std::sync::Arc;

use sift_tasks::TaskDispatcher;

use crate::auth::SessionCookie;
use crate::repository::{ProfileRepository, SessionRepository};

/// State handed to every handler
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub dispatcher: TaskDispatcher,
    pub cookies: SessionCookie,
    /// Task name the feedback upload is dispatched to
    pub feedback_task: String,
}
