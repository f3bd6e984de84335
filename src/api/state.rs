use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::reconciler::Reconciler;

/// Shared application state
///
/// The reconciler sits behind one lock; mutating actions hold the write
/// guard across their remote calls, so local state only ever changes
/// after the remote outcome is known and two actions cannot interleave.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<RwLock<Reconciler>>,
}

impl AppState {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Arc::new(RwLock::new(reconciler)),
        }
    }
}
