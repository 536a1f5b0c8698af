use crate::storage::Storage;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    pub fn new(storage: Storage, tracker: Tracker) -> Self {
        Self {
            storage: Arc::new(storage),
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
