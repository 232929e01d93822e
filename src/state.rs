use crate::stats::CompletionPlaceholder;
use crate::store::DoseStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<DoseStore>>,
    pub placeholder: Arc<dyn CompletionPlaceholder>,
}

impl AppState {
    pub fn new(store: DoseStore, placeholder: Arc<dyn CompletionPlaceholder>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            placeholder,
        }
    }
}
