use pulse::service::CacheService;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CacheService,
}

impl AppState {
    pub fn new(service: CacheService) -> Self {
        Self { service }
    }
}
