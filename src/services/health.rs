// Health check service implementation

use uuid::Uuid;

use crate::handlers::AppState;

pub struct HealthChecker<'a> {
    state: &'a AppState,
}

impl<'a> HealthChecker<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// True when the store answers a trivial lookup
    pub async fn check(&self) -> bool {
        match self.state.store.get_investor(Uuid::nil()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                false
            }
        }
    }
}
