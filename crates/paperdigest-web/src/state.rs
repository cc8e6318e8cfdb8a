use std::sync::Arc;

use paperdigest_core::{PdfBackend, Settings};
use paperdigest_portal::PortalClient;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub settings: Settings,
    pub client: PortalClient,
    pub backend: Arc<dyn PdfBackend>,
}

impl AppState {
    pub fn new(settings: Settings, backend: Arc<dyn PdfBackend>) -> Result<Self, paperdigest_portal::PortalError> {
        let client = PortalClient::new((&settings).into())?;
        Ok(Self {
            settings,
            client,
            backend,
        })
    }
}
