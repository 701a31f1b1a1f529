use std::sync::Arc;

use chamados_core::{Config, IdentityProvider, Notifier, SanitizedConfig, TicketService};

/// Shared application state
pub struct AppState {
    config: Config,
    identity: Arc<dyn IdentityProvider>,
    tickets: TicketService,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        tickets: TicketService,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            identity,
            tickets,
            notifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}
