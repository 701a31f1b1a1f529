pub mod auth;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_identity_provider, AuthError, AuthRequest, Identity, IdentityProvider,
    NoneIdentityProvider, PasswordIdentityProvider, Role, Session,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    LogFormat, SanitizedConfig,
};
pub use notify::{
    create_notification_system, Notification, NotificationHandle, NotificationWriter, Notifier,
    Severity, TracingNotifier,
};
pub use ticket::{
    NewTicket, SqliteTicketStore, StatusTab, Ticket, TicketError, TicketPatch, TicketService,
    TicketStatus, TicketStore,
};
