/// Server services
pub mod auth;
pub mod leads;
pub mod notifier;

pub use auth::AuthService;
pub use leads::LeadService;
pub use notifier::{DisabledNotifier, Notifier, NotifierError, SmtpNotifier};
