//! Domain types and wire bodies

mod ids;
mod lead;
mod user;
mod wire;

pub use ids::{LeadId, UserId};
pub use lead::{Lead, LeadSubmission, NewLead, MISSING_REQUIRED_FIELDS};
pub use user::{normalize_email, NewUser, UserProfile};
pub use wire::{
    AuthResponse, EmailRequest, LeadCreatedResponse, LoginRequest, MessageResponse,
    RegisterRequest,
};
