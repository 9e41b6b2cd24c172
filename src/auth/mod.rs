//! Authentication system
//!
//! Handles user records, signup validation, credential checks and the
//! single active session.

pub mod credentials;
pub mod display;
pub mod model;
pub mod store;
pub mod validator;

pub use credentials::PasswordScheme;
pub use display::{ProfileView, format_date, format_display_date, initials};
pub use model::{Gender, SignupDraft, UserRecord, format_timestamp};
pub use store::{CredentialStore, SharedClock};
pub use validator::{Field, ValidationErrors, validate_signin, validate_signup};
