//! Authentication and access control for Agora.
//!
//! Password hashing, registration and login, bearer token handling, and the
//! role/ownership checks used by the topic and post services.

mod identity;
mod password;
pub mod permission;
mod registration;
mod token;

pub use identity::{authenticate, authenticate_optional, AuthError, Principal};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use permission::{
    can_mutate, ensure_can_mutate, require_role, require_staff, Authored, STAFF_ROLES,
};
pub use registration::{
    login, register, register_with_role, LoginError, RegistrationError, RegistrationRequest,
};
pub use token::{Claims, TokenError, TokenService};
