mod errors;
mod password;
mod token;
mod user_service;

pub use errors::{Result, UserApplicationError};
pub use token::{AccessClaims, decode_access_token, issue_access_token};
pub use user_service::{
    AccessToken, authenticate, ensure_superuser, get_profile, login, register_user,
    update_profile,
};
