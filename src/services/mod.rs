pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthSuccess, RegisterInput, Role, UserDto};

pub mod auth_service_impl;
pub use auth_service_impl::{SeaOrmAuthService, seed_admin};

pub mod password;

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};
