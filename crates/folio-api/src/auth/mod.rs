//! Authentication and authorization
//!
//! - `password`: Argon2id hashing and verification
//! - `jwt`: access and refresh token issuing and validation
//! - `service`: register, login, refresh, logout over the identity stores
//! - `middleware`: the bearer token gate for content writes

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{JwtConfig, TokenError, TokenIssuer};
pub use middleware::{auth_gate, AuthenticatedUser, GateError};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthError, AuthService, LoginOutcome};
