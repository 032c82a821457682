/// Authentication and authorization utilities
///
/// This module provides everything the API server needs to authenticate and
/// authorize requests:
///
/// - `jwt`: JWT token generation and validation (HS256)
/// - `password`: Argon2id password hashing
/// - `api_key`: API key generation, hashing, and scope matching
/// - `middleware`: AuthContext type and credential validation helpers
/// - `authorization`: Role, ownership, and scope checks

pub mod api_key;
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
