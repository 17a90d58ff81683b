// Security module - rate limiting, JWT infrastructure, response hardening
pub mod auth;
pub mod middleware;
pub mod rate_limiter;

pub use auth::{JwtVerifier, SecurityConfig};
pub use middleware::{client_address, rate_limit_layer, security_headers};
pub use rate_limiter::{RateDecision, RateLimit, RateLimitAlgorithm, RateLimiter};
