//! Credential hashing, session tokens, the CSRF guard and the request guard
//! that turns a token into an [`AuthenticatedUserId`].

pub mod cookie;
pub mod csrf;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

pub use cookie::{CookieSettings, AUTH_COOKIE, CSRF_COOKIE};
pub use csrf::{new_csrf_token, CsrfMiddleware, CSRF_HEADER};
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenError, TokenIssuer};
