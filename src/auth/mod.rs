/// Authentication module
///
/// Credential storage, JWT issuing/validation, and revoked token bookkeeping.

mod claims;
mod credentials;
mod jwt;
mod lifecycle;
mod password;
mod revocation;

pub use claims::{Claims, TokenType};
pub use credentials::{authenticate, register_user};
pub use jwt::{
    decode_token, decode_token_of_type, encode_claims, generate_access_token,
    generate_refresh_token, issue_pair, TokenPair,
};
pub use lifecycle::{authorize_access, refresh, validate_token};
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
pub use revocation::{check_revoked, prune_expired, revoke};
