//! Token family labels, cached token records, and access token claims.

pub mod claims;
pub mod family;
pub mod record;
