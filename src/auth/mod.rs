//! Authentication: argon2id password hashing for operator accounts and the
//! private-cookie session layer. Device-key checking lives in
//! `middleware::auth`, next to the request extractors that enforce it.

pub mod password;
pub mod session;
