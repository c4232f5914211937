//! The consuming side: a thin typed HTTP client plus the session context the
//! view layer drives. No view state lives anywhere else; the context is
//! passed by reference to whatever renders it.

pub mod http;
pub mod session;

pub use http::{ApiClient, ClientError};
pub use session::{FileTokenStore, MemoryTokenStore, SessionContext, TokenStore};
