//! Backend Pool Module
//!
//! Manages the ordered list of Gemini API keys and the shared cursor that
//! selects which key the next outbound call uses.
//!
//! # Example
//! ```ignore
//! use backend_pool::CredentialPool;
//!
//! let pool = CredentialPool::from_keys(["key-a", "key-b"]);
//! let cred = pool.current()?;
//! println!("Using credential: {}", cred.name());
//! pool.rotate();
//! ```

mod credential;
mod pool;

pub use credential::ApiKeyCredential;
pub use pool::{CredentialPool, PoolError, PoolStats};
