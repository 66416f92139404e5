pub mod storage;
pub mod credential_store;
pub mod gateway;
pub mod container;

pub use storage::*;
pub use credential_store::CredentialStore;
pub use gateway::*;
pub use container::*;
