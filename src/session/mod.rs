pub mod context;
pub mod identity;
pub mod storage;

pub use context::{SessionContext, SESSION_KEY};
pub use identity::{IdentityProvider, MockIdentityProvider, Registration};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
