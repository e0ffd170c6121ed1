pub mod context;
pub mod store;

pub use context::{Route, SessionContext};
pub use store::{FileStorage, LocalStorage, MemoryStorage, SessionStore, SESSION_KEY};
