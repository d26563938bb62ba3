pub mod storage;
pub mod store;

pub use storage::{
    DurableStorage, FileStorage, MemoryStorage, SIGNUP_PAYLOAD_KEY, TOKEN_KEY, USER_KEY,
};
pub use store::{SessionSnapshot, SessionStore};
