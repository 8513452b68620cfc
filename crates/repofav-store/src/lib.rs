// SQLite-backed session state
// Remembers small bits of client state between runs

pub mod store;

pub use store::{SessionStore, StoreError, HAS_DATA_KEY};
