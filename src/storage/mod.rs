mod expiry;
mod store;

pub use store::{Entry, Store};
