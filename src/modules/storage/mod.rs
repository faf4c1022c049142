mod photo_store;

pub use photo_store::{PhotoStore, StoredPhoto};
