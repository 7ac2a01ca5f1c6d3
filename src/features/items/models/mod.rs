mod item;

pub use item::{Item, StoredMedia};
