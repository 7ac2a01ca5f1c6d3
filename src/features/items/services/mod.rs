mod item_service;

pub use item_service::{ensure_access, ItemService};
