//! Items with an optional image or video attachment.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/v1/items` | Yes | List items (own, or all for superusers) |
//! | POST | `/api/v1/items` | Yes | Create item |
//! | GET | `/api/v1/items/{id}` | Yes | Get item |
//! | PUT | `/api/v1/items/{id}` | Yes | Partially update item |
//! | DELETE | `/api/v1/items/{id}` | Yes | Delete item and its stored media |
//! | POST | `/api/v1/items/upload-media` | Yes | Upload media, returns provider result |
//! | POST | `/api/v1/items/{id}/media` | Yes | Upload media and attach it to the item |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ItemService;
