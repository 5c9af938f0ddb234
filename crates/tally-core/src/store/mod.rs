//! Record and receipt storage.
//!
//! - **repository**: `Repository` trait over JSON documents, with query types
//! - **memory**: In-process `Repository`
//! - **categories**: Default category seeding
//! - **blob**: `BlobStore` trait and the local filesystem store
//! - **receipts**: Receipt upload/list/delete on top of a blob store

pub mod blob;
pub mod categories;
pub mod memory;
pub mod receipts;
pub mod repository;

pub use blob::{BlobStore, LocalBlobStore};
pub use categories::{initialize_default_categories, CATEGORIES};
pub use memory::{generate_id, MemoryRepository};
pub use receipts::{thumbnail_path, user_receipts_path, ReceiptMetadata, ReceiptStorage};
pub use repository::{
    create_typed, from_record, get_typed, query_typed, to_record, user_records, Filter, FilterOp,
    QueryOptions, Record, Repository, SortDirection,
};
