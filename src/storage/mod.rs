// storage/mod.rs
// Database operations module

pub mod batch;
pub mod fields;
pub mod lookup;
pub mod pool;
pub mod schema;
pub mod test_helpers;

// Re-export commonly used items
pub use batch::{count_rows, delete_by_geoname_ids, existing_geoname_ids, write_batch, BatchRows};
pub use fields::{Fields, Value};
pub use lookup::{load_continent_ids, load_country_ids, load_division_ids};
pub use pool::init_db_pool_with_path;
pub use schema::{ensure_schema, table_exists};
