//! Static descriptors for persisted records: tables, columns, relations and enum types.
//! Stores build their queries from these; the resource controller never reads them.

mod record;
mod table;

pub use record::Record;
pub use table::*;
