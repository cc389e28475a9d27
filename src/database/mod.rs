//! SQLite persistence for the synced key-value store.
//!
//! ```no_run
//! use extra_bars::database::Database;
//!
//! let db = Database::open("bars.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
