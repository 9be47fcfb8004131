pub mod db;
#[cfg(test)]
pub mod memory;

pub use db::Database;

/// Result of an insert guarded by a unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}
