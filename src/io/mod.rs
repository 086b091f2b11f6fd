// External I/O operations module
pub mod lock; // Run lock on the storage root
