//! SeaORM entities that map to database tables.

pub mod subscription;
