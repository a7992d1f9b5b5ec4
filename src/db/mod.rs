//! Database layer
//!
//! SQLite is the default backend (single-file deployment); MySQL can be
//! selected through `database.driver`. Repositories hold a
//! `DynDatabasePool` and dispatch to per-driver query functions.
//!
//! ```ignore
//! use blog_post_api::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
