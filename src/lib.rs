//! Generic CRUD resource controllers over a record-store gateway, wired up as
//! an order-management REST API on PostgreSQL.

pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod sql;
pub mod state;
pub mod store;
pub mod viewset;

pub use config::{ListDefaults, ServerConfig, StoreKind};
pub use database::open_backend;
pub use error::{AppError, ConfigError, HookError, StartupError, StoreError};
pub use migration::apply_migrations;
pub use routes::{api_routes, app, common_routes};
pub use state::AppState;
pub use store::{Backend, MemoryDatabase, RecordStore};
pub use viewset::{Operation, PerformCreate, RequestContext, ViewSet};
