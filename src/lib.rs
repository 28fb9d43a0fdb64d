//! Layered SEO configuration and metadata resolution for a sports live-score
//! site.
//!
//! [`store::ConfigProvider`] merges compiled defaults, disk files, an
//! environment blob and database records; [`builders`] fill per-domain
//! templates from live entity data; [`resolver::MetadataResolver`] turns a
//! page identity into render-ready metadata.

pub mod builders;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod settings;
pub mod store;

pub use entity::{EntitySource, NoEntities};
pub use error::{StoreError, StoreResult};
pub use resolver::{MetadataResolver, Resolved, SeoEntry};
pub use settings::Settings;
pub use store::ConfigProvider;
