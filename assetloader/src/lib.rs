//! AssetLoader - Selective loading of optional content packages
//!
//! This library decides which items of a large pool of content packages a
//! session actually needs, loads them in dependency order with per-item
//! failure isolation, and shares identical sub-resources across the pool.
//!
//! # Modules
//!
//! - [`usage`]: which items a saved world references, plus lazy loading of
//!   items referenced from inside other items
//! - [`loader`]: the two-pass selection and load session
//! - [`sharing`]: checksum-keyed cache of textures, materials and meshes
//! - [`report`]: failed and not-found items, rendered as a text report
//! - [`pool`], [`prefab`], [`codec`]: the package store, the decoded item
//!   model and the binary payload format
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use assetloader::config::LoaderSettings;
//! use assetloader::loader::Session;
//! use assetloader::pool::{AssetMetadata, ContentPool, ItemKind, Package};
//! use assetloader::prefab::{PrefabKind, PrefabPayload};
//! use assetloader::report::MemoryReportSink;
//!
//! let pool = ContentPool::from_packages([Package::builder("1234567")
//!     .item(
//!         "House",
//!         AssetMetadata::new(ItemKind::Building, "House_Data"),
//!         PrefabPayload::new("House_Data", PrefabKind::Building).build(),
//!     )
//!     .build()])
//! .unwrap();
//!
//! let settings = LoaderSettings::default().with_load_used(false);
//! let session = Session::builder(settings, Arc::new(pool))
//!     .with_report_sink(Arc::new(MemoryReportSink::new()))
//!     .build();
//!
//! let summary = session.task().run_to_completion();
//! assert_eq!(summary.counts.buildings, 1);
//! assert!(session.find_loaded(PrefabKind::Building, "1234567.House_Data").is_some());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod ident;
pub mod loader;
pub mod logging;
pub mod pool;
pub mod prefab;
pub mod progress;
pub mod report;
pub mod sharing;
pub mod styles;
pub mod telemetry;
pub mod usage;

pub use error::{Error, LoadError, LoadResult};
