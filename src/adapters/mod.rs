//! External system integrations for docpipe.
//!
//! - [`engine`] - Document conversion engines
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can be
//! tested against in-memory mock engines.
//!
//! ```rust,no_run
//! use docpipe::adapters::engine::{CommandEngine, ConversionEngine};
//! use docpipe::config::EngineConfig;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = CommandEngine::from_config(&EngineConfig::default());
//! if let Some(doc) = engine.convert(Path::new("/srv/inputs/report.pdf")).await? {
//!     println!("{:?}", doc.capabilities());
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
