//! Materialization of resolved downloads on local storage.
//!
//! # Features
//!
//! - Skip-if-exists, including the archive-renamed form of source archives
//! - Streaming writes to a `.part` file, renamed into place only on success
//! - Per-chunk progress reporting through [`ProgressObserver`]
//! - Separated-directory layout with collision-safe relocation
//!
//! # Example
//!
//! ```no_run
//! use exporter_core::download::{Materializer, SilentProgress};
//! use exporter_core::transport::HttpSettings;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let materializer = Materializer::new(HttpSettings::default())?;
//! let outcome = materializer
//!     .materialize(Path::new("./library/Book.pdf"), "https://cdn.example.com/x.pdf", &SilentProgress)
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filename;
mod layout;
mod materializer;
mod progress;

pub use error::MaterializeError;
pub use filename::{archive_form, destination_path, final_path, item_base_name};
pub use layout::relocate_into_item_dir;
pub use materializer::{MaterializeOutcome, Materializer};
pub use progress::{ProgressObserver, SilentProgress, TransferProgress};
