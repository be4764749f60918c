//! Output generation for scraped documents.
//!
//! # Submodules
//!
//! - [`json`]: Writes a pipeline's document to a pretty-printed JSON file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── athletic_events.json   # {"events": [...]}
//! ├── bulletin.json          # {"courses": [...]}
//! └── calendar_events.json   # {"events": [...]}
//! ```

pub mod json;
