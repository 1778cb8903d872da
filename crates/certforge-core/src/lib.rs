//! # certforge-core
//!
//! Batch certificate generation: run configuration, PDF conversion and
//! packaging around the template and roster crates.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use certforge_core::{BatchDriver, LibreOfficeConverter, RunConfig};
//!
//! let config = RunConfig::load(None)?;
//! let roster = certforge_data::load_roster_file("asistentes.xlsx", &config.roster_options())?;
//! let template = std::fs::read("certificado.pptx")?;
//!
//! let converter = LibreOfficeConverter::new(&config.converter.program);
//! let report = BatchDriver::new(&config, &converter).run(
//!     &template,
//!     &roster.records,
//!     Path::new("certificados.pdf.zip"),
//!     |p| println!("[{}/{}] {}", p.index, p.total, p.name),
//! )?;
//! println!("{} PDFs", report.pdf_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod bundle;
pub mod check;
pub mod config;
pub mod converter;
pub mod error;
pub mod naming;

// Re-exports
pub use batch::{BatchDriver, BatchReport, Progress, RecordOutcome, RecordStage};
pub use bundle::{bundle_pdfs, list_pdfs};
pub use check::{check, CheckReport};
pub use config::{
    ConverterSettings, FieldSettings, IdentifierSettings, MissPolicy, OutputSettings,
    ResolvedStyles, RunConfig, SentinelSettings,
};
pub use converter::{expected_pdf_path, DocumentConverter, LibreOfficeConverter};
pub use error::{CertError, ConvertError, Result};
pub use naming::{sanitize_stem, FileNamer};
