//! # certforge-pptx
//!
//! PPTX certificate templates for certforge.
//!
//! This crate provides functionality to:
//! - Open a PPTX package and parse its slides in presentation order
//! - Resolve the text color chosen for a field
//! - Replace placeholder text in runs, applying font, size, weight and color
//! - Save the edited deck
//!
//! ## Example
//!
//! ```no_run
//! use certforge_pptx::{substitute, Deck, FieldStyle, Substitution, NAME_SENTINEL};
//!
//! let mut deck = Deck::open("certificado.pptx")?;
//! substitute(
//!     &mut deck,
//!     &[Substitution::new(NAME_SENTINEL, "Garcia Ana", FieldStyle::default())],
//! )?;
//! deck.save("Certificado_Garcia_Ana.pptx")?;
//! # Ok::<(), certforge_pptx::PptxError>(())
//! ```

pub mod archive;
pub mod color;
pub mod deck;
pub mod error;
pub mod relationships;
pub mod style;
pub mod substitute;
pub mod xml;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

pub use archive::PptxArchive;
pub use color::{ColorInput, ColorResolution, ColorSpec, InvalidColorInput, Swatch};
pub use deck::{Deck, SlidePart};
pub use error::{PptxError, Result};
pub use style::{FieldStyle, FONT_ALLOW_LIST, MAX_SIZE_POINTS, MIN_SIZE_POINTS};
pub use substitute::{scan_sentinels, substitute, SentinelHits, Substitution, SubstitutionReport};
pub use xml::{XmlDocument, XmlElement, XmlNode};

/// Placeholder marking where the person's name goes
pub const NAME_SENTINEL: &str = "Nombre y apellido";

/// Placeholder marking where the identifier goes
pub const IDENTIFIER_SENTINEL: &str = "Numero de DNI";

/// DrawingML main namespace
pub const NS_DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// PresentationML main namespace
pub const NS_PRESENTATIONML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// Office document relationships namespace
pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
