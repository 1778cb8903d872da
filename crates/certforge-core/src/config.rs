//! Run configuration.
//!
//! Read from `certforge.toml` (or an explicit path), every section optional.
//! Command-line flags are applied on top by the caller, then
//! [`RunConfig::validate`] runs once before any record is touched.

use std::path::{Path, PathBuf};

use certforge_data::RosterOptions;
use certforge_pptx::{
    ColorInput, FieldStyle, InvalidColorInput, PptxError, IDENTIFIER_SENTINEL, NAME_SENTINEL,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CertError, Result};

/// File names searched in the working directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["certforge.toml", ".certforge.toml"];

/// What to do with a record whose deck contains no sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissPolicy {
    /// Keep the unfilled document and log a warning
    #[default]
    Warn,
    /// Fail the record and move on
    SkipRecord,
    /// Fail the whole batch
    Abort,
}

/// Top-level run configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub on_missing_sentinel: MissPolicy,
    pub name: FieldSettings,
    pub identifier: IdentifierSettings,
    pub sentinels: SentinelSettings,
    pub roster: RosterOptions,
    pub output: OutputSettings,
    pub converter: ConverterSettings,
}

/// Style of the name field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub font: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: ColorInput,
}

impl Default for FieldSettings {
    fn default() -> Self {
        let style = FieldStyle::default();
        Self {
            font: style.font_name,
            size: style.size_points,
            bold: style.bold,
            italic: style.italic,
            color: ColorInput::default(),
        }
    }
}

impl FieldSettings {
    /// Resolve the color and build the style; the style is not validated
    pub fn resolve(&self) -> (FieldStyle, Option<InvalidColorInput>) {
        let resolution = self.color.resolve();
        let style = FieldStyle {
            font_name: self.font.clone(),
            size_points: self.size,
            bold: self.bold,
            italic: self.italic,
            color: resolution.color,
        };
        (style, resolution.warning)
    }
}

/// The optional identifier field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierSettings {
    /// Require an identifier column and fill the identifier sentinel
    pub enabled: bool,
    pub font: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: ColorInput,
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        let field = FieldSettings::default();
        Self {
            enabled: false,
            font: field.font,
            size: 18,
            bold: field.bold,
            italic: field.italic,
            color: field.color,
        }
    }
}

impl IdentifierSettings {
    /// Style settings without the enable flag
    pub fn field(&self) -> FieldSettings {
        FieldSettings {
            font: self.font.clone(),
            size: self.size,
            bold: self.bold,
            italic: self.italic,
            color: self.color.clone(),
        }
    }
}

/// Placeholder texts searched for in the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelSettings {
    pub name: String,
    pub identifier: String,
}

impl Default for SentinelSettings {
    fn default() -> Self {
        Self {
            name: NAME_SENTINEL.to_string(),
            identifier: IDENTIFIER_SENTINEL.to_string(),
        }
    }
}

/// Output naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Prepended to every per-record file stem
    pub file_prefix: String,
    /// Archive file name used when no destination is given
    pub archive_name: String,
    /// Parent of the run's temporary directory, the system temp dir if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_root: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            file_prefix: "Certificado_".to_string(),
            archive_name: "certificados.pdf.zip".to_string(),
            work_root: None,
        }
    }
}

/// External converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Program invoked as `<program> --headless --convert-to pdf --outdir <dir> <file>`
    pub program: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            program: "libreoffice".to_string(),
        }
    }
}

/// Field styles ready for substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyles {
    pub name: FieldStyle,
    /// Present when the identifier field is enabled
    pub identifier: Option<FieldStyle>,
    /// Color inputs that fell back to black
    pub warnings: Vec<InvalidColorInput>,
}

impl RunConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load from an explicit file, or search the working directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => Self::discover(Path::new(".")),
        }
    }

    /// Load the first configuration file found in `dir`, or defaults
    pub fn discover(dir: &Path) -> Result<Self> {
        match find_config_file(dir) {
            Some(path) => Self::load_file(&path),
            None => {
                debug!(dir = %dir.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load a specific configuration file, which must exist
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CertError::invalid_config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Roster options with identifier mode taken from `[identifier]`
    pub fn roster_options(&self) -> RosterOptions {
        self.roster
            .clone()
            .with_identifier(self.identifier.enabled)
    }

    /// Sentinels the template is expected to contain
    pub fn active_sentinels(&self) -> Vec<&str> {
        let mut sentinels = vec![self.sentinels.name.as_str()];
        if self.identifier.enabled {
            sentinels.push(self.sentinels.identifier.as_str());
        }
        sentinels
    }

    /// Resolve colors and validate both field styles
    pub fn resolve_styles(&self) -> Result<ResolvedStyles> {
        let mut warnings = Vec::new();

        let (name, warning) = self.name.resolve();
        name.validate().map_err(|e| style_error("name", e))?;
        warnings.extend(warning);

        let identifier = if self.identifier.enabled {
            let (style, warning) = self.identifier.field().resolve();
            style.validate().map_err(|e| style_error("identifier", e))?;
            warnings.extend(warning);
            Some(style)
        } else {
            None
        };

        Ok(ResolvedStyles {
            name,
            identifier,
            warnings,
        })
    }

    /// Check everything that must hold before a batch starts
    pub fn validate(&self) -> Result<()> {
        self.resolve_styles()?;

        if self.sentinels.name.is_empty() {
            return Err(CertError::invalid_config("[sentinels] name must not be empty"));
        }
        if self.identifier.enabled {
            if self.sentinels.identifier.is_empty() {
                return Err(CertError::invalid_config(
                    "[sentinels] identifier must not be empty",
                ));
            }
            if self.sentinels.identifier.contains(&self.sentinels.name)
                || self.sentinels.name.contains(&self.sentinels.identifier)
            {
                return Err(CertError::invalid_config(
                    "[sentinels] name and identifier must not overlap",
                ));
            }
        }

        if self.roster.attended_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(CertError::invalid_config(
                "[roster] attended_markers needs at least one value",
            ));
        }
        if !self.roster.csv_delimiter.is_ascii() {
            return Err(CertError::invalid_config(
                "[roster] csv_delimiter must be a single ASCII character",
            ));
        }

        if self.output.archive_name.trim().is_empty() {
            return Err(CertError::invalid_config("[output] archive_name must not be empty"));
        }
        if self.output.file_prefix.contains(&['/', '\\'][..]) {
            return Err(CertError::invalid_config(
                "[output] file_prefix must not contain path separators",
            ));
        }

        if self.converter.program.trim().is_empty() {
            return Err(CertError::invalid_config("[converter] program must not be empty"));
        }

        Ok(())
    }
}

fn style_error(section: &str, err: PptxError) -> CertError {
    match err {
        PptxError::InvalidStyle { reason } => {
            CertError::invalid_config(format!("[{}] {}", section, reason))
        }
        other => CertError::Template(other),
    }
}

/// First configuration file present in `dir`
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
