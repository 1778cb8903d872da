//! The batch driver.
//!
//! Each record goes through `Loaded -> Substituted -> Saved -> Converted`
//! inside one run-scoped temporary directory, then every PDF left there is
//! packaged into the destination archive. A record that fails stays failed
//! and the loop moves on; only configuration, template and abort-policy
//! errors stop the run.

use std::fs;
use std::path::{Path, PathBuf};

use certforge_data::RosterRecord;
use certforge_pptx::{substitute, Deck, Substitution};
use tempfile::{Builder, TempDir};
use tracing::{debug, info, warn};

use crate::bundle::bundle_pdfs;
use crate::config::{MissPolicy, ResolvedStyles, RunConfig};
use crate::converter::DocumentConverter;
use crate::error::Result;
use crate::naming::FileNamer;

/// Furthest stage a record reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStage {
    Loaded,
    Substituted,
    Saved,
    Converted,
    Packaged,
    Failed(String),
}

impl RecordStage {
    pub fn is_failed(&self) -> bool {
        matches!(self, RecordStage::Failed(_))
    }
}

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub full_name: String,
    /// Output file stem, prefix included
    pub stem: String,
    pub stage: RecordStage,
    /// The deck had no sentinel and was kept unfilled
    pub sentinel_missed: bool,
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per record, in roster order
    pub outcomes: Vec<RecordOutcome>,
    /// Entry names written to the archive, sorted
    pub packaged: Vec<String>,
    /// Where the archive was written
    pub archive: PathBuf,
}

impl BatchReport {
    /// Number of PDFs in the archive
    pub fn pdf_count(&self) -> usize {
        self.packaged.len()
    }

    /// Records that did not make it into the archive
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| o.stage.is_failed())
    }

    /// Records packaged without their placeholder filled
    pub fn sentinel_misses(&self) -> usize {
        self.outcomes.iter().filter(|o| o.sentinel_missed).count()
    }
}

/// Progress notification sent after each record
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based position of the record
    pub index: usize,
    pub total: usize,
    pub name: &'a str,
    pub stage: &'a RecordStage,
}

/// Runs the generate-and-convert loop for one configuration
pub struct BatchDriver<'a> {
    config: &'a RunConfig,
    converter: &'a dyn DocumentConverter,
}

impl<'a> BatchDriver<'a> {
    pub fn new(config: &'a RunConfig, converter: &'a dyn DocumentConverter) -> Self {
        Self { config, converter }
    }

    /// Generate one certificate per record and package the PDFs at
    /// `destination`
    pub fn run<F>(
        &self,
        template: &[u8],
        records: &[RosterRecord],
        destination: &Path,
        mut on_progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(Progress<'_>),
    {
        self.config.validate()?;
        let styles = self.config.resolve_styles()?;
        for warning in &styles.warnings {
            warn!("{}", warning);
        }

        // Reject unusable templates before any record work
        let probe = Deck::from_bytes(template)?;
        debug!(slides = probe.slide_count(), "template opened");
        drop(probe);

        let work = self.work_dir()?;
        let mut namer = FileNamer::new(&self.config.output.file_prefix);
        let total = records.len();
        info!(records = total, work_dir = %work.path().display(), "starting batch");

        let mut outcomes = Vec::with_capacity(total);
        for (i, record) in records.iter().enumerate() {
            let stem = namer.next_stem(&record.full_name);
            let outcome = self.process_record(template, record, stem, &styles, work.path())?;

            on_progress(Progress {
                index: i + 1,
                total,
                name: &record.full_name,
                stage: &outcome.stage,
            });
            outcomes.push(outcome);
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let packaged = bundle_pdfs(work.path(), destination)?;

        for outcome in outcomes.iter_mut() {
            if outcome.stage == RecordStage::Converted
                && packaged.iter().any(|name| *name == format!("{}.pdf", outcome.stem))
            {
                outcome.stage = RecordStage::Packaged;
            }
        }

        let report = BatchReport {
            outcomes,
            packaged,
            archive: destination.to_path_buf(),
        };
        info!(
            pdfs = report.pdf_count(),
            failed = report.failures().count(),
            archive = %destination.display(),
            "batch finished"
        );

        Ok(report)
    }

    fn work_dir(&self) -> Result<TempDir> {
        let mut builder = Builder::new();
        builder.prefix("certforge-");
        let dir = match &self.config.output.work_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn process_record(
        &self,
        template: &[u8],
        record: &RosterRecord,
        stem: String,
        styles: &ResolvedStyles,
        work_dir: &Path,
    ) -> Result<RecordOutcome> {
        let mut outcome = RecordOutcome {
            full_name: record.full_name.clone(),
            stem,
            stage: RecordStage::Loaded,
            sentinel_missed: false,
        };

        let mut deck = Deck::from_bytes(template)?;
        debug!(name = %record.full_name, "loaded");

        let substitutions = self.substitutions(record, styles);
        match substitute(&mut deck, &substitutions) {
            Ok(report) => {
                debug!(name = %record.full_name, hits = report.total_hits(), "substituted");
            }
            Err(err) if err.is_sentinel_miss() => match self.config.on_missing_sentinel {
                MissPolicy::Warn => {
                    warn!(name = %record.full_name, "{}; keeping the document unfilled", err);
                    outcome.sentinel_missed = true;
                }
                MissPolicy::SkipRecord => {
                    warn!(name = %record.full_name, "{}; skipping record", err);
                    outcome.stage = RecordStage::Failed(err.to_string());
                    return Ok(outcome);
                }
                MissPolicy::Abort => return Err(err.into()),
            },
            Err(err) => return Err(err.into()),
        }
        outcome.stage = RecordStage::Substituted;

        let pptx = work_dir.join(format!("{}.pptx", outcome.stem));
        if let Err(err) = deck.save(&pptx) {
            warn!(name = %record.full_name, error = %err, "failed to save document");
            outcome.stage = RecordStage::Failed(err.to_string());
            return Ok(outcome);
        }
        outcome.stage = RecordStage::Saved;
        debug!(path = %pptx.display(), "saved");

        match self.converter.convert(&pptx, work_dir) {
            Ok(pdf) => {
                if let Err(err) = fs::remove_file(&pptx) {
                    debug!(path = %pptx.display(), error = %err, "could not remove intermediate");
                }
                debug!(path = %pdf.display(), "converted");
                outcome.stage = RecordStage::Converted;
            }
            Err(err) => {
                warn!(name = %record.full_name, error = %err, "conversion failed");
                outcome.stage = RecordStage::Failed(err.to_string());
            }
        }

        Ok(outcome)
    }

    fn substitutions(&self, record: &RosterRecord, styles: &ResolvedStyles) -> Vec<Substitution> {
        let mut substitutions = vec![Substitution::new(
            &self.config.sentinels.name,
            &record.full_name,
            styles.name.clone(),
        )];

        if let Some(style) = &styles.identifier {
            substitutions.push(Substitution::new(
                &self.config.sentinels.identifier,
                record.identifier.clone().unwrap_or_default(),
                style.clone(),
            ));
        }

        substitutions
    }
}
