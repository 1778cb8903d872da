//! Dry run: validate configuration, roster and template without converting.

use certforge_data::{load_roster_bytes, RosterSummary};
use certforge_pptx::{scan_sentinels, Deck, InvalidColorInput, SubstitutionReport};
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;

/// Findings of a dry run
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Records a real run would generate
    pub records: usize,
    pub roster: RosterSummary,
    pub slides: usize,
    /// Runs containing each active sentinel
    pub sentinels: SubstitutionReport,
    /// Color inputs that would fall back to black
    pub color_warnings: Vec<InvalidColorInput>,
}

impl CheckReport {
    /// Active sentinels not present anywhere in the template
    pub fn missing_sentinels(&self) -> Vec<&str> {
        self.sentinels
            .hits
            .iter()
            .filter(|h| h.runs == 0)
            .map(|h| h.sentinel.as_str())
            .collect()
    }
}

/// Validate everything a batch needs, in the order a batch needs it
pub fn check(config: &RunConfig, template: &[u8], roster: &[u8]) -> Result<CheckReport> {
    config.validate()?;
    let styles = config.resolve_styles()?;

    let roster = load_roster_bytes(roster, &config.roster_options())?;
    let deck = Deck::from_bytes(template)?;
    let sentinels = scan_sentinels(&deck, &config.active_sentinels());

    info!(
        records = roster.len(),
        slides = deck.slide_count(),
        hits = sentinels.total_hits(),
        "check finished"
    );

    Ok(CheckReport {
        records: roster.len(),
        roster: roster.summary,
        slides: deck.slide_count(),
        sentinels,
        color_warnings: styles.warnings,
    })
}
