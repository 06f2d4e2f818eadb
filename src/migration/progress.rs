// ABOUTME: Live progress display for a migration run
// ABOUTME: One overall bar in collections plus one bar per collection in documents

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const OVERALL_TEMPLATE: &str =
    "{spinner:.green} {msg:20} [{elapsed_precise}] {bar:40.green/blue} {pos}/{len} ({percent}%)";
const COLLECTION_TEMPLATE: &str =
    "{spinner:.cyan} {msg:20} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%)";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// Progress for one run. Updated only from the task driving the migration.
pub struct MigrationProgress {
    multi: MultiProgress,
    overall: ProgressBar,
}

impl MigrationProgress {
    /// Progress drawn to the terminal.
    pub fn new(collections: u64) -> Self {
        Self::with_multi(MultiProgress::new(), collections)
    }

    /// Progress that tracks positions without drawing anything.
    pub fn hidden(collections: u64) -> Self {
        Self::with_multi(
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            collections,
        )
    }

    fn with_multi(multi: MultiProgress, collections: u64) -> Self {
        let overall = multi.add(ProgressBar::new(collections));
        overall.set_style(bar_style(OVERALL_TEMPLATE));
        overall.set_message("Overall Migration");
        Self { multi, overall }
    }

    /// Total collections, known only after enumeration.
    pub fn set_collections(&self, collections: u64) {
        self.overall.set_length(collections);
    }

    /// Add a per-collection bar sized to the planned document count.
    pub fn collection_bar(&self, collection: &str, planned: u64) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(planned));
        bar.set_style(bar_style(COLLECTION_TEMPLATE));
        bar.set_message(collection.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    /// One collection finished, whatever its outcome.
    pub fn advance_overall(&self) {
        self.overall.inc(1);
    }

    pub fn overall_position(&self) -> u64 {
        self.overall.position()
    }

    pub fn overall_length(&self) -> Option<u64> {
        self.overall.length()
    }

    pub fn finish(&self, message: &'static str) {
        self.overall.finish_with_message(message);
    }

    pub fn is_finished(&self) -> bool {
        self.overall.is_finished()
    }
}
