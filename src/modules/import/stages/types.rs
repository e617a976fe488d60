use serde::{Deserialize, Serialize};

/// Why one sub-item of a stage was skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipReason {
    pub item: String,
    pub reason: String,
}

/// Aggregated outcome of a stage run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSummary {
    pub processed: usize,
    pub skipped: Vec<SkipReason>,
}

impl StageSummary {
    pub fn processed(&mut self) {
        self.processed += 1;
    }

    pub fn skip(&mut self, item: &str, reason: &str) {
        self.skipped.push(SkipReason {
            item: item.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn describe(&self, what: &str) -> String {
        if self.skipped.is_empty() {
            format!("Imported {} {}", self.processed, what)
        } else {
            format!(
                "Imported {} {} ({} skipped)",
                self.processed,
                what,
                self.skipped.len()
            )
        }
    }
}
