use crate::error::{IndexError, IndexResult};

#[derive(Debug, Clone)]
pub struct Config {
    /// A tree node holding more local entries than this splits the next time its extents are evaluated.
    pub split_threshold: usize,
    /// Edge length of a grid cell. Grid queries only look one cell ring out.
    pub cell_size: f32,
    /// Squared distance below which a query sphere counts as touching an entry.
    pub contact_threshold_sq: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            split_threshold: 60,
            // Matches the contact reach so the grid's single ring covers every contact.
            cell_size: 1.5,
            contact_threshold_sq: 2.25,
        }
    }
}

impl Config {
    pub fn with_split_threshold(mut self, split_threshold: usize) -> Self {
        self.split_threshold = split_threshold;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_contact_threshold_sq(mut self, contact_threshold_sq: f32) -> Self {
        self.contact_threshold_sq = contact_threshold_sq;
        self
    }

    /// Distance at which contact confirmation starts accepting entries.
    pub fn contact_reach(&self) -> f32 {
        self.contact_threshold_sq.sqrt()
    }

    pub(crate) fn validate(&self) -> IndexResult<()> {
        if self.split_threshold == 0 {
            return Err(IndexError::InvalidConfig {
                reason: "split_threshold must be at least 1",
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(IndexError::InvalidConfig {
                reason: "cell_size must be finite and positive",
            });
        }
        if !(self.contact_threshold_sq.is_finite() && self.contact_threshold_sq >= 0.0) {
            return Err(IndexError::InvalidConfig {
                reason: "contact_threshold_sq must be finite and non-negative",
            });
        }
        Ok(())
    }
}
