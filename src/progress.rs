//! Checklist progress tracking

use crate::error::DashboardError;
use crate::models::{ChecklistItem, ChecklistState};

/// Fraction of flags that are set; 0 when there are none
pub fn progress<I>(flags: I) -> f64
where
    I: IntoIterator<Item = bool>,
{
    let (checked, total) = flags
        .into_iter()
        .fold((0usize, 0usize), |(c, t), flag| (c + flag as usize, t + 1));
    if total == 0 {
        0.0
    } else {
        checked as f64 / total as f64
    }
}

pub fn percent_label(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

#[derive(Debug, Clone)]
pub struct Checklist<'a> {
    pub items: &'a [ChecklistItem],
}

impl<'a> Checklist<'a> {
    pub fn new(items: &'a [ChecklistItem]) -> Self {
        Self { items }
    }

    /// Session state with the given 1-based item numbers checked
    pub fn state_with_done(&self, done: &[usize]) -> Result<ChecklistState, DashboardError> {
        let mut state: ChecklistState = self
            .items
            .iter()
            .map(|item| (item.id.clone(), false))
            .collect();
        for &n in done {
            let item = n
                .checked_sub(1)
                .and_then(|idx| self.items.get(idx))
                .ok_or(DashboardError::UnknownChecklistItem(n))?;
            state.insert(item.id.clone(), true);
        }
        Ok(state)
    }

    /// Progress over this checklist's items. Ids missing from the state count
    /// as unchecked; ids the checklist doesn't know are ignored.
    pub fn progress(&self, state: &ChecklistState) -> f64 {
        progress(
            self.items
                .iter()
                .map(|item| state.get(&item.id).copied().unwrap_or(false)),
        )
    }

    pub fn status_line(&self, state: &ChecklistState) -> String {
        format!("{} achieved", percent_label(self.progress(state)))
    }
}
