// src/services/aggregate.rs

//! Collects per-fiscal-year links into the final [`ResultSet`].

use std::collections::HashSet;

use crate::error::AppError;
use crate::models::{CandidateLink, LinkOrigin, ResultSet, RunState, YearEntry, YearOutcome};

/// Working state for one registered fiscal year.
#[derive(Debug)]
struct Slot {
    fiscal_year: String,
    query: Option<String>,
    state: SlotState,
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Found {
        urls: Vec<String>,
        seen: HashSet<String>,
        direct_count: usize,
    },
    Failed(String),
}

/// Single owner of the result set while a run is in progress.
///
/// Appends take `&mut self`, so concurrent pipelines must hand their
/// output to one driver that calls [`append`](Self::append) in turn.
#[derive(Debug)]
pub struct ResultAggregator {
    slots: Vec<Slot>,
    state: RunState,
}

impl ResultAggregator {
    /// Register the fiscal years in reporting order.
    pub fn new<I, S>(fiscal_years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<Slot> = Vec::new();
        for year in fiscal_years {
            let fiscal_year = year.into();
            if slots.iter().any(|s| s.fiscal_year == fiscal_year) {
                continue;
            }
            slots.push(Slot {
                fiscal_year,
                query: None,
                state: SlotState::Pending,
            });
        }
        Self {
            slots,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Mark the run as started.
    pub fn begin(&mut self) {
        if self.state == RunState::Idle {
            self.state = RunState::Running;
        }
    }

    /// Remember the query text used for a fiscal year.
    pub fn set_query(&mut self, fiscal_year: &str, query: impl Into<String>) {
        let slot = self.slot_mut(fiscal_year);
        slot.query = Some(query.into());
    }

    /// Add deduplicated links for a fiscal year.
    ///
    /// May be called several times per year; URLs already present are
    /// skipped, as are links attributed to a different fiscal year.
    /// Appending an empty batch records the year as found-empty.
    pub fn append(&mut self, fiscal_year: &str, links: Vec<CandidateLink>) {
        self.begin();
        let slot = self.slot_mut(fiscal_year);

        if !matches!(slot.state, SlotState::Found { .. }) {
            if let SlotState::Failed(reason) = &slot.state {
                log::debug!(
                    "FY {}: replacing recorded failure ({}) with results",
                    fiscal_year,
                    reason
                );
            }
            slot.state = SlotState::Found {
                urls: Vec::new(),
                seen: HashSet::new(),
                direct_count: 0,
            };
        }

        let SlotState::Found {
            urls,
            seen,
            direct_count,
        } = &mut slot.state
        else {
            return;
        };

        for link in links {
            if link.fiscal_year() != fiscal_year {
                log::warn!(
                    "Dropping {} attributed to FY {} from FY {} batch",
                    link.url(),
                    link.fiscal_year(),
                    fiscal_year
                );
                continue;
            }
            if seen.insert(link.url().to_string()) {
                if link.origin() == LinkOrigin::Direct {
                    *direct_count += 1;
                }
                urls.push(link.url().to_string());
            }
        }
    }

    /// Record that a fiscal year's search failed.
    ///
    /// Ignored if the year already has results.
    pub fn record_failure(&mut self, fiscal_year: &str, error: &AppError) {
        self.begin();
        let slot = self.slot_mut(fiscal_year);
        if matches!(slot.state, SlotState::Found { .. }) {
            return;
        }
        slot.state = SlotState::Failed(error.to_string());
    }

    /// Whether every registered year has an outcome.
    pub fn is_settled(&self) -> bool {
        self.slots
            .iter()
            .all(|s| !matches!(s.state, SlotState::Pending))
    }

    /// Produce the read-only result set.
    ///
    /// Years still pending are omitted rather than reported as empty.
    pub fn finalize(mut self, cancelled: bool) -> ResultSet {
        self.state = RunState::Complete;

        let entries = self
            .slots
            .into_iter()
            .filter_map(|slot| {
                let (outcome, direct_count) = match slot.state {
                    SlotState::Pending => return None,
                    SlotState::Found {
                        urls, direct_count, ..
                    } => (YearOutcome::Found { urls }, direct_count),
                    SlotState::Failed(reason) => (YearOutcome::Failed { reason }, 0),
                };
                Some(YearEntry {
                    fiscal_year: slot.fiscal_year,
                    outcome,
                    direct_count,
                    query: slot.query,
                })
            })
            .collect();

        ResultSet { entries, cancelled }
    }

    fn slot_mut(&mut self, fiscal_year: &str) -> &mut Slot {
        let index = match self
            .slots
            .iter()
            .position(|s| s.fiscal_year == fiscal_year)
        {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    fiscal_year: fiscal_year.to_string(),
                    query: None,
                    state: SlotState::Pending,
                });
                self.slots.len() - 1
            }
        };
        &mut self.slots[index]
    }
}
