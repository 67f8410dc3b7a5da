/// Application state
///
/// `Catalog` owns the current collection, the filter state and the detail
/// view, and is the only thing the UI mutates. All mutation goes through
/// three operations: [`Catalog::select_generation`], [`Catalog::set_filter`]
/// and [`Catalog::open_detail`], plus the completion callbacks that feed
/// fetch results back in.
///
/// Loads and detail fetches are stamped with a monotonically increasing
/// token. A completion whose token is no longer current belongs to a
/// superseded request and is dropped, so stale data never overwrites a
/// newer collection or detail.

use tracing::{debug, error, info, warn};

use super::data::{Detail, Record};
use super::filter::{self, FilterState, TagCount};

/// Identifies one pending per-id fetch of a collection load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub id: u32,
}

/// What the caller should do after driving the loader one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStep {
    /// Fetch this id next and report back via [`Catalog::record_fetched`]
    Fetch(LoadTicket),
    /// The load finished; the collection is ready to render
    Finished(LoadSummary),
    /// The completion belonged to a superseded load and was ignored
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Ids whose fetch failed and were left out
    pub failed: Vec<u32>,
}

/// Progress of the in-flight load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    pub token: u64,
    pub start: u32,
    pub end: u32,
    /// Id currently being fetched
    pub next: u32,
    pub failed: Vec<u32>,
}

impl LoadProgress {
    pub fn total(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn done(&self) -> usize {
        (self.next - self.start) as usize
    }
}

/// Identifies one detail fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    pub token: u64,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Closed,
    Loading { id: u32 },
    Ready { detail: Box<Detail>, alternate: bool },
    Failed { id: u32, message: String },
}

impl DetailState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DetailState::Closed)
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<Record>,
    filter: FilterState,
    tags: Vec<TagCount>,
    loading: Option<LoadProgress>,
    load_token: u64,
    detail: DetailState,
    detail_token: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Collection loading ==========

    /// Start loading the inclusive id range, discarding whatever was loaded
    /// (or loading) before. Resets the filter state.
    pub fn select_generation(&mut self, start: u32, end: u32) -> LoadStep {
        self.load_token += 1;
        self.records.clear();
        self.tags.clear();
        self.filter = FilterState::default();

        info!(token = self.load_token, start, end, "loading generation");

        if start == 0 || start > end {
            warn!(start, end, "empty id range");
            self.loading = None;
            return LoadStep::Finished(LoadSummary {
                loaded: 0,
                failed: Vec::new(),
            });
        }

        self.loading = Some(LoadProgress {
            token: self.load_token,
            start,
            end,
            next: start,
            failed: Vec::new(),
        });

        LoadStep::Fetch(LoadTicket {
            token: self.load_token,
            id: start,
        })
    }

    /// Feed back the result for one id. Failures are recorded and skipped;
    /// the next id is always attempted.
    pub fn record_fetched(&mut self, ticket: LoadTicket, result: Result<Record, String>) -> LoadStep {
        let Some(progress) = self.loading.as_mut() else {
            debug!(token = ticket.token, id = ticket.id, "no load in progress, dropping result");
            return LoadStep::Stale;
        };

        if progress.token != ticket.token || progress.next != ticket.id {
            debug!(token = ticket.token, id = ticket.id, "dropping superseded result");
            return LoadStep::Stale;
        }

        match result {
            Ok(record) => self.records.push(record),
            Err(message) => {
                warn!(id = ticket.id, %message, "skipping record");
                progress.failed.push(ticket.id);
            }
        }

        if progress.next < progress.end {
            progress.next += 1;
            return LoadStep::Fetch(LoadTicket {
                token: progress.token,
                id: progress.next,
            });
        }

        let failed = std::mem::take(&mut progress.failed);
        self.loading = None;
        self.tags = filter::tag_index(&self.records);

        info!(loaded = self.records.len(), failed = failed.len(), "generation loaded");

        LoadStep::Finished(LoadSummary {
            loaded: self.records.len(),
            failed,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn progress(&self) -> Option<&LoadProgress> {
        self.loading.as_ref()
    }

    /// Full collection; empty while a load is in progress
    pub fn records(&self) -> &[Record] {
        if self.is_loading() {
            &[]
        } else {
            &self.records
        }
    }

    // ========== Filter & search ==========

    pub fn set_filter(&mut self, tag: Option<String>, query: impl Into<String>) {
        self.filter = FilterState::new(tag, query);
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Records to render, recomputed from the full collection
    pub fn visible(&self) -> Vec<&Record> {
        filter::apply(self.records(), &self.filter)
    }

    /// Tag selector entries for the full collection
    pub fn tag_index(&self) -> &[TagCount] {
        &self.tags
    }

    // ========== Detail view ==========

    /// Show the loading placeholder for `id` and hand back the ticket for the fetch
    pub fn open_detail(&mut self, id: u32) -> DetailTicket {
        self.detail_token += 1;
        self.detail = DetailState::Loading { id };
        DetailTicket {
            token: self.detail_token,
            id,
        }
    }

    /// Apply a detail fetch result; returns false when it was superseded or the
    /// view was closed in the meantime
    pub fn detail_fetched(&mut self, ticket: DetailTicket, result: Result<Detail, String>) -> bool {
        if ticket.token != self.detail_token || !self.detail.is_open() {
            debug!(id = ticket.id, "dropping superseded detail");
            return false;
        }

        self.detail = match result {
            Ok(detail) => DetailState::Ready {
                detail: Box::new(detail),
                alternate: false,
            },
            Err(message) => {
                error!(id = ticket.id, %message, "failed to load detail");
                DetailState::Failed {
                    id: ticket.id,
                    message,
                }
            }
        };
        true
    }

    /// Close button, click outside and Escape all end up here
    pub fn close_detail(&mut self) {
        if self.detail.is_open() {
            // Invalidate any fetch still in flight
            self.detail_token += 1;
            self.detail = DetailState::Closed;
        }
    }

    /// Swap between the normal and alternate sprite; no refetch
    pub fn toggle_detail_sprite(&mut self) {
        if let DetailState::Ready { detail, alternate } = &mut self.detail {
            if detail.record.sprites.alternate.is_some() {
                *alternate = !*alternate;
            }
        }
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }
}
