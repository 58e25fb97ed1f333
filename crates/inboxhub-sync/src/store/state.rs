//! Plain, synchronous store state and the reconciliation rules applied to it.
//!
//! Nothing in here suspends. Round-trip operations are split into a begin
//! step that applies the optimistic change and returns a token, and a finish
//! step that confirms or reverts using that token. Every change queues a
//! [`StoreEvent`]; the owning store drains and publishes them.
//!
//! Three counters guard late completions:
//!
//! - `epoch`: bumped by [`StoreState::reset`]; a token from an older epoch is ignored
//! - `revision`: bumped by every list or counter mutation
//! - `list_generation`: bumped whenever the list is replaced wholesale

use inboxhub_core::error::AppError;
use inboxhub_core::result::AppResult;
use inboxhub_core::types::{NotificationId, Page, PageMeta, PageRequest};
use inboxhub_entity::{ConnectionState, NotificationRecord};

use super::events::{StoreEvent, StoreSnapshot};
use crate::fetch::FetchOutcome;

/// Whether a fetch replaces the list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Page 1, replacing the list.
    Replace,
    /// The page after the current one, appended at the tail.
    Append,
}

/// Admission to run one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    mode: FetchMode,
    request: PageRequest,
}

impl FetchTicket {
    /// The page to request from the remote service.
    pub fn request(&self) -> PageRequest {
        self.request
    }
}

/// Record of one optimistic mark-one-read.
#[derive(Debug, Clone)]
pub struct MarkOneToken {
    id: NotificationId,
    index: usize,
    epoch: u64,
    list_generation: u64,
    pushed_at: u64,
}

/// Record of one optimistic mark-all-read.
#[derive(Debug, Clone)]
pub struct MarkAllToken {
    epoch: u64,
    list_generation: u64,
    revision: u64,
    pushed_at: u64,
    snapshot: Vec<NotificationRecord>,
    snapshot_unread: u64,
    flipped: Vec<usize>,
}

/// Notification list, pagination metadata, counters and status flags.
#[derive(Debug)]
pub struct StoreState {
    records: Vec<NotificationRecord>,
    meta: PageMeta,
    unread: u64,
    connection: ConnectionState,
    /// Last non-error connection state, restored when an error clears.
    link_status: ConnectionState,
    error: Option<AppError>,
    loading: bool,
    marking_all: bool,
    epoch: u64,
    revision: u64,
    list_generation: u64,
    /// Records pushed at the head since the last replace.
    pushed_total: u64,
    dedupe_pushed: bool,
    pending: Vec<StoreEvent>,
}

impl StoreState {
    /// Create an empty state.
    pub fn new(dedupe_pushed: bool) -> Self {
        Self {
            records: Vec::new(),
            meta: PageMeta::default(),
            unread: 0,
            connection: ConnectionState::Disconnected,
            link_status: ConnectionState::Disconnected,
            error: None,
            loading: false,
            marking_all: false,
            epoch: 0,
            revision: 0,
            list_generation: 0,
            pushed_total: 0,
            dedupe_pushed,
            pending: Vec::new(),
        }
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
            meta: self.meta,
            unread_count: self.unread,
            connection: self.connection,
            error: self.error_message(),
            loading: self.loading,
            marking_all: self.marking_all,
            epoch: self.epoch,
        }
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn meta(&self) -> PageMeta {
        self.meta
    }

    pub fn unread_count(&self) -> u64 {
        self.unread
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_marking_all(&self) -> bool {
        self.marking_all
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `epoch` is the current session.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    // -- list operations ----------------------------------------------------

    /// Overwrite list and metadata; the unread counter is recounted.
    pub fn replace_page(&mut self, records: Vec<NotificationRecord>, meta: PageMeta) {
        self.unread = count_unread(&records);
        self.records = records;
        self.meta = meta;
        self.list_generation += 1;
        self.pushed_total = 0;
        self.revision += 1;
        self.pending.push(StoreEvent::Replaced {
            count: self.records.len(),
            unread: self.unread,
        });
    }

    /// Append at the tail; the unread counter grows by the unread part of `records`.
    pub fn append_page(&mut self, records: Vec<NotificationRecord>, meta: PageMeta) {
        let count = records.len();
        self.unread += count_unread(&records);
        self.records.extend(records);
        self.meta = meta;
        self.revision += 1;
        self.pending.push(StoreEvent::Appended {
            page: meta.current_page,
            count,
            unread: self.unread,
        });
    }

    /// Insert a pushed record at the head. Returns `false` when it was dropped
    /// as a duplicate.
    pub fn insert_pushed(&mut self, record: NotificationRecord) -> bool {
        if self.dedupe_pushed && self.records.iter().any(|r| r.id == record.id) {
            return false;
        }

        if record.is_unread() {
            self.unread += 1;
        }
        self.meta.total_items += 1;

        let id = record.id.clone();
        self.records.insert(0, record);
        self.pushed_total += 1;
        self.revision += 1;
        self.pending.push(StoreEvent::Pushed {
            id,
            unread: self.unread,
        });
        true
    }

    // -- mark one -----------------------------------------------------------

    /// Flip the first unread record with `id` to read.
    ///
    /// `None` when there is nothing to do: the record is missing or already read.
    pub fn begin_mark_one(&mut self, id: &NotificationId) -> Option<MarkOneToken> {
        let index = self
            .records
            .iter()
            .position(|r| &r.id == id && r.is_unread())?;

        self.records[index].read = true;
        self.unread = self.unread.saturating_sub(1);
        self.revision += 1;
        self.pending.push(StoreEvent::ReadStateChanged {
            unread: self.unread,
        });

        Some(MarkOneToken {
            id: id.clone(),
            index,
            epoch: self.epoch,
            list_generation: self.list_generation,
            pushed_at: self.pushed_total,
        })
    }

    /// The remote confirmed a mark-one-read.
    pub fn confirm_mark_one(&mut self, token: &MarkOneToken) {
        if self.is_current(token.epoch) {
            self.record_success();
        }
    }

    /// The remote rejected a mark-one-read. Returns whether the record was reverted.
    ///
    /// The record is located at its original position shifted by the pushes
    /// since. Nothing is reverted if the list was replaced in between.
    pub fn rollback_mark_one(&mut self, token: &MarkOneToken, cause: &AppError) -> bool {
        if !self.is_current(token.epoch) {
            return false;
        }

        let reverted = token.list_generation == self.list_generation && {
            let shift = self.pushed_total.saturating_sub(token.pushed_at) as usize;
            match self.records.get_mut(token.index + shift) {
                Some(record) if record.id == token.id && record.read => {
                    record.read = false;
                    true
                }
                _ => false,
            }
        };

        if reverted {
            self.unread += 1;
            self.revision += 1;
            self.pending.push(StoreEvent::RolledBack {
                unread: self.unread,
            });
        }

        self.set_error(AppError::mutation_rejected(format!(
            "Failed to mark notification as read: {}",
            cause.message
        )));
        reverted
    }

    // -- mark all -----------------------------------------------------------

    /// Snapshot, then flip every unread record. `None` while another mark-all
    /// is outstanding.
    pub fn begin_mark_all(&mut self) -> Option<MarkAllToken> {
        if self.marking_all {
            return None;
        }

        let snapshot = self.records.clone();
        let snapshot_unread = self.unread;
        let flipped: Vec<usize> = self
            .records
            .iter_mut()
            .enumerate()
            .filter(|(_, r)| r.is_unread())
            .map(|(i, r)| {
                r.read = true;
                i
            })
            .collect();

        self.unread = 0;
        if !flipped.is_empty() || snapshot_unread != 0 {
            self.revision += 1;
            self.pending.push(StoreEvent::ReadStateChanged { unread: 0 });
        }
        self.set_marking_all(true);
        self.clear_error();

        Some(MarkAllToken {
            epoch: self.epoch,
            list_generation: self.list_generation,
            revision: self.revision,
            pushed_at: self.pushed_total,
            snapshot,
            snapshot_unread,
            flipped,
        })
    }

    /// The remote confirmed a mark-all-read.
    pub fn confirm_mark_all(&mut self, token: &MarkAllToken) {
        if !self.is_current(token.epoch) {
            return;
        }
        self.set_marking_all(false);
        self.record_success();
    }

    /// The remote rejected a mark-all-read. Returns whether anything was reverted.
    ///
    /// Without intervening mutations the snapshot is restored as a whole.
    /// Otherwise only the records this call flipped are reverted, so later
    /// pushes, appends and single mark-reads survive. Nothing is reverted if
    /// the list was replaced in between.
    pub fn rollback_mark_all(&mut self, token: MarkAllToken, cause: &AppError) -> bool {
        if !self.is_current(token.epoch) {
            return false;
        }
        self.set_marking_all(false);

        let reverted = if token.revision == self.revision {
            self.records = token.snapshot;
            self.unread = token.snapshot_unread;
            true
        } else if token.list_generation == self.list_generation {
            let shift = self.pushed_total.saturating_sub(token.pushed_at) as usize;
            let mut any = false;
            for index in token.flipped {
                if let Some(record) = self.records.get_mut(index + shift) {
                    if record.read {
                        record.read = false;
                        self.unread += 1;
                        any = true;
                    }
                }
            }
            any
        } else {
            false
        };

        if reverted {
            self.revision += 1;
            self.pending.push(StoreEvent::RolledBack {
                unread: self.unread,
            });
        }

        self.set_error(AppError::mutation_rejected(format!(
            "Failed to mark all as read: {}",
            cause.message
        )));
        reverted
    }

    // -- fetch --------------------------------------------------------------

    /// Claim the fetch guard for one fetch.
    pub fn begin_fetch(
        &mut self,
        mode: FetchMode,
        page_size: u64,
    ) -> Result<FetchTicket, FetchOutcome> {
        if self.loading {
            return Err(FetchOutcome::InFlight);
        }

        let page = match mode {
            FetchMode::Replace => 1,
            FetchMode::Append => self.meta.next_page().ok_or(FetchOutcome::NoMorePages)?,
        };

        self.set_loading(true);
        Ok(FetchTicket {
            epoch: self.epoch,
            mode,
            request: PageRequest::new(page, page_size),
        })
    }

    /// Apply a fetch result. Results from an older epoch are discarded and
    /// leave the current fetch guard alone.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: AppResult<Page<NotificationRecord>>,
    ) -> FetchOutcome {
        if !self.is_current(ticket.epoch) {
            return FetchOutcome::Stale;
        }
        self.set_loading(false);

        match result {
            Ok(page) => {
                let count = page.items.len();
                match ticket.mode {
                    FetchMode::Replace => self.replace_page(page.items, page.meta),
                    FetchMode::Append => self.append_page(page.items, page.meta),
                }
                self.record_success();
                FetchOutcome::Applied {
                    page: ticket.request.page,
                    count,
                }
            }
            Err(err) => {
                if err.is_link_failure() {
                    self.set_connection_state(ConnectionState::Error);
                }
                self.set_error(AppError::fetch(format!(
                    "Failed to load notifications: {}",
                    err.message
                )));
                FetchOutcome::Failed
            }
        }
    }

    // -- connection and error slot ------------------------------------------

    /// Write the connection state. Returns `false` when it was already current.
    pub fn set_connection_state(&mut self, state: ConnectionState) -> bool {
        if state != ConnectionState::Error {
            self.link_status = state;
        }
        if self.connection == state {
            return false;
        }
        self.connection = state;
        self.pending.push(StoreEvent::ConnectionChanged(state));
        true
    }

    /// Enter `Error` and publish a channel failure.
    pub fn report_channel_error(&mut self, cause: &str) {
        self.set_connection_state(ConnectionState::Error);
        self.set_error(AppError::channel(format!(
            "Notification channel error: {cause}"
        )));
    }

    /// Clear the error slot on request of the UI.
    pub fn acknowledge_error(&mut self) -> bool {
        self.clear_error()
    }

    /// Empty everything and start a new epoch.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.records.clear();
        self.meta = PageMeta::default();
        self.unread = 0;
        self.connection = ConnectionState::Disconnected;
        self.link_status = ConnectionState::Disconnected;
        self.error = None;
        self.loading = false;
        self.marking_all = false;
        self.list_generation += 1;
        self.pushed_total = 0;
        self.revision += 1;
        self.pending.push(StoreEvent::Reset { epoch: self.epoch });
    }

    fn record_success(&mut self) {
        self.clear_error();
        if self.connection == ConnectionState::Error {
            let status = self.link_status;
            self.set_connection_state(status);
        }
    }

    fn set_error(&mut self, error: AppError) {
        if self.error.as_ref() == Some(&error) {
            return;
        }
        self.pending
            .push(StoreEvent::ErrorChanged(Some(error.message.clone())));
        self.error = Some(error);
    }

    fn clear_error(&mut self) -> bool {
        if self.error.take().is_none() {
            return false;
        }
        self.pending.push(StoreEvent::ErrorChanged(None));
        true
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.push_loading();
        }
    }

    fn set_marking_all(&mut self, marking_all: bool) {
        if self.marking_all != marking_all {
            self.marking_all = marking_all;
            self.push_loading();
        }
    }

    fn push_loading(&mut self) {
        self.pending.push(StoreEvent::LoadingChanged {
            loading: self.loading,
            marking_all: self.marking_all,
        });
    }
}

fn count_unread(records: &[NotificationRecord]) -> u64 {
    records.iter().filter(|r| r.is_unread()).count() as u64
}
