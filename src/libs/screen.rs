//! "Where was the user" snapshots.
//!
//! The recorder keeps the in-memory navigation state (view, book, tab,
//! archive toggle) and persists it as one JSON blob under `screen_state`
//! whenever the user enters a tracked view or the app is about to be
//! suspended. On the next foreground transition or launch the snapshot is
//! restored, provided it is younger than [`STALENESS_WINDOW_SECS`].
//!
//! Stored format:
//!
//! ```json
//! {"currentView":"reading","currentBookId":3,"currentTab":"read","showingArchive":false,"timestamp":1718000000000}
//! ```
//!
//! A snapshot that fails to parse, or whose timestamp lies in the future,
//! is treated exactly like a missing one and removed; `restore` never fails.

use crate::libs::clock::Clock;
use crate::libs::error::{Result, TrackerError};
use crate::libs::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub const SCREEN_STATE_KEY: &str = "screen_state";

/// Snapshots older than this are never restored.
pub const STALENESS_WINDOW_SECS: i64 = 5 * 60;

/// Views the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Main,
    BookDetails,
    Reading,
    NewSession,
    AddSession,
    AddBook,
    ReadingSessions,
}

impl View {
    /// Views whose entry triggers a snapshot.
    pub fn is_tracked(self) -> bool {
        !matches!(self, View::Main | View::AddBook)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Main => "main",
            View::BookDetails => "book details",
            View::Reading => "reading",
            View::NewSession => "new session",
            View::AddSession => "add session",
            View::AddBook => "add book",
            View::ReadingSessions => "reading sessions",
        };
        write!(f, "{name}")
    }
}

/// Bottom navigation tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Read,
    Track,
    Plan,
    Settings,
}

/// The navigation state owned by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub view: View,
    pub book_id: Option<i64>,
    pub tab: Tab,
    pub showing_archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenSnapshot {
    current_view: View,
    current_book_id: Option<i64>,
    current_tab: Tab,
    showing_archive: bool,
    /// Epoch milliseconds at which the snapshot was taken.
    timestamp: i64,
}

/// Persists and restores [`NavigationState`].
pub struct ScreenStateRecorder<S, C> {
    store: S,
    clock: C,
    navigation: NavigationState,
}

impl<S: KeyValueStore, C: Clock> ScreenStateRecorder<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            navigation: NavigationState::default(),
        }
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    /// Replaces the in-memory navigation state without persisting it.
    pub fn set_navigation(&mut self, navigation: NavigationState) {
        self.navigation = navigation;
    }

    /// Moves to `view` and snapshots it when the view is tracked.
    pub fn navigate(&mut self, view: View, book_id: Option<i64>) -> Result<()> {
        self.navigation.view = view;
        self.navigation.book_id = book_id;
        if view.is_tracked() {
            self.save()?;
        }
        Ok(())
    }

    /// Writes the current navigation state with the current instant.
    pub fn save(&self) -> Result<()> {
        let snapshot = ScreenSnapshot {
            current_view: self.navigation.view,
            current_book_id: self.navigation.book_id,
            current_tab: self.navigation.tab,
            showing_archive: self.navigation.showing_archive,
            timestamp: self.clock.now().timestamp_millis(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.set(SCREEN_STATE_KEY, &json)?;
        debug!(view = %snapshot.current_view, book = ?snapshot.current_book_id, "screen state saved");
        Ok(())
    }

    /// Applies a fresh snapshot to the navigation state.
    ///
    /// Returns the restored state, or `None` when there was nothing usable.
    /// Stale and corrupt snapshots are removed as a side effect.
    pub fn restore(&mut self) -> Option<NavigationState> {
        let raw = match self.store.get(SCREEN_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read screen state");
                return None;
            }
        };

        let snapshot: ScreenSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let error = TrackerError::CorruptPersistedState {
                    key: SCREEN_STATE_KEY.to_string(),
                    reason: e.to_string(),
                };
                warn!(%error, "discarding corrupt screen state");
                self.discard();
                return None;
            }
        };

        let Some(age_ms) = self.clock.now().timestamp_millis().checked_sub(snapshot.timestamp) else {
            warn!(timestamp = snapshot.timestamp, "screen state timestamp out of range, discarding");
            self.discard();
            return None;
        };
        if age_ms < 0 {
            warn!(skew_ms = age_ms, "screen state saved in the future, discarding");
            self.discard();
            return None;
        }
        if age_ms > STALENESS_WINDOW_SECS * 1000 {
            debug!(age_ms, "screen state is stale, discarding");
            self.discard();
            return None;
        }

        self.navigation = NavigationState {
            view: snapshot.current_view,
            book_id: snapshot.current_book_id,
            tab: snapshot.current_tab,
            showing_archive: snapshot.showing_archive,
        };
        debug!(view = %self.navigation.view, "screen state restored");
        Some(self.navigation)
    }

    /// Removes the snapshot.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SCREEN_STATE_KEY)
    }

    fn discard(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "could not remove screen state");
        }
    }
}
