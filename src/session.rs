//! Application state for one interactive user.
//!
//! Everything a front-end needs to remember between events lives in a
//! [`SessionState`]: the output language, the current view, the current
//! mind map, the last error message and the two tutorial flags. It is
//! shared through a cloneable [`SessionHandle`] with explicit read and
//! update methods rather than through globals.
//!
//! ## Request lifecycle
//!
//! ```text
//! Idle ──upload──▶ Generating ──ok──▶ Viewing
//!   ▲                  │
//!   └──────error───────┘
//! ```
//!
//! Only one generation runs at a time: [`SessionHandle::begin_generation`]
//! refuses a second one with [`MindMapError::UploadInProgress`]. A result
//! that arrives after [`SessionHandle::reset`] is discarded. If a
//! [`SessionHandle::process_upload`] future is dropped before it finishes
//! (timeout, aborted task), the session falls back to `Idle`.

use crate::config::GenerationConfig;
use crate::error::MindMapError;
use crate::generate::generate_mind_map_from_document;
use crate::i18n::Language;
use crate::output::MindMapData;
use crate::pipeline::input::Document;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Which view the front-end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Landing page, waiting for a document.
    #[default]
    Idle,
    /// A document is being analysed.
    Generating,
    /// A mind map is on screen.
    Viewing,
}

/// Tutorial overlay to display, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialStep {
    Upload,
    Viewing,
}

impl TutorialStep {
    pub fn title(self, language: Language) -> &'static str {
        let m = language.messages();
        match self {
            TutorialStep::Upload => m.upload_title,
            TutorialStep::Viewing => m.view_title,
        }
    }

    pub fn text(self, language: Language) -> &'static str {
        let m = language.messages();
        match self {
            TutorialStep::Upload => m.upload_text,
            TutorialStep::Viewing => m.view_text,
        }
    }
}

/// Persisted-by-the-caller tutorial markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TutorialFlags {
    pub upload_seen: bool,
    pub view_seen: bool,
}

/// A snapshot of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub language: Language,
    pub app_state: AppState,
    pub mind_map: Option<Arc<MindMapData>>,
    /// Localized message for the last failure, cleared by the next upload.
    pub error: Option<String>,
    pub tutorial: TutorialFlags,
    pub tutorial_step: Option<TutorialStep>,
    /// Bumped by every upload and reset; stale results compare unequal.
    generation: u64,
}

/// Proof that a generation was started; hand it back to `finish_generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// Returns the session to `Idle` if an upload is dropped mid-flight.
struct PendingGeneration {
    inner: Arc<RwLock<SessionState>>,
    ticket: GenerationTicket,
    settled: bool,
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let ticket = self.ticket;
        if let Ok(mut s) = self.inner.try_write() {
            abandon(&mut s, ticket);
            return;
        }
        // Lock is busy; finish the rollback on the runtime if there is one.
        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(async move { abandon(&mut *inner.write().await, ticket) });
            }
            Err(_) => warn!("Generation {} dropped outside a runtime", ticket.0),
        }
    }
}

fn abandon(s: &mut SessionState, ticket: GenerationTicket) {
    if s.generation == ticket.0 && s.app_state == AppState::Generating {
        s.app_state = AppState::Idle;
        debug!("Generation {} abandoned", ticket.0);
    }
}

/// Cloneable handle to a shared [`SessionState`].
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    /// Start a session. The upload tutorial is queued unless already seen.
    pub fn new(language: Language, tutorial: TutorialFlags) -> Self {
        let state = SessionState {
            language,
            tutorial,
            tutorial_step: (!tutorial.upload_seen).then_some(TutorialStep::Upload),
            ..Default::default()
        };
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.read().await.clone()
    }

    pub async fn language(&self) -> Language {
        self.inner.read().await.language
    }

    pub async fn set_language(&self, language: Language) {
        self.inner.write().await.language = language;
    }

    pub async fn app_state(&self) -> AppState {
        self.inner.read().await.app_state
    }

    pub async fn mind_map(&self) -> Option<Arc<MindMapData>> {
        self.inner.read().await.mind_map.clone()
    }

    /// Move to `Generating`, or refuse if a generation is already running.
    pub async fn begin_generation(&self) -> Result<GenerationTicket, MindMapError> {
        let mut s = self.inner.write().await;
        if s.app_state == AppState::Generating {
            return Err(MindMapError::UploadInProgress);
        }
        s.generation += 1;
        s.app_state = AppState::Generating;
        s.error = None;
        s.tutorial_step = None;
        debug!("Generation {} started", s.generation);
        Ok(GenerationTicket(s.generation))
    }

    /// Record the outcome of a generation.
    ///
    /// Success replaces the mind map and shows it; failure returns to
    /// `Idle` with the localized message and leaves the previous mind map
    /// untouched. Outcomes for a stale ticket are ignored.
    pub async fn finish_generation(
        &self,
        ticket: GenerationTicket,
        outcome: &Result<Arc<MindMapData>, MindMapError>,
    ) {
        let mut s = self.inner.write().await;
        if ticket.0 != s.generation {
            warn!("Discarding result of stale generation {}", ticket.0);
            return;
        }
        match outcome {
            Ok(data) => {
                s.mind_map = Some(Arc::clone(data));
                s.app_state = AppState::Viewing;
                if !s.tutorial.view_seen {
                    s.tutorial_step = Some(TutorialStep::Viewing);
                }
            }
            Err(e) => {
                s.error = Some(e.user_message(s.language).to_string());
                s.app_state = AppState::Idle;
            }
        }
    }

    /// Record a validation failure without leaving the current view.
    pub async fn reject(&self, error: &MindMapError) {
        let mut s = self.inner.write().await;
        s.error = Some(error.user_message(s.language).to_string());
    }

    /// Dismiss the tutorial overlay and remember it was seen.
    pub async fn complete_tutorial(&self) -> TutorialFlags {
        let mut s = self.inner.write().await;
        match s.tutorial_step.take() {
            Some(TutorialStep::Upload) => s.tutorial.upload_seen = true,
            Some(TutorialStep::Viewing) => s.tutorial.view_seen = true,
            None => {}
        }
        s.tutorial
    }

    /// Back to the landing view, dropping the current mind map.
    pub async fn reset(&self) {
        let mut s = self.inner.write().await;
        s.generation += 1;
        s.app_state = AppState::Idle;
        s.mind_map = None;
        s.error = None;
    }

    /// Validate, then generate a mind map for `doc` in the session language.
    ///
    /// Rejected documents never enter `Generating`.
    pub async fn process_upload(
        &self,
        doc: &Document,
        config: &GenerationConfig,
    ) -> Result<Arc<MindMapData>, MindMapError> {
        if let Err(e) = doc.kind() {
            self.reject(&e).await;
            return Err(e);
        }

        let ticket = self.begin_generation().await?;
        let mut pending = PendingGeneration {
            inner: Arc::clone(&self.inner),
            ticket,
            settled: false,
        };
        let mut config = config.clone();
        config.language = self.language().await;
        info!("Processing upload '{}' (lang={})", doc.name, config.language);

        let outcome = generate_mind_map_from_document(doc, &config)
            .await
            .map(Arc::new);
        self.finish_generation(ticket, &outcome).await;
        pending.settled = true;
        outcome
    }
}
