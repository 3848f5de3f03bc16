//! WizardManager coordinates the wizard, snapshot persistence and the
//! recommendation backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::RequestDefaults;
use crate::error::{RequestError, ValidationError};
use crate::recommend::{Recommendation, RecommendationClient, Transaction};
use crate::store::SnapshotStore;

use super::machine::{BankOption, Wizard};
use super::model::{Bank, CardCount, Merchant, ProfileField, WizardSnapshot};
use super::state::{StepProgress, WizardStep};

/// Why a recommendation request was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocked {
    /// The bank selection (or an earlier step) is not finished.
    IncompleteSelection,
    /// The last health probe reported the backend as unreachable.
    NotConnected,
    /// Another request is still pending.
    InFlight,
    /// The wizard changed before the reply arrived; the reply was dropped.
    Superseded,
}

impl std::fmt::Display for Blocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::IncompleteSelection => "Finish the earlier steps first.",
            Self::NotConnected => "The recommendation service is not connected.",
            Self::InFlight => "A recommendation request is already in progress.",
            Self::Superseded => "Your selections changed while waiting. Ask again.",
        };
        f.write_str(s)
    }
}

/// Outcome of [`WizardManager::get_recommendation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendOutcome {
    Ready(Recommendation),
    Failed(RequestError),
    Blocked(Blocked),
}

/// Serializable view of the whole wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStatus {
    pub step: WizardStep,
    pub step_number: u8,
    pub progress: [StepProgress; 4],
    pub snapshot: WizardSnapshot,
    pub bank_options: Vec<BankOption>,
    pub banks_remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Recommendation>,
    pub loading: bool,
    pub connected: bool,
    pub api_base: String,
}

/// Clears `loading` when dropped, so an aborted request cannot wedge the flag.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the wizard and its collaborators.
///
/// The store is read once in [`WizardManager::load`] and written after every
/// state change. Store writes happen under the wizard write lock, so they land
/// in the same order as the changes they record. The lock is never held across
/// a network call.
pub struct WizardManager {
    store: Arc<dyn SnapshotStore>,
    client: Arc<dyn RecommendationClient>,
    defaults: RequestDefaults,
    wizard: RwLock<Wizard>,
    loading: AtomicBool,
    connected: AtomicBool,
    /// Bumped by every change that invalidates a pending recommendation.
    generation: AtomicU64,
}

impl WizardManager {
    /// Restore the wizard from the store; absent or unreadable state starts fresh.
    pub async fn load(
        store: Arc<dyn SnapshotStore>,
        client: Arc<dyn RecommendationClient>,
        defaults: RequestDefaults,
    ) -> Self {
        let wizard = match store.load().await {
            Ok(Some(snapshot)) => {
                info!("Restored saved wizard state");
                Wizard::from_snapshot(snapshot)
            }
            Ok(None) => Wizard::new(),
            Err(e) => {
                warn!("Failed to load wizard state, starting fresh: {}", e);
                Wizard::new()
            }
        };

        Self {
            store,
            client,
            defaults,
            wizard: RwLock::new(wizard),
            loading: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn step(&self) -> WizardStep {
        self.wizard.read().await.step()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> WizardStatus {
        let wizard = self.wizard.read().await;
        let step = wizard.step();
        WizardStatus {
            step,
            step_number: step.number(),
            progress: wizard.progress(),
            snapshot: wizard.snapshot().clone(),
            bank_options: wizard.bank_options(),
            banks_remaining: wizard.banks_remaining(),
            error: wizard.error().map(String::from),
            result: wizard.result().cloned(),
            loading: self.is_loading(),
            connected: self.is_connected(),
            api_base: self.client.base_url().to_string(),
        }
    }

    pub async fn set_profile_field(&self, field: ProfileField, value: impl Into<String>) {
        let mut wizard = self.wizard.write().await;
        wizard.set_profile_field(field, value);
        debug!(%field, "Profile field updated");
        self.persist(wizard.snapshot()).await;
    }

    pub async fn submit_auth(&self) -> Result<(), ValidationError> {
        let mut wizard = self.wizard.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let outcome = wizard.submit_auth();
        match outcome {
            Ok(()) => {
                info!("Profile accepted");
                self.persist(wizard.snapshot()).await;
            }
            Err(e) => debug!(error = %e, "Profile rejected"),
        }
        outcome
    }

    pub async fn set_card_count(&self, count: CardCount) {
        let mut wizard = self.wizard.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        wizard.set_card_count(count);
        debug!(%count, "Card count set");
        self.persist(wizard.snapshot()).await;
    }

    /// Returns whether the selection changed.
    pub async fn toggle_bank(&self, bank: Bank) -> bool {
        let mut wizard = self.wizard.write().await;
        if !wizard.toggle_bank(bank) {
            debug!(%bank, "Bank selection full, toggle ignored");
            return false;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        debug!(%bank, "Bank toggled");
        self.persist(wizard.snapshot()).await;
        true
    }

    pub async fn set_merchant(&self, merchant: Merchant) {
        let mut wizard = self.wizard.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        wizard.set_merchant(merchant);
        debug!(%merchant, "Merchant set");
        self.persist(wizard.snapshot()).await;
    }

    /// Start over and discard the saved snapshot.
    pub async fn reset(&self) {
        let mut wizard = self.wizard.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        wizard.reset();
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear wizard state: {}", e);
        }
        info!("Wizard reset");
    }

    /// Check the backend and remember the answer.
    pub async fn probe_health(&self) -> bool {
        let connected = self.client.probe_health().await.connected;
        self.connected.store(connected, Ordering::Release);
        debug!(connected, "Health probe finished");
        connected
    }

    /// Ask the backend for a card for the current merchant.
    ///
    /// At most one request is in flight; the outcome also lands in the
    /// wizard's result or error slot, unless the wizard changed meanwhile.
    pub async fn get_recommendation(&self) -> RecommendOutcome {
        let (started, request) = {
            let mut wizard = self.wizard.write().await;
            if wizard.step() != WizardStep::AwaitingSpendEntry {
                return RecommendOutcome::Blocked(Blocked::IncompleteSelection);
            }
            if !self.is_connected() {
                return RecommendOutcome::Blocked(Blocked::NotConnected);
            }
            if self
                .loading
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return RecommendOutcome::Blocked(Blocked::InFlight);
            }
            wizard.clear_feedback();
            let started = self.generation.load(Ordering::Acquire);
            (started, wizard.build_recommendation_request(&self.defaults))
        };
        let _guard = LoadingGuard(&self.loading);

        debug!(primary_spend = %request.primary_spend, "Requesting recommendation");
        let outcome = self.client.request_recommendation(&request).await;

        let mut wizard = self.wizard.write().await;
        if self.generation.load(Ordering::Acquire) != started {
            debug!("Wizard changed while the request was pending, dropping outcome");
            return RecommendOutcome::Blocked(Blocked::Superseded);
        }
        match outcome {
            Ok(recommendation) => {
                info!(card = %recommendation.card, "Recommendation received");
                wizard.set_result(recommendation.clone());
                RecommendOutcome::Ready(recommendation)
            }
            Err(e) => {
                warn!(error = %e, "Recommendation request failed");
                wizard.set_error(e.user_message());
                RecommendOutcome::Failed(e)
            }
        }
    }

    /// Ask which card to use for a single purchase. Wizard state is untouched.
    pub async fn check_transaction(
        &self,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Result<Recommendation, RequestError> {
        let transaction = Transaction {
            category: category.into(),
            amount,
        };
        self.client.request_transaction_advice(&transaction).await
    }

    async fn persist(&self, snapshot: &WizardSnapshot) {
        if let Err(e) = self.store.save(snapshot).await {
            warn!("Failed to persist wizard state: {}", e);
        }
    }
}
