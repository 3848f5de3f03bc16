//! The wizard state machine.
//!
//! `Wizard` owns the form data plus the transient error and result slots. The
//! active step is recomputed from that data on every read and never stored.

use serde::Serialize;

use crate::config::RequestDefaults;
use crate::error::ValidationError;
use crate::recommend::{Recommendation, RecommendationRequest};

use super::model::{Bank, CardCount, Merchant, Profile, ProfileField, WizardSnapshot};
use super::state::{StepProgress, WizardStep};
use super::validate::validate_profile;

/// Whether a bank can currently be toggled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BankAvailability {
    Selected,
    LimitReached,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankOption {
    pub bank: Bank,
    pub availability: BankAvailability,
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
    snapshot: WizardSnapshot,
    error: Option<String>,
    result: Option<Recommendation>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted snapshot, repairing selection invariants.
    pub fn from_snapshot(snapshot: WizardSnapshot) -> Self {
        Self {
            snapshot: snapshot.sanitized(),
            error: None,
            result: None,
        }
    }

    pub fn snapshot(&self) -> &WizardSnapshot {
        &self.snapshot
    }

    pub fn profile(&self) -> &Profile {
        &self.snapshot.user
    }

    pub fn is_authed(&self) -> bool {
        self.snapshot.is_authed
    }

    pub fn card_count(&self) -> CardCount {
        self.snapshot.card_count
    }

    pub fn banks(&self) -> &[Bank] {
        &self.snapshot.banks
    }

    pub fn merchant(&self) -> Merchant {
        self.snapshot.merchant
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&Recommendation> {
        self.result.as_ref()
    }

    /// The active step, derived fresh from the current data.
    pub fn step(&self) -> WizardStep {
        WizardStep::derive(
            self.snapshot.is_authed,
            self.snapshot.card_count.get(),
            self.snapshot.banks.len(),
        )
    }

    /// Badge state for each of the four steps.
    pub fn progress(&self) -> [StepProgress; 4] {
        let current = self.step();
        let authed = self.snapshot.is_authed;
        let count = usize::from(self.snapshot.card_count.get());
        [
            StepProgress::new(WizardStep::AwaitingAuth, authed, current),
            StepProgress::new(WizardStep::AwaitingCardCount, authed && count > 0, current),
            StepProgress::new(
                WizardStep::AwaitingBankSelection,
                authed && self.snapshot.banks.len() == count,
                current,
            ),
            StepProgress::new(WizardStep::AwaitingSpendEntry, self.result.is_some(), current),
        ]
    }

    /// How many more banks must be picked to match the card count.
    pub fn banks_remaining(&self) -> usize {
        usize::from(self.snapshot.card_count.get()).saturating_sub(self.snapshot.banks.len())
    }

    pub fn bank_options(&self) -> Vec<BankOption> {
        let full = self.snapshot.banks.len() >= usize::from(self.snapshot.card_count.get());
        Bank::ALL
            .into_iter()
            .map(|bank| {
                let availability = if self.snapshot.banks.contains(&bank) {
                    BankAvailability::Selected
                } else if full {
                    BankAvailability::LimitReached
                } else {
                    BankAvailability::Available
                };
                BankOption { bank, availability }
            })
            .collect()
    }

    /// Write one profile field. Nothing is validated until [`Wizard::submit_auth`].
    pub fn set_profile_field(&mut self, field: ProfileField, value: impl Into<String>) {
        self.snapshot.user.set(field, value);
    }

    /// Validate the profile and, if it passes, mark the user as signed in.
    ///
    /// On failure the message is also placed in the error slot and the auth
    /// flag is left untouched.
    pub fn submit_auth(&mut self) -> Result<(), ValidationError> {
        self.clear_feedback();
        match validate_profile(&self.snapshot.user) {
            Ok(()) => {
                self.snapshot.is_authed = true;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Set the card count, keeping only the first `count` selected banks.
    pub fn set_card_count(&mut self, count: CardCount) {
        self.snapshot.card_count = count;
        self.snapshot.banks.truncate(usize::from(count.get()));
        self.clear_feedback();
    }

    /// Select or deselect a bank. Returns whether anything changed.
    ///
    /// Deselecting always succeeds. Selecting a new bank once the selection is
    /// full is ignored.
    pub fn toggle_bank(&mut self, bank: Bank) -> bool {
        if let Some(pos) = self.snapshot.banks.iter().position(|b| *b == bank) {
            self.snapshot.banks.remove(pos);
        } else if self.snapshot.banks.len() >= usize::from(self.snapshot.card_count.get()) {
            return false;
        } else {
            self.snapshot.banks.push(bank);
        }
        self.clear_feedback();
        true
    }

    pub fn set_merchant(&mut self, merchant: Merchant) {
        self.snapshot.merchant = merchant;
        self.clear_feedback();
    }

    /// Back to a blank wizard.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Request body for the current merchant selection.
    pub fn build_recommendation_request(
        &self,
        defaults: &RequestDefaults,
    ) -> RecommendationRequest {
        RecommendationRequest::for_merchant(self.snapshot.merchant, defaults)
    }

    pub fn set_result(&mut self, result: Recommendation) {
        self.error = None;
        self.result = Some(result);
    }

    /// Show a failure message, dropping any stale result.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.result = None;
        self.error = Some(message.into());
    }

    pub fn clear_feedback(&mut self) {
        self.error = None;
        self.result = None;
    }
}
