//! Wizard steps: a read-only projection of the wizard's data.

use serde::{Deserialize, Serialize};

/// The four steps of the wizard.
///
/// Progresses linearly: AwaitingAuth → AwaitingCardCount →
/// AwaitingBankSelection → AwaitingSpendEntry. The step is never stored;
/// see [`WizardStep::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    AwaitingAuth,
    AwaitingCardCount,
    AwaitingBankSelection,
    AwaitingSpendEntry,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [WizardStep; 4] = [
        WizardStep::AwaitingAuth,
        WizardStep::AwaitingCardCount,
        WizardStep::AwaitingBankSelection,
        WizardStep::AwaitingSpendEntry,
    ];

    /// Compute the active step from the inputs that gate it.
    ///
    /// A zero `card_count` cannot be produced through `CardCount`, but raw
    /// inputs are accepted so the projection stays total.
    pub fn derive(is_authed: bool, card_count: u8, selected: usize) -> Self {
        if !is_authed {
            Self::AwaitingAuth
        } else if card_count == 0 {
            Self::AwaitingCardCount
        } else if selected != usize::from(card_count) {
            Self::AwaitingBankSelection
        } else {
            Self::AwaitingSpendEntry
        }
    }

    /// One-based position, as shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            Self::AwaitingAuth => 1,
            Self::AwaitingCardCount => 2,
            Self::AwaitingBankSelection => 3,
            Self::AwaitingSpendEntry => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingAuth => "Signup/Login",
            Self::AwaitingCardCount => "Card count",
            Self::AwaitingBankSelection => "Select banks",
            Self::AwaitingSpendEntry => "Spend today",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingAuth => "awaiting_auth",
            Self::AwaitingCardCount => "awaiting_card_count",
            Self::AwaitingBankSelection => "awaiting_bank_selection",
            Self::AwaitingSpendEntry => "awaiting_spend_entry",
        };
        write!(f, "{s}")
    }
}

/// Badge state of one step in the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Current,
    Pending,
}

/// Progress entry for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub step: WizardStep,
    pub number: u8,
    pub label: &'static str,
    pub status: StepStatus,
}

impl StepProgress {
    pub(crate) fn new(step: WizardStep, done: bool, current: WizardStep) -> Self {
        let status = if done {
            StepStatus::Done
        } else if step == current {
            StepStatus::Current
        } else {
            StepStatus::Pending
        };
        Self {
            step,
            number: step.number(),
            label: step.label(),
            status,
        }
    }
}
