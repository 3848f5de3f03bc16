//! Card-selection wizard: sign up, pick a card count and banks, then spend.
//!
//! The wizard walks a user through four steps and asks the recommendation
//! backend which card to use. The active step is never stored: it is derived
//! from the collected data every time it is read, so it cannot drift from the
//! inputs that gate it.

pub mod machine;
pub mod manager;
pub mod model;
pub mod routes;
pub mod state;
pub mod validate;

pub use machine::{BankAvailability, BankOption, Wizard};
pub use manager::{Blocked, RecommendOutcome, WizardManager, WizardStatus};
pub use model::{Bank, CardCount, Merchant, Profile, ProfileField, WizardSnapshot};
pub use routes::{WizardRouteState, wizard_routes};
pub use state::{StepProgress, StepStatus, WizardStep};
