//! Wizard data model: profile, card count, banks, merchants and the persisted snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InputError;

/// Sign-up details collected in the first step.
///
/// All four fields are free text; validation happens on submit, not on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    /// Date of birth as `YYYY-MM-DD`.
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub cell: String,
    #[serde(default)]
    pub email: String,
}

impl Profile {
    /// Overwrite one field.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Dob => self.dob = value,
            ProfileField::Cell => self.cell = value,
            ProfileField::Email => self.email = value,
        }
    }
}

/// Addresses a single [`Profile`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Dob,
    Cell,
    Email,
}

impl FromStr for ProfileField {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "dob" => Ok(Self::Dob),
            "cell" => Ok(Self::Cell),
            "email" => Ok(Self::Email),
            _ => Err(InputError::UnknownField(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Dob => "dob",
            Self::Cell => "cell",
            Self::Email => "email",
        };
        write!(f, "{s}")
    }
}

/// Number of cards the user holds, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CardCount(u8);

impl CardCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `n` is outside `1..=5`.
    pub fn new(n: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for CardCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for CardCount {
    type Error = InputError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n).ok_or(InputError::CardCountOutOfRange(i64::from(n)))
    }
}

impl TryFrom<i64> for CardCount {
    type Error = InputError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        u8::try_from(n)
            .ok()
            .and_then(Self::new)
            .ok_or(InputError::CardCountOutOfRange(n))
    }
}

impl From<CardCount> for u8 {
    fn from(count: CardCount) -> Self {
        count.0
    }
}

impl fmt::Display for CardCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Banks a user can pick cards from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "CIBC")]
    Cibc,
    #[serde(rename = "RBC")]
    Rbc,
    Scotiabank,
    #[serde(rename = "TD")]
    Td,
    #[serde(rename = "BMO")]
    Bmo,
}

impl Bank {
    /// Display order.
    pub const ALL: [Bank; 5] = [Bank::Cibc, Bank::Rbc, Bank::Scotiabank, Bank::Td, Bank::Bmo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cibc => "CIBC",
            Self::Rbc => "RBC",
            Self::Scotiabank => "Scotiabank",
            Self::Td => "TD",
            Self::Bmo => "BMO",
        }
    }
}

impl FromStr for Bank {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InputError::UnknownBank(wanted.to_string()))
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the user is spending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Merchant {
    #[default]
    Walmart,
    FreshCo,
    #[serde(rename = "No Frills")]
    NoFrills,
    Loblaws,
    Costco,
    #[serde(rename = "Independent Grocer")]
    IndependentGrocer,
    #[serde(rename = "Canadian Tire")]
    CanadianTire,
    Transport,
    Dining,
}

impl Merchant {
    /// Display order; the first entry is the default selection.
    pub const ALL: [Merchant; 9] = [
        Merchant::Walmart,
        Merchant::FreshCo,
        Merchant::NoFrills,
        Merchant::Loblaws,
        Merchant::Costco,
        Merchant::IndependentGrocer,
        Merchant::CanadianTire,
        Merchant::Transport,
        Merchant::Dining,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walmart => "Walmart",
            Self::FreshCo => "FreshCo",
            Self::NoFrills => "No Frills",
            Self::Loblaws => "Loblaws",
            Self::Costco => "Costco",
            Self::IndependentGrocer => "Independent Grocer",
            Self::CanadianTire => "Canadian Tire",
            Self::Transport => "Transport",
            Self::Dining => "Dining",
        }
    }

    /// The `primary_spend` value the recommendation backend understands.
    ///
    /// The backend has no transport category, so `Transport` is sent as
    /// `"Other"`. Every other merchant, `Dining` included, is sent by name.
    pub fn api_spend(&self) -> &'static str {
        match self {
            Self::Transport => "Other",
            other => other.as_str(),
        }
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Merchant {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|m| squash(m.as_str()) == wanted)
            .ok_or_else(|| InputError::UnknownMerchant(s.trim().to_string()))
    }
}

impl fmt::Display for Merchant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the wizard persists between runs.
///
/// Decoding is lenient: missing fields take their defaults, and an
/// out-of-range count, unknown bank or unknown merchant falls back rather than
/// failing the whole blob. Selection invariants are restored by
/// [`WizardSnapshot::sanitized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    #[serde(default)]
    pub user: Profile,
    #[serde(default)]
    pub is_authed: bool,
    #[serde(default, deserialize_with = "lenient_card_count")]
    pub card_count: CardCount,
    #[serde(default, deserialize_with = "lenient_banks")]
    pub banks: Vec<Bank>,
    #[serde(default, deserialize_with = "lenient_merchant")]
    pub merchant: Merchant,
}

impl WizardSnapshot {
    /// Drop duplicate banks (first wins) and trim the selection to the card count.
    pub fn sanitized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.banks.len());
        self.banks.retain(|b| {
            if seen.contains(b) {
                false
            } else {
                seen.push(*b);
                true
            }
        });
        self.banks.truncate(usize::from(self.card_count.get()));
        self
    }
}

fn lenient_card_count<'de, D>(deserializer: D) -> Result<CardCount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .and_then(CardCount::new)
        .unwrap_or_default())
}

fn lenient_banks<'de, D>(deserializer: D) -> Result<Vec<Bank>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| s.parse().ok())
                .collect()
        })
        .unwrap_or_default())
}

fn lenient_merchant<'de, D>(deserializer: D) -> Result<Merchant, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// Settings keys used for snapshot persistence.
pub mod settings_keys {
    /// Key for the WizardSnapshot JSON blob in the settings table.
    pub const WIZARD_SNAPSHOT: &str = "swipesense_v1";
    /// Default user ID (single-user system).
    pub const DEFAULT_USER: &str = "default";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_has_expected_values() {
        let s = WizardSnapshot::default();
        assert_eq!(s.user, Profile::default());
        assert!(!s.is_authed);
        assert_eq!(s.card_count.get(), 1);
        assert!(s.banks.is_empty());
        assert_eq!(s.merchant, Merchant::Walmart);
    }

    #[test]
    fn card_count_bounds() {
        assert!(CardCount::new(0).is_none());
        assert!(CardCount::new(6).is_none());
        assert_eq!(CardCount::new(5).unwrap().get(), 5);
        assert_eq!(
            CardCount::try_from(-3i64).unwrap_err(),
            InputError::CardCountOutOfRange(-3)
        );
    }

    #[test]
    fn bank_parsing_is_case_insensitive() {
        assert_eq!("td".parse::<Bank>().unwrap(), Bank::Td);
        assert_eq!(" scotiabank ".parse::<Bank>().unwrap(), Bank::Scotiabank);
        assert!(matches!("HSBC".parse::<Bank>(), Err(InputError::UnknownBank(_))));
    }

    #[test]
    fn merchant_parsing_ignores_separators() {
        assert_eq!("no-frills".parse::<Merchant>().unwrap(), Merchant::NoFrills);
        assert_eq!("NoFrills".parse::<Merchant>().unwrap(), Merchant::NoFrills);
        assert_eq!(
            "independent_grocer".parse::<Merchant>().unwrap(),
            Merchant::IndependentGrocer
        );
        assert!("Sobeys".parse::<Merchant>().is_err());
    }

    #[test]
    fn merchant_serializes_with_display_name() {
        let json = serde_json::to_string(&Merchant::CanadianTire).unwrap();
        assert_eq!(json, "\"Canadian Tire\"");
        for m in Merchant::ALL {
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, format!("\"{m}\""));
        }
    }

    #[test]
    fn api_spend_maps_transport_only() {
        assert_eq!(Merchant::Transport.api_spend(), "Other");
        assert_eq!(Merchant::Dining.api_spend(), "Dining");
        assert_eq!(Merchant::NoFrills.api_spend(), "No Frills");
    }

    #[test]
    fn snapshot_uses_web_field_names() {
        let snapshot = WizardSnapshot {
            is_authed: true,
            banks: vec![Bank::Td],
            ..Default::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["isAuthed"], true);
        assert_eq!(json["cardCount"], 1);
        assert_eq!(json["banks"][0], "TD");
        assert_eq!(json["merchant"], "Walmart");
        assert_eq!(json["user"]["dob"], "");
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let parsed: WizardSnapshot =
            serde_json::from_str(r#"{"isAuthed": true, "user": {"name": "Ann"}}"#).unwrap();
        assert!(parsed.is_authed);
        assert_eq!(parsed.user.name, "Ann");
        assert_eq!(parsed.user.email, "");
        assert_eq!(parsed.card_count, CardCount::default());
        assert_eq!(parsed.merchant, Merchant::Walmart);
    }

    #[test]
    fn lenient_fields_fall_back() {
        let parsed: WizardSnapshot = serde_json::from_str(
            r#"{"cardCount": 9, "banks": ["TD", "HSBC", 4, "RBC"], "merchant": "Sobeys"}"#,
        )
        .unwrap();
        assert_eq!(parsed.card_count.get(), 1);
        assert_eq!(parsed.banks, vec![Bank::Td, Bank::Rbc]);
        assert_eq!(parsed.merchant, Merchant::Walmart);
    }

    #[test]
    fn sanitized_dedups_and_truncates() {
        let snapshot = WizardSnapshot {
            card_count: CardCount::new(2).unwrap(),
            banks: vec![Bank::Td, Bank::Td, Bank::Rbc, Bank::Bmo],
            ..Default::default()
        }
        .sanitized();
        assert_eq!(snapshot.banks, vec![Bank::Td, Bank::Rbc]);
    }

    #[test]
    fn profile_field_set() {
        let mut p = Profile::default();
        p.set(ProfileField::Email, "ann@x.com");
        assert_eq!(p.email, "ann@x.com");
        assert_eq!("DOB".parse::<ProfileField>().unwrap(), ProfileField::Dob);
        assert!("phone".parse::<ProfileField>().is_err());
    }
}
