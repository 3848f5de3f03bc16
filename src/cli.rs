//! Terminal front end: a stdin REPL driving the wizard.

use std::str::FromStr;

use futures::stream::{self, Stream, StreamExt};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::InputError;
use crate::wizard::{
    BankAvailability, Blocked, RecommendOutcome, StepStatus, WizardManager, WizardStatus,
    WizardStep,
};
use crate::wizard::model::{Bank, CardCount, Merchant, ProfileField};

pub const HELP: &str = "\
Commands:
  name <text> | dob <YYYY-MM-DD> | cell <text> | email <text>
  continue                 submit your details
  cards <1-5>              how many cards you have
  bank <name>              select / deselect a bank (CIBC, RBC, Scotiabank, TD, BMO)
  merchant <name>          where you are spending today
  recommend                ask for a card recommendation
  health                   check the recommendation service
  tx <category> <amount>   which card for a single purchase
  status | reset | help | /quit";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetField(ProfileField, String),
    Continue,
    Cards(CardCount),
    Bank(Bank),
    Merchant(Merchant),
    Recommend,
    Health,
    Transaction { category: String, amount: Decimal },
    Status,
    Reset,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();

        match verb.as_str() {
            "name" | "dob" | "cell" | "email" => {
                let field = verb.parse::<ProfileField>()?;
                Ok(Self::SetField(field, rest.to_string()))
            }
            "continue" | "signup" | "login" => Ok(Self::Continue),
            "cards" => {
                let raw = require(rest, "cards")?;
                let n: i64 = raw
                    .parse()
                    .map_err(|_| InputError::InvalidNumber(raw.to_string()))?;
                Ok(Self::Cards(CardCount::try_from(n)?))
            }
            "bank" => Ok(Self::Bank(require(rest, "bank")?.parse()?)),
            "merchant" => Ok(Self::Merchant(require(rest, "merchant")?.parse()?)),
            "recommend" => Ok(Self::Recommend),
            "health" => Ok(Self::Health),
            "tx" => {
                let raw = require(rest, "tx")?;
                let (category, amount) = raw
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| InputError::MissingArgument("tx".to_string()))?;
                let amount = Decimal::from_str(amount.trim())
                    .map_err(|_| InputError::InvalidNumber(amount.trim().to_string()))?;
                Ok(Self::Transaction {
                    category: category.trim().to_string(),
                    amount,
                })
            }
            "status" | "" => Ok(Self::Status),
            "reset" => Ok(Self::Reset),
            "help" | "?" => Ok(Self::Help),
            "/quit" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

fn require<'a>(rest: &'a str, verb: &str) -> Result<&'a str, InputError> {
    if rest.is_empty() {
        Err(InputError::MissingArgument(verb.to_string()))
    } else {
        Ok(rest)
    }
}

/// Apply a command and return the text to show. `Quit` is handled by the caller.
pub async fn execute(manager: &WizardManager, command: Command) -> String {
    match command {
        Command::SetField(field, value) => {
            manager.set_profile_field(field, value).await;
            format!("Saved {field}.")
        }
        Command::Continue => match manager.submit_auth().await {
            Ok(()) => render_status(&manager.status().await),
            Err(e) => format!("⚠️  {e}"),
        },
        Command::Cards(count) => {
            manager.set_card_count(count).await;
            render_status(&manager.status().await)
        }
        Command::Bank(bank) => {
            if manager.toggle_bank(bank).await {
                render_status(&manager.status().await)
            } else {
                format!("Limit reached: deselect a bank before adding {bank}.")
            }
        }
        Command::Merchant(merchant) => {
            manager.set_merchant(merchant).await;
            format!("Spending at {merchant}.")
        }
        Command::Recommend => match manager.get_recommendation().await {
            RecommendOutcome::Ready(_) => render_status(&manager.status().await),
            RecommendOutcome::Failed(e) => format!("❌ {}", e.user_message()),
            RecommendOutcome::Blocked(Blocked::NotConnected) => {
                "❌ Not connected. Run 'health' once the service is up.".to_string()
            }
            RecommendOutcome::Blocked(reason) => format!("⏳ {reason}"),
        },
        Command::Health => {
            if manager.probe_health().await {
                "✅ Connected".to_string()
            } else {
                "❌ Not connected".to_string()
            }
        }
        Command::Transaction { category, amount } => {
            match manager.check_transaction(category, amount).await {
                Ok(advice) => format!("Use {}: {}", advice.card, advice.reason),
                Err(e) => format!("❌ {}", e.user_message()),
            }
        }
        Command::Status => render_status(&manager.status().await),
        Command::Reset => {
            manager.reset().await;
            render_status(&manager.status().await)
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

/// Render the progress bar, feedback, and the prompt for the active step.
pub fn render_status(status: &WizardStatus) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Backend: {} ({})",
        if status.connected {
            "✅ Connected"
        } else {
            "❌ Not connected"
        },
        status.api_base
    ));

    let badges: Vec<String> = status
        .progress
        .iter()
        .map(|p| {
            let mark = match p.status {
                StepStatus::Done => "done",
                StepStatus::Current => "current",
                StepStatus::Pending => "pending",
            };
            format!("[{}) {}: {}]", p.number, p.label, mark)
        })
        .collect();
    lines.push(format!("Progress: {}", badges.join(" ")));

    if let Some(ref error) = status.error {
        lines.push(format!("⚠️  {error}"));
    }

    let snapshot = &status.snapshot;
    match status.step {
        WizardStep::AwaitingAuth => {
            lines.push("1) Signup / Login: enter your details, then 'continue'.".to_string());
            let user = &snapshot.user;
            for (label, value) in [
                ("name", &user.name),
                ("dob", &user.dob),
                ("cell", &user.cell),
                ("email", &user.email),
            ] {
                let shown = if value.is_empty() { "-" } else { value.as_str() };
                lines.push(format!("   {label}: {shown}"));
            }
        }
        WizardStep::AwaitingCardCount => {
            lines.push("2) How many cards do you have? 'cards <1-5>'".to_string());
        }
        WizardStep::AwaitingBankSelection => {
            lines.push(format!(
                "3) Pick exactly {} banks. (Selected: {})",
                snapshot.card_count,
                snapshot.banks.len()
            ));
            for option in &status.bank_options {
                let note = match option.availability {
                    BankAvailability::Selected => "selected",
                    BankAvailability::LimitReached => "limit reached",
                    BankAvailability::Available => "tap to select",
                };
                lines.push(format!("   {:<11} {note}", option.bank.as_str()));
            }
            lines.push(format!(
                "   Select {} more to continue.",
                status.banks_remaining
            ));
        }
        WizardStep::AwaitingSpendEntry => {
            let banks: Vec<&str> = snapshot.banks.iter().map(|b| b.as_str()).collect();
            lines.push(format!(
                "4) Spending at {} with {}. 'merchant <name>' to change, 'recommend' to ask.",
                snapshot.merchant,
                banks.join(", ")
            ));
        }
    }

    if status.loading {
        lines.push("Checking...".to_string());
    }

    if let Some(ref result) = status.result {
        lines.push(format!("💳 Recommendation: {}", result.card));
        lines.push(format!("   {}", result.reason));
    }

    lines.join("\n")
}

/// Non-empty, trimmed lines from stdin until EOF.
pub fn stdin_lines() -> impl Stream<Item = String> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        eprint!("> ");
                        continue;
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|line| (line, rx)) })
}

/// Run the REPL until `/quit` or EOF.
pub async fn run_repl<S>(manager: &WizardManager, input: S)
where
    S: Stream<Item = String>,
{
    let mut input = std::pin::pin!(input);
    println!("{}\n", render_status(&manager.status().await));
    eprint!("> ");

    while let Some(line) = input.next().await {
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => println!("\n{}\n", execute(manager, command).await),
            Err(e) => println!("\n{e}\n"),
        }
        eprint!("> ");
    }
}
