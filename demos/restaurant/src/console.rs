//! Text menu for front-of-house operators.
//!
//! The menu reads one answer per line. Bad input and failed operations are
//! reported with an `[ERROR]` line and the menu is shown again; only the exit
//! option or the end of input stops the loop.

use reseasy_core::{
    BookingOutcome, BookingRequest, Money, ReservationError, SlotNumber, SlotSnapshot,
    WaitingRequest,
};
use reseasy_runtime::ReservationEngine;
use std::fmt::Write as _;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::debug;

const MENU: &str = "\n--- Restaurant Reservation Menu ---
1. View table status
2. Book a table
3. Cancel booking
4. Force-release table
5. View waiting list
6. View total revenue
7. Exit
Choose an option: ";

/// One menu option
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show every table
    ViewStatus,
    /// Book a table or join the waiting list
    Book,
    /// Cancel a booking without charge
    Cancel,
    /// End a booking early and bill it
    ForceRelease,
    /// Show the waiting list
    WaitingList,
    /// Show revenue collected so far
    Revenue,
    /// Leave the menu
    Exit,
}

impl Command {
    /// Parse a menu answer such as `"3"`
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ViewStatus),
            "2" => Some(Self::Book),
            "3" => Some(Self::Cancel),
            "4" => Some(Self::ForceRelease),
            "5" => Some(Self::WaitingList),
            "6" => Some(Self::Revenue),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Format a remaining duration as `X min Y sec`
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{} min {} sec", secs / 60, secs % 60)
}

/// Format an amount with its currency prefix, e.g. `Rs. 200.00`
#[must_use]
pub fn format_amount(currency: &str, amount: Money) -> String {
    if currency.is_empty() {
        amount.to_string()
    } else {
        format!("{currency} {amount}")
    }
}

/// Render the table status screen
#[must_use]
pub fn render_status(slots: &[SlotSnapshot]) -> String {
    let mut out = String::from("\n--- Table Status ---\n");
    for slot in slots {
        let _ = match &slot.occupant {
            Some(occupant) => writeln!(
                out,
                "Table {} ({}) - BOOKED by {} [Time left: {}]",
                slot.number,
                slot.tier,
                occupant.name,
                format_remaining(occupant.remaining)
            ),
            None => writeln!(out, "Table {} ({}) - AVAILABLE", slot.number, slot.tier),
        };
    }
    out
}

/// Render the waiting list screen
#[must_use]
pub fn render_waiting(waiting: &[WaitingRequest]) -> String {
    let mut out = String::from("\n--- Waiting List ---\n");
    if waiting.is_empty() {
        out.push_str("No waiting customers.\n");
    }
    for (position, entry) in waiting.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} ({} members)",
            position + 1,
            entry.request.name,
            entry.request.party_size
        );
    }
    out
}

/// Build a booking request from the four raw answers of the booking form
///
/// # Errors
///
/// Returns [`ReservationError::InvalidArgument`] naming the first answer that
/// is not a number, or that fails validation.
pub fn parse_booking(
    name: &str,
    members: &str,
    minutes: &str,
    charge: &str,
) -> Result<BookingRequest, ReservationError> {
    let party_size: u32 = members
        .trim()
        .parse()
        .map_err(|_| ReservationError::invalid("party_size", "expected a whole number"))?;
    let minutes: u64 = minutes
        .trim()
        .parse()
        .map_err(|_| ReservationError::invalid("duration", "expected whole minutes"))?;
    let charge = charge
        .trim()
        .parse::<Money>()
        .map_err(|e| ReservationError::invalid("charge_per_person", e.to_string()))?;

    let request = BookingRequest::minutes(name.trim(), party_size, minutes, charge);
    request.validate()?;
    Ok(request)
}

fn parse_table(input: &str) -> Result<SlotNumber, ReservationError> {
    input
        .trim()
        .parse()
        .map(SlotNumber::new)
        .map_err(|_| ReservationError::invalid("table", "expected a table number"))
}

/// Operator console over a [`ReservationEngine`]
pub struct Console {
    engine: ReservationEngine,
    currency: String,
}

impl Console {
    /// Create a console printing amounts with `currency`
    #[must_use]
    pub fn new(engine: ReservationEngine, currency: impl Into<String>) -> Self {
        Self {
            engine,
            currency: currency.into(),
        }
    }

    /// The engine behind the console
    #[must_use]
    pub const fn engine(&self) -> &ReservationEngine {
        &self.engine
    }

    /// Run the menu until the exit option or the end of `input`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading `input` or writing `output` fails.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let Some(answer) = ask(&mut lines, output, MENU).await? else {
                break;
            };
            let Some(command) = Command::parse(&answer) else {
                say(output, "[ERROR] Invalid option.\n").await?;
                continue;
            };
            debug!(?command, "Menu option chosen");

            let reply = match command {
                Command::ViewStatus => render_status(&self.engine.slot_status()),
                Command::Book => match self.book(&mut lines, output).await? {
                    Some(reply) => reply,
                    None => break,
                },
                Command::Cancel => {
                    let Some(answer) = ask(&mut lines, output, "Enter table number to cancel: ").await?
                    else {
                        break;
                    };
                    self.cancel(&answer)
                }
                Command::ForceRelease => {
                    let Some(answer) =
                        ask(&mut lines, output, "Enter table number to force-release: ").await?
                    else {
                        break;
                    };
                    self.force_release(&answer)
                }
                Command::WaitingList => render_waiting(&self.engine.waiting_list()),
                Command::Revenue => format!(
                    "Total Revenue Collected Today: {}\n",
                    format_amount(&self.currency, self.engine.total_revenue())
                ),
                Command::Exit => {
                    say(output, "Exiting...\n").await?;
                    break;
                }
            };
            say(output, &reply).await?;
        }
        Ok(())
    }

    /// Ask the booking form; `None` if input ran out part way
    async fn book<R, W>(&self, lines: &mut Lines<R>, output: &mut W) -> io::Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut answers = Vec::with_capacity(4);
        for prompt in [
            "Enter customer name: ",
            "Enter number of members: ",
            "Enter reservation time (minutes): ",
            "Enter charge per person: ",
        ] {
            let Some(answer) = ask(lines, output, prompt).await? else {
                return Ok(None);
            };
            answers.push(answer);
        }

        let reply = parse_booking(&answers[0], &answers[1], &answers[2], &answers[3])
            .and_then(|request| self.engine.book(request));
        Ok(Some(match reply {
            Ok(BookingOutcome::Seated { slot }) => {
                format!("[INFO] Table {slot} booked successfully.\n")
            }
            Ok(BookingOutcome::Queued { position, tier }) => format!(
                "[INFO] All {tier} tables are full. Added to waiting list (position {position}).\n"
            ),
            Err(e) => error_line(&e),
        }))
    }

    fn cancel(&self, answer: &str) -> String {
        match parse_table(answer).and_then(|number| {
            self.engine.cancel(number)?;
            Ok(number)
        }) {
            Ok(number) => format!("[INFO] Booking cancelled for Table {number}\n"),
            Err(e) => error_line(&e),
        }
    }

    fn force_release(&self, answer: &str) -> String {
        match parse_table(answer)
            .and_then(|number| self.engine.force_release(number).map(|collected| (number, collected)))
        {
            Ok((number, collected)) => format!(
                "[INFO] Table {number} released. Collected: {}\n",
                format_amount(&self.currency, collected)
            ),
            Err(e) => error_line(&e),
        }
    }
}

fn error_line(error: &ReservationError) -> String {
    format!("[ERROR] {error}\n")
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

async fn ask<R, W>(lines: &mut Lines<R>, output: &mut W, prompt: &str) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    say(output, prompt).await?;
    lines.next_line().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reseasy_core::{OccupantSnapshot, Tier};

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_secs(0)), "0 min 0 sec");
        assert_eq!(format_remaining(Duration::from_secs(59)), "0 min 59 sec");
        assert_eq!(format_remaining(Duration::from_millis(125_900)), "2 min 5 sec");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("Rs.", Money::from_major(200)), "Rs. 200.00");
        assert_eq!(format_amount("", Money::from_minor(5)), "0.05");
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(" 4 "), Some(Command::ForceRelease));
        assert_eq!(Command::parse("7"), Some(Command::Exit));
        assert_eq!(Command::parse("8"), None);
        assert_eq!(Command::parse("book"), None);
    }

    #[test]
    fn test_parse_booking() {
        let request = parse_booking(" Asha ", "3", "45", "120.5").unwrap();
        assert_eq!(request.name, "Asha");
        assert_eq!(request.duration, Duration::from_secs(45 * 60));
        assert_eq!(request.bill(), Money::from_minor(36_150));

        let err = parse_booking("Asha", "three", "45", "120").unwrap_err();
        assert!(matches!(err, ReservationError::InvalidArgument { field: "party_size", .. }));
        let err = parse_booking("Asha", "3", "45", "1.234").unwrap_err();
        assert!(matches!(
            err,
            ReservationError::InvalidArgument { field: "charge_per_person", .. }
        ));
        let err = parse_booking("", "3", "45", "10").unwrap_err();
        assert!(matches!(err, ReservationError::InvalidArgument { field: "name", .. }));
    }

    #[test]
    fn test_render_status() {
        let slots = vec![
            SlotSnapshot {
                number: SlotNumber::new(1),
                tier: Tier::new(2),
                occupant: Some(OccupantSnapshot {
                    name: "Ravi".to_string(),
                    party_size: 2,
                    charge_per_person: Money::from_major(100),
                    duration: Duration::from_secs(60),
                    remaining: Duration::from_secs(42),
                }),
            },
            SlotSnapshot {
                number: SlotNumber::new(2),
                tier: Tier::new(4),
                occupant: None,
            },
        ];
        let screen = render_status(&slots);
        assert!(screen.contains("Table 1 (2-seater) - BOOKED by Ravi [Time left: 0 min 42 sec]"));
        assert!(screen.contains("Table 2 (4-seater) - AVAILABLE"));
    }

    #[test]
    fn test_render_empty_waiting_list() {
        assert!(render_waiting(&[]).contains("No waiting customers."));
    }
}
