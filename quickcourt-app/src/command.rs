use quickcourt_booking::ContactField;

/// One line typed at the booking prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sport(String),
    Date(String),
    Time(String),
    Duration(DurationChange),
    AddCourt(String),
    RemoveCourt(String),
    Contact(ContactField, String),
    Continue,
    /// Type digits starting at the focused slot
    Pin(String),
    /// Write one slot (0-based) directly
    PinSlot(usize, String),
    Backspace,
    Back,
    Confirm,
    Show,
    Options,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationChange {
    By(i32),
    To(u32),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Commands:
  sport <name>                  pick a sport
  date <YYYY-MM-DD>             pick the booking date
  time <HH:MM>                  pick the start time
  duration <+n|-n|n>            change the duration (1-8 hours)
  court add|rm <label>          select or drop a court
  contact name|phone|email <v>  edit contact details
  continue                      go to payment
  pin <digits> | pin <slot> <d> enter the UPI PIN
  backspace                     erase the focused PIN digit
  back                          return to the booking form
  confirm                       pay and create the booking
  show                          print the current page
  options                       list dates, times, sports and courts
  quit";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = split_word(line);
        let command = match word.to_ascii_lowercase().as_str() {
            "sport" => Command::Sport(required(rest, "sport <name>")?),
            "date" => Command::Date(rest.to_string()),
            "time" => Command::Time(rest.to_string()),
            "duration" => Command::Duration(parse_duration(rest)?),
            "court" => {
                let (action, label) = split_word(rest);
                let label = required(label, "court add|rm <label>")?;
                match action {
                    "add" => Command::AddCourt(label),
                    "rm" | "remove" => Command::RemoveCourt(label),
                    _ => return Err(CommandError::Usage("court add|rm <label>")),
                }
            }
            "contact" => {
                let (field, value) = split_word(rest);
                let field = match field {
                    "name" => ContactField::Name,
                    "phone" => ContactField::Phone,
                    "email" => ContactField::Email,
                    _ => return Err(CommandError::Usage("contact name|phone|email <value>")),
                };
                Command::Contact(field, value.to_string())
            }
            "continue" | "next" => Command::Continue,
            "pin" => parse_pin(rest)?,
            "backspace" | "bs" => Command::Backspace,
            "back" => Command::Back,
            "confirm" | "pay" => Command::Confirm,
            "show" => Command::Show,
            "options" => Command::Options,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn required(value: &str, usage: &'static str) -> Result<String, CommandError> {
    if value.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(value.to_string())
}

fn parse_duration(arg: &str) -> Result<DurationChange, CommandError> {
    const USAGE: &str = "duration <+n|-n|n>";
    if arg.starts_with('+') || arg.starts_with('-') {
        arg.parse::<i32>()
            .map(DurationChange::By)
            .map_err(|_| CommandError::Usage(USAGE))
    } else {
        arg.parse::<u32>()
            .map(DurationChange::To)
            .map_err(|_| CommandError::Usage(USAGE))
    }
}

fn parse_pin(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "pin <digits> | pin <slot 1-6> <digit>";
    let (first, second) = split_word(rest);
    if first.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }
    if second.is_empty() {
        return Ok(Command::Pin(first.to_string()));
    }

    let slot: usize = first.parse().map_err(|_| CommandError::Usage(USAGE))?;
    if slot == 0 {
        return Err(CommandError::Usage(USAGE));
    }
    Ok(Command::PinSlot(slot - 1, second.to_string()))
}
