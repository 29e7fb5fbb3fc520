/// Commands available at the account level, outside any character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAction {
    Look,
    Create,
    Ic(String),
    Quit,
    Help,
    Unknown(String),
}

/// Commands the account layer intercepts while a character is puppeted.
/// Everything else belongs to the game's own command loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuppetAction {
    Ooc,
    Quit,
    Game(String),
}

fn split_command(input: &str) -> (String, &str) {
    let trimmed = input.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    }
}

/// Parse raw account-level input.
pub fn parse_account_input(input: &str) -> AccountAction {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return AccountAction::Look;
    }

    let (cmd, arg) = split_command(trimmed);
    match cmd.as_str() {
        "look" | "l" => AccountAction::Look,
        "create" | "charcreate" => AccountAction::Create,
        "ic" | "puppet" => {
            if arg.is_empty() {
                AccountAction::Unknown("Play which character?".to_string())
            } else {
                AccountAction::Ic(arg.to_string())
            }
        }
        "quit" | "q" => AccountAction::Quit,
        "help" | "?" => AccountAction::Help,
        _ => AccountAction::Unknown(format!("Unknown command '{trimmed}'. Type '`chelp`x' for a list.")),
    }
}

pub fn parse_puppet_input(input: &str) -> PuppetAction {
    let (cmd, _) = split_command(input);
    match cmd.as_str() {
        "ooc" | "unpuppet" => PuppetAction::Ooc,
        "quit" => PuppetAction::Quit,
        _ => PuppetAction::Game(input.trim().to_string()),
    }
}

pub const ACCOUNT_COMMANDS: &str = "Account commands`Y:`x
  `clook`x              show your account
  `ccreate`x            create a character, or resume the one in progress
  `cic <name>`x         play one of your characters, or resume creation by its key
  `cquit`x              log out";
