//! One player connection: routes each input line to whichever layer owns
//! the session right now (login dialogue, creation dialogue, account menu
//! or a puppeted character) and switches layers on dialogue outcomes.

use session::{PlayerSession, SessionOutput, SessionState};

use crate::chargen::{self, ChargenMenu, ChargenOutcome};
use crate::dialogue::{Caller, Dialogue, Menu, Step};
use crate::error::ChargenError;
use crate::host::{AccountGate, AccountRef, CharacterVault, GameHost, PlayableCharacter};
use crate::login::{LoginMenu, LoginNode, LoginOutcome, LoginState};
use crate::ooc::{parse_account_input, parse_puppet_input, AccountAction, PuppetAction, ACCOUNT_COMMANDS};
use crate::roster::account_overview;
use crate::rules::{ChargenRules, GameClock};
use crate::screens::{CONNECTION_SCREEN, OOC_LOOK};

const GOODBYE: &str = "Logging off. We hope to see you soon!";
const LOGIN_FAILED: &str = "Please try connecting again later.";

pub enum Phase {
    Login(Menu<LoginMenu>),
    Chargen(Menu<ChargenMenu>),
    Ooc { account: AccountRef },
    Playing { account: AccountRef, character: PlayableCharacter },
    Closed,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Login(_) => "login",
            Phase::Chargen(_) => "chargen",
            Phase::Ooc { .. } => "ooc",
            Phase::Playing { .. } => "playing",
            Phase::Closed => "closed",
        }
    }
}

pub struct Connection {
    rules: ChargenRules,
    /// Fixed calendar for creation; the real one when `None`.
    clock: Option<GameClock>,
    phase: Phase,
}

fn gate<H: AccountGate + 'static>(host: &mut H) -> &mut (dyn AccountGate + 'static) {
    host
}

fn vault<H: CharacterVault + 'static>(host: &mut H) -> &mut (dyn CharacterVault + 'static) {
    host
}

/// Whether `name` is the placeholder key of the account's unfinished character.
fn pending_key_matches<H: GameHost + 'static>(host: &H, account: &AccountRef, name: &str) -> bool {
    match host.in_progress(account.id) {
        Ok(pending) => pending.is_some_and(|p| p.key.eq_ignore_ascii_case(name)),
        Err(e) => {
            tracing::warn!(account = account.id.0, error = %e, "in-progress lookup failed");
            false
        }
    }
}

/// Enter a menu, or feed it one line.
fn drive<D: Dialogue>(
    menu: &mut Menu<D>,
    session: &mut PlayerSession,
    host: &mut D::Host,
    outbox: &mut Vec<SessionOutput>,
    line: Option<&str>,
) -> Step<D::Outcome> {
    let mut caller = Caller::new(session, host, outbox);
    match line {
        Some(line) => menu.input(&mut caller, line),
        None => menu.enter(&mut caller),
    }
}

impl Connection {
    /// Greet a new session and start the login dialogue.
    pub fn open<H: GameHost + 'static>(
        session: &mut PlayerSession,
        host: &mut H,
        rules: ChargenRules,
    ) -> (Self, Vec<SessionOutput>) {
        let mut outbox = vec![SessionOutput::new(session.session_id, CONNECTION_SCREEN)];
        let mut menu = Menu::new(LoginMenu, LoginNode::EnterUsername, LoginState::default());
        let step = drive(&mut menu, session, gate(host), &mut outbox, None);

        let mut conn = Self {
            rules,
            clock: None,
            phase: Phase::Closed,
        };
        conn.phase = conn.after_login(menu, step, session, host, &mut outbox);
        tracing::info!(session = session.session_id.0, address = %session.address, "connection opened");
        (conn, outbox)
    }

    pub fn with_clock(mut self, clock: GameClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    pub fn handle_line<H: GameHost + 'static>(
        &mut self,
        session: &mut PlayerSession,
        host: &mut H,
        line: &str,
    ) -> Vec<SessionOutput> {
        let mut outbox = Vec::new();
        let phase = std::mem::replace(&mut self.phase, Phase::Closed);
        self.phase = match phase {
            Phase::Login(mut menu) => {
                let step = drive(&mut menu, session, gate(host), &mut outbox, Some(line));
                self.after_login(menu, step, session, host, &mut outbox)
            }
            Phase::Chargen(mut menu) => {
                let step = drive(&mut menu, session, vault(host), &mut outbox, Some(line));
                let account = menu.state().account.clone();
                self.after_chargen(menu, step, account, session, host, &mut outbox)
            }
            Phase::Ooc { account } => self.account_command(account, session, host, &mut outbox, line),
            Phase::Playing { account, character } => {
                self.puppet_command(account, character, session, host, &mut outbox, line)
            }
            Phase::Closed => {
                tracing::debug!(session = session.session_id.0, "input on closed connection ignored");
                Phase::Closed
            }
        };
        if session.state == SessionState::Disconnected {
            self.phase = Phase::Closed;
        }
        outbox
    }

    /// The transport went away. Any running creation is dropped without
    /// committing.
    pub fn disconnect(&mut self, session: &mut PlayerSession, reason: &str) -> Vec<SessionOutput> {
        let phase = std::mem::replace(&mut self.phase, Phase::Closed);
        if let Phase::Chargen(menu) = &phase {
            tracing::info!(
                session = session.session_id.0,
                character = menu.state().character.0,
                "disconnected during character creation, draft discarded"
            );
        }
        if matches!(phase, Phase::Closed) && session.state == SessionState::Disconnected {
            return Vec::new();
        }
        vec![session.disconnect(reason)]
    }

    fn after_login<H: GameHost + 'static>(
        &self,
        menu: Menu<LoginMenu>,
        step: Step<LoginOutcome>,
        session: &mut PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
    ) -> Phase {
        match step {
            Step::Continue => Phase::Login(menu),
            Step::Finished(LoginOutcome::Disconnected) => Phase::Closed,
            Step::Finished(LoginOutcome::Play { account, character }) => {
                self.enter_character(account, character, session, outbox)
            }
            Step::Finished(LoginOutcome::CreateCharacter { account }) => {
                self.start_chargen(account, session, host, outbox)
            }
            Step::Aborted(_) => {
                outbox.push(session.disconnect(LOGIN_FAILED));
                Phase::Closed
            }
        }
    }

    fn after_chargen<H: GameHost + 'static>(
        &self,
        menu: Menu<ChargenMenu>,
        step: Step<ChargenOutcome>,
        account: AccountRef,
        session: &mut PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
    ) -> Phase {
        match step {
            Step::Continue => Phase::Chargen(menu),
            Step::Finished(ChargenOutcome::Committed(character)) => {
                self.enter_character(account, character, session, outbox)
            }
            Step::Finished(ChargenOutcome::Abandoned) | Step::Aborted(_) => {
                session.unpuppet();
                self.look(&account, session, host, outbox);
                Phase::Ooc { account }
            }
        }
    }

    fn start_chargen<H: GameHost + 'static>(
        &self,
        account: AccountRef,
        session: &mut PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
    ) -> Phase {
        let clock = self.clock.unwrap_or_else(|| self.rules.clock());
        match chargen::begin(vault(host), &account, &self.rules, clock) {
            Ok(mut menu) => {
                session.begin_creation(menu.state().character.0);
                let step = drive(&mut menu, session, vault(host), outbox, None);
                self.after_chargen(menu, step, account, session, host, outbox)
            }
            Err(ChargenError::RosterFull(count)) => {
                outbox.push(SessionOutput::new(
                    session.session_id,
                    format!("You already have {count} characters, the most one account may hold."),
                ));
                Phase::Ooc { account }
            }
            Err(e) => {
                tracing::error!(account = account.id.0, error = %e, "could not start character creation");
                outbox.push(SessionOutput::new(
                    session.session_id,
                    "`RCharacter creation is unavailable right now.`x",
                ));
                Phase::Ooc { account }
            }
        }
    }

    fn enter_character(
        &self,
        account: AccountRef,
        character: PlayableCharacter,
        session: &mut PlayerSession,
        outbox: &mut Vec<SessionOutput>,
    ) -> Phase {
        session.puppet(character.id.0, &character.name);
        outbox.push(SessionOutput::new(
            session.session_id,
            format!("You become `c{}`x.", character.name),
        ));
        Phase::Playing { account, character }
    }

    fn look<H: GameHost + 'static>(
        &self,
        account: &AccountRef,
        session: &PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
    ) {
        outbox.push(SessionOutput::new(session.session_id, OOC_LOOK));
        match host.roster(account.id) {
            Ok(roster) => outbox.push(SessionOutput::new(
                session.session_id,
                account_overview(&account.username, &roster),
            )),
            Err(e) => tracing::warn!(account = account.id.0, error = %e, "roster unavailable"),
        }
    }

    fn account_command<H: GameHost + 'static>(
        &self,
        account: AccountRef,
        session: &mut PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
        line: &str,
    ) -> Phase {
        match parse_account_input(line) {
            AccountAction::Look => {
                self.look(&account, session, host, outbox);
                Phase::Ooc { account }
            }
            AccountAction::Create => self.start_chargen(account, session, host, outbox),
            AccountAction::Ic(name) => match host.find_playable(account.id, &name) {
                Ok(Some(character)) => self.enter_character(account, character, session, outbox),
                Ok(None) if pending_key_matches(host, &account, &name) => {
                    self.start_chargen(account, session, host, outbox)
                }
                Ok(None) => {
                    outbox.push(SessionOutput::new(
                        session.session_id,
                        format!("You have no character named '`c{name}`x'."),
                    ));
                    Phase::Ooc { account }
                }
                Err(e) => {
                    tracing::error!(account = account.id.0, error = %e, "character lookup failed");
                    outbox.push(SessionOutput::new(
                        session.session_id,
                        "`RAn error occurred. Please try again later.`x",
                    ));
                    Phase::Ooc { account }
                }
            },
            AccountAction::Quit => {
                outbox.push(session.disconnect(GOODBYE));
                Phase::Closed
            }
            AccountAction::Help => {
                outbox.push(SessionOutput::new(session.session_id, ACCOUNT_COMMANDS));
                Phase::Ooc { account }
            }
            AccountAction::Unknown(message) => {
                outbox.push(SessionOutput::new(session.session_id, message));
                Phase::Ooc { account }
            }
        }
    }

    fn puppet_command<H: GameHost + 'static>(
        &self,
        account: AccountRef,
        character: PlayableCharacter,
        session: &mut PlayerSession,
        host: &mut H,
        outbox: &mut Vec<SessionOutput>,
        line: &str,
    ) -> Phase {
        match parse_puppet_input(line) {
            PuppetAction::Ooc => {
                session.unpuppet();
                outbox.push(SessionOutput::new(
                    session.session_id,
                    format!("You stop playing `c{}`x.", character.name),
                ));
                self.look(&account, session, host, outbox);
                Phase::Ooc { account }
            }
            PuppetAction::Quit => {
                outbox.push(session.disconnect(GOODBYE));
                Phase::Closed
            }
            PuppetAction::Game(command) => {
                tracing::debug!(session = session.session_id.0, %command, "in-character command");
                outbox.push(SessionOutput::new(
                    session.session_id,
                    "`xThe world is quiet. Type '`cooc`x' to return to your account.",
                ));
                Phase::Playing { account, character }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use session::SessionId;

    use crate::memory::MemoryHost;

    fn open(host: &mut MemoryHost) -> (Connection, PlayerSession, Vec<SessionOutput>) {
        let mut session = PlayerSession::new(SessionId(7), "127.0.0.1");
        let (conn, out) = Connection::open(&mut session, host, ChargenRules::default());
        let conn = conn.with_clock(GameClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2));
        (conn, session, out)
    }

    #[test]
    fn open_shows_banner_then_prompt() {
        let mut host = MemoryHost::new();
        let (conn, _, out) = open(&mut host);
        assert_eq!(out[0].text, CONNECTION_SCREEN);
        assert_eq!(out[1].text, "`WWhat is your account name?");
        assert_eq!(conn.phase().name(), "login");
    }

    #[test]
    fn new_account_lands_in_chargen() {
        let mut host = MemoryHost::new();
        let (mut conn, mut session, _) = open(&mut host);
        conn.handle_line(&mut session, &mut host, "grace");
        conn.handle_line(&mut session, &mut host, "yes");
        let out = conn.handle_line(&mut session, &mut host, "a fine password");
        assert_eq!(conn.phase().name(), "chargen");
        assert!(out.iter().any(|o| o.text.contains("In Character Creation")));
        assert!(matches!(session.state, SessionState::CreatingCharacter { .. }));
    }

    #[test]
    fn quit_in_chargen_returns_to_account_menu() {
        let mut host = MemoryHost::new();
        let (mut conn, mut session, _) = open(&mut host);
        for line in ["grace", "y", "a fine password", "first Grace"] {
            conn.handle_line(&mut session, &mut host, line);
        }
        let out = conn.handle_line(&mut session, &mut host, "quit");
        assert_eq!(conn.phase().name(), "ooc");
        assert_eq!(session.state, SessionState::OutOfCharacter);
        assert!(out.iter().any(|o| o.text == OOC_LOOK));
    }

    #[test]
    fn quit_from_account_menu_disconnects() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "x").unwrap();
        host.add_character_for(account.id, "Ada", "");
        let (mut conn, mut session, _) = open(&mut host);
        for line in ["ada", "password1", "ada", "ooc"] {
            conn.handle_line(&mut session, &mut host, line);
        }
        assert_eq!(conn.phase().name(), "ooc");
        let out = conn.handle_line(&mut session, &mut host, "quit");
        assert!(conn.is_closed());
        assert!(out.last().unwrap().disconnect);
    }

    #[test]
    fn ic_from_account_menu() {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "password1", "x").unwrap();
        host.add_character_for(account.id, "Ada", "Byron");
        let (mut conn, mut session, _) = open(&mut host);
        for line in ["ada", "password1", "ada", "ooc"] {
            conn.handle_line(&mut session, &mut host, line);
        }
        let out = conn.handle_line(&mut session, &mut host, "ic nobody");
        assert!(out[0].text.contains("no character named"));
        conn.handle_line(&mut session, &mut host, "ic ada byron");
        assert_eq!(conn.phase().name(), "playing");
        assert_eq!(session.character_name.as_deref(), Some("Ada Byron"));
    }

    #[test]
    fn disconnect_mid_creation_commits_nothing() {
        let mut host = MemoryHost::new();
        let (mut conn, mut session, _) = open(&mut host);
        for line in ["grace", "y", "a fine password", "first Grace", "hair red", "eyes blue"] {
            conn.handle_line(&mut session, &mut host, line);
        }
        let out = conn.disconnect(&mut session, "connection lost");
        assert!(out[0].disconnect);
        assert!(conn.is_closed());
        assert!(host.characters().iter().all(|c| c.sheet.is_none()));
        assert!(conn.handle_line(&mut session, &mut host, "look").is_empty());
    }
}
