//! Login dialogue: username, optional new-account confirmation, password,
//! then character selection. The final node either logs the session in or
//! disconnects it.

use crate::dialogue::{Caller, Dialogue, Goto, Input, NodeView, OptionTable, Transition};
use crate::error::DialogueError;
use crate::host::{AccountGate, AccountRef, PlayableCharacter};
use crate::roster::account_overview;
use crate::screens::{ACCOUNT_HELP, MATURE_NOTICE, PASSWORD_HELP};

pub const MIN_USERNAME_LEN: usize = 3;

const FAREWELL: &str = "Logging off. We hope to see you soon!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNode {
    EnterUsername,
    ConfirmNewUsername,
    EnterPassword,
    CharacterSelection,
    QuitOrLogin,
}

/// How the login dialogue ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Disconnected,
    Play {
        account: AccountRef,
        character: PlayableCharacter,
    },
    CreateCharacter {
        account: AccountRef,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub username: String,
    pub new_user: bool,
    /// A new-account password was refused; ask again without the notice.
    pub retry_password: bool,
    pub account: Option<AccountRef>,
    /// Where the final node goes. `None` disconnects.
    pub exit: Option<LoginOutcome>,
}

#[derive(Debug, Default)]
pub struct LoginMenu;

impl Dialogue for LoginMenu {
    type Node = LoginNode;
    type State = LoginState;
    type Host = dyn AccountGate;
    type Outcome = LoginOutcome;

    const NAME: &'static str = "login";

    fn render(
        &self,
        node: LoginNode,
        caller: &mut Caller<'_, dyn AccountGate>,
        state: &LoginState,
    ) -> Result<NodeView<Self>, DialogueError> {
        let view = match node {
            LoginNode::EnterUsername => NodeView::Page {
                text: "`WWhat is your account name?".to_string(),
                options: OptionTable::new()
                    .exact(&[""], Goto::Node(LoginNode::EnterUsername))
                    .exact(&["quit", "q"], Goto::Node(LoginNode::QuitOrLogin))
                    .exact(&["help", "h"], Goto::Call(show_account_help))
                    .default_to(Goto::Call(check_username)),
            },
            LoginNode::ConfirmNewUsername => {
                if state.username.is_empty() {
                    return Err(missing(node, "a username"));
                }
                NodeView::Page {
                    text: format!("`xCreate a new account `c{}`x? (y/N)", state.username),
                    options: OptionTable::new()
                        .exact(&["y", "yes"], Goto::Node(LoginNode::EnterPassword))
                        .exact(&["q", "quit"], Goto::Node(LoginNode::QuitOrLogin))
                        .default_to(Goto::Call(restart)),
                }
            }
            LoginNode::EnterPassword => {
                if state.username.is_empty() {
                    return Err(missing(node, "a username"));
                }
                let text = match (state.new_user, state.retry_password) {
                    (true, true) => "Enter a new password:".to_string(),
                    (true, false) => format!("{MATURE_NOTICE}\n\nType either `cquit`x or a new password for {}", state.username),
                    (false, _) => "Enter password (empty to abort):".to_string(),
                };
                NodeView::Page {
                    text,
                    options: OptionTable::new()
                        .exact(&[""], Goto::Call(cancel_login))
                        .exact(&["quit", "q"], Goto::Node(LoginNode::QuitOrLogin))
                        .exact(&["help", "h"], Goto::Call(show_password_help))
                        .default_to(Goto::Call(check_password)),
                }
            }
            LoginNode::CharacterSelection => {
                let account = state.account.as_ref().ok_or_else(|| missing(node, "an account"))?;
                let roster = caller.host.roster(account.id).map_err(|source| DialogueError::Host {
                    node: format!("{node:?}"),
                    source,
                })?;
                NodeView::Page {
                    text: account_overview(&account.username, &roster),
                    options: OptionTable::new()
                        .exact(&[""], Goto::Node(LoginNode::CharacterSelection))
                        .exact(&["create"], Goto::Call(choose_create))
                        .exact(&["quit", "q"], Goto::Node(LoginNode::QuitOrLogin))
                        .default_to(Goto::Call(choose_character)),
                }
            }
            LoginNode::QuitOrLogin => match &state.exit {
                Some(LoginOutcome::Play { account, character }) => {
                    caller.session.login(account.id.0, &account.username);
                    NodeView::Exit {
                        text: "`YLogging in ...`x".to_string(),
                        outcome: LoginOutcome::Play {
                            account: account.clone(),
                            character: character.clone(),
                        },
                    }
                }
                Some(LoginOutcome::CreateCharacter { account }) => {
                    caller.session.login(account.id.0, &account.username);
                    NodeView::Exit {
                        text: String::new(),
                        outcome: LoginOutcome::CreateCharacter {
                            account: account.clone(),
                        },
                    }
                }
                Some(LoginOutcome::Disconnected) | None => {
                    caller.disconnect(FAREWELL);
                    NodeView::Exit {
                        text: String::new(),
                        outcome: LoginOutcome::Disconnected,
                    }
                }
            },
        };
        Ok(view)
    }
}

fn missing(node: LoginNode, what: &'static str) -> DialogueError {
    DialogueError::MissingState {
        node: format!("{node:?}"),
        missing: what,
    }
}

fn show_account_help(
    _: &LoginMenu,
    _: &mut Caller<'_, dyn AccountGate>,
    _: &LoginState,
    _: &Input<'_>,
) -> Transition<LoginMenu> {
    Transition::reject(ACCOUNT_HELP)
}

fn show_password_help(
    _: &LoginMenu,
    _: &mut Caller<'_, dyn AccountGate>,
    _: &LoginState,
    _: &Input<'_>,
) -> Transition<LoginMenu> {
    Transition::reject(PASSWORD_HELP)
}

fn restart(
    _: &LoginMenu,
    _: &mut Caller<'_, dyn AccountGate>,
    _: &LoginState,
    _: &Input<'_>,
) -> Transition<LoginMenu> {
    Transition::GoTo(LoginNode::EnterUsername, LoginState::default())
}

fn cancel_login(
    _: &LoginMenu,
    caller: &mut Caller<'_, dyn AccountGate>,
    _: &LoginState,
    _: &Input<'_>,
) -> Transition<LoginMenu> {
    caller.msg("`xCancelled login.");
    Transition::GoTo(LoginNode::EnterUsername, LoginState::default())
}

fn check_username(
    _: &LoginMenu,
    caller: &mut Caller<'_, dyn AccountGate>,
    _: &LoginState,
    input: &Input<'_>,
) -> Transition<LoginMenu> {
    let username = input.raw;
    if username.chars().count() < MIN_USERNAME_LEN {
        return Transition::reject("`xUsername must be at least 3 characters long.");
    }
    match caller.host.account_exists(username) {
        Ok(exists) => {
            let next = if exists {
                LoginNode::EnterPassword
            } else {
                LoginNode::ConfirmNewUsername
            };
            Transition::GoTo(
                next,
                LoginState {
                    username: username.to_string(),
                    new_user: !exists,
                    ..LoginState::default()
                },
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "account lookup failed");
            Transition::reject("`RAn error occurred. Please try again later.`x")
        }
    }
}

fn check_password(
    _: &LoginMenu,
    caller: &mut Caller<'_, dyn AccountGate>,
    state: &LoginState,
    input: &Input<'_>,
) -> Transition<LoginMenu> {
    let address = caller.address().to_string();
    let result = if state.new_user {
        caller.host.create_account(&state.username, input.line, &address)
    } else {
        caller.host.authenticate(&state.username, input.line, &address)
    };

    match result {
        Ok(account) if state.new_user => {
            caller.msg(format!(
                "`YA new account `c{}`Y was created. Welcome to the chaos!",
                account.username
            ));
            Transition::GoTo(
                LoginNode::QuitOrLogin,
                LoginState {
                    exit: Some(LoginOutcome::CreateCharacter { account }),
                    ..state.clone()
                },
            )
        }
        Ok(account) => Transition::GoTo(
            LoginNode::CharacterSelection,
            LoginState {
                account: Some(account),
                ..state.clone()
            },
        ),
        Err(e) => {
            tracing::warn!(username = %state.username, address = %address, new_user = state.new_user, error = ?e, "login attempt refused");
            caller.msg(format!("`R{e}"));
            Transition::GoTo(
                LoginNode::EnterPassword,
                LoginState {
                    retry_password: true,
                    ..state.clone()
                },
            )
        }
    }
}

fn choose_create(
    _: &LoginMenu,
    _: &mut Caller<'_, dyn AccountGate>,
    state: &LoginState,
    _: &Input<'_>,
) -> Transition<LoginMenu> {
    match &state.account {
        Some(account) => Transition::GoTo(
            LoginNode::QuitOrLogin,
            LoginState {
                exit: Some(LoginOutcome::CreateCharacter {
                    account: account.clone(),
                }),
                ..state.clone()
            },
        ),
        None => Transition::Rerender(None),
    }
}

fn choose_character(
    _: &LoginMenu,
    caller: &mut Caller<'_, dyn AccountGate>,
    state: &LoginState,
    input: &Input<'_>,
) -> Transition<LoginMenu> {
    let Some(account) = &state.account else {
        return Transition::Rerender(None);
    };
    match caller.host.find_playable(account.id, input.raw) {
        Ok(Some(character)) => Transition::GoTo(
            LoginNode::QuitOrLogin,
            LoginState {
                exit: Some(LoginOutcome::Play {
                    account: account.clone(),
                    character,
                }),
                ..state.clone()
            },
        ),
        Ok(None) => Transition::reject(format!("`xYou have no character named '`c{}`x'.", input.raw)),
        Err(e) => {
            tracing::error!(account = account.id.0, error = %e, "character lookup failed");
            Transition::reject("`RAn error occurred. Please try again later.`x")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::{PlayerSession, SessionId, SessionOutput, SessionState};

    use crate::dialogue::{Menu, Step};
    use crate::memory::MemoryHost;

    struct Harness {
        host: MemoryHost,
        session: PlayerSession,
        outbox: Vec<SessionOutput>,
        menu: Menu<LoginMenu>,
    }

    impl Harness {
        fn new(host: MemoryHost) -> Self {
            let mut h = Self {
                host,
                session: PlayerSession::new(SessionId(3), "10.0.0.1"),
                outbox: Vec::new(),
                menu: Menu::new(LoginMenu, LoginNode::EnterUsername, LoginState::default()),
            };
            let host: &mut (dyn AccountGate + 'static) = &mut h.host;
            let mut caller = Caller::new(&mut h.session, host, &mut h.outbox);
            h.menu.enter(&mut caller);
            h
        }

        fn send(&mut self, line: &str) -> Step<LoginOutcome> {
            let host: &mut (dyn AccountGate + 'static) = &mut self.host;
            let mut caller = Caller::new(&mut self.session, host, &mut self.outbox);
            self.menu.input(&mut caller, line)
        }

        fn texts(&self) -> Vec<&str> {
            self.outbox.iter().map(|o| o.text.as_str()).collect()
        }
    }

    fn host_with_ada() -> MemoryHost {
        let mut host = MemoryHost::new();
        let account = host.create_account("ada", "correct horse", "seed").unwrap();
        host.add_character_for(account.id, "Ada", "Byron");
        host
    }

    #[test]
    fn short_username_rerenders() {
        let mut h = Harness::new(MemoryHost::new());
        let step = h.send("ab");
        assert!(matches!(step, Step::Continue));
        assert_eq!(h.menu.node(), LoginNode::EnterUsername);
        assert!(h.menu.state().username.is_empty());
        let texts = h.texts();
        assert_eq!(texts[texts.len() - 2], "`xUsername must be at least 3 characters long.");
        assert_eq!(texts[texts.len() - 1], "`WWhat is your account name?");
    }

    #[test]
    fn help_echoes_and_stays() {
        let mut h = Harness::new(MemoryHost::new());
        h.send("h");
        assert_eq!(h.menu.node(), LoginNode::EnterUsername);
        assert!(h.texts().contains(&ACCOUNT_HELP));
    }

    #[test]
    fn new_account_flow_ends_in_creation() {
        let mut h = Harness::new(MemoryHost::new());
        h.send("grace");
        assert_eq!(h.menu.node(), LoginNode::ConfirmNewUsername);
        h.send("y");
        assert_eq!(h.menu.node(), LoginNode::EnterPassword);
        assert!(h.texts().last().unwrap().contains("mature role playing game"));

        h.send("short");
        assert_eq!(h.menu.node(), LoginNode::EnterPassword);
        assert!(h.menu.state().retry_password);
        assert_eq!(*h.texts().last().unwrap(), "Enter a new password:");

        let step = h.send("long enough password");
        match step {
            Step::Finished(LoginOutcome::CreateCharacter { account }) => assert_eq!(account.username, "grace"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.session.state, SessionState::OutOfCharacter);
        assert_eq!(h.session.account_name.as_deref(), Some("grace"));
    }

    #[test]
    fn password_keeps_surrounding_spaces() {
        let mut h = Harness::new(MemoryHost::new());
        h.send("grace");
        h.send("y");
        h.send("  abcdef  \r\n");
        assert_eq!(h.session.state, SessionState::OutOfCharacter);
        assert!(h.host.authenticate("grace", "  abcdef  ", "test").is_ok());
        assert!(h.host.authenticate("grace", "abcdef", "test").is_err());

        let mut h = Harness::new(h.host);
        h.send("grace");
        h.send("abcdef");
        assert_eq!(h.menu.node(), LoginNode::EnterPassword);
        h.send("  abcdef  ");
        assert_eq!(h.menu.node(), LoginNode::CharacterSelection);
    }

    #[test]
    fn declining_new_account_restarts() {
        let mut h = Harness::new(MemoryHost::new());
        h.send("grace");
        h.send("no");
        assert_eq!(h.menu.node(), LoginNode::EnterUsername);
        assert!(h.menu.state().username.is_empty());
    }

    #[test]
    fn existing_account_selects_character() {
        let mut h = Harness::new(host_with_ada());
        h.send("ADA");
        assert_eq!(h.menu.node(), LoginNode::EnterPassword);
        h.send("wrong password");
        assert!(h.texts().iter().any(|t| t.contains("Incorrect username or password")));
        assert_eq!(*h.texts().last().unwrap(), "Enter password (empty to abort):");

        h.send("correct horse");
        assert_eq!(h.menu.node(), LoginNode::CharacterSelection);
        assert!(h.texts().last().unwrap().contains("Ada Byron"));

        h.send("nobody");
        assert_eq!(h.menu.node(), LoginNode::CharacterSelection);

        match h.send("ada") {
            Step::Finished(LoginOutcome::Play { character, .. }) => assert_eq!(character.name, "Ada Byron"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.session.is_logged_in());
    }

    #[test]
    fn create_from_selection() {
        let mut h = Harness::new(host_with_ada());
        h.send("ada");
        h.send("correct horse");
        assert!(matches!(h.send("CREATE"), Step::Finished(LoginOutcome::CreateCharacter { .. })));
    }

    #[test]
    fn blank_password_cancels() {
        let mut h = Harness::new(host_with_ada());
        h.send("ada");
        h.send("");
        assert_eq!(h.menu.node(), LoginNode::EnterUsername);
        assert!(h.texts().contains(&"`xCancelled login."));
    }

    #[test]
    fn quit_disconnects_from_any_node() {
        for path in [&["quit"][..], &["grace", "q"], &["ada", "q"], &["ada", "correct horse", "quit"]] {
            let mut h = Harness::new(host_with_ada());
            let mut last = Step::Continue;
            for line in path {
                last = h.send(line);
            }
            assert!(matches!(last, Step::Finished(LoginOutcome::Disconnected)), "{path:?}");
            assert_eq!(h.session.state, SessionState::Disconnected);
            let farewell = h.outbox.last().unwrap();
            assert!(farewell.disconnect);
            assert_eq!(farewell.text, FAREWELL);
        }
    }
}
