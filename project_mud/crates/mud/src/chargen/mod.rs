//! Character-creation dialogue.
//!
//! A single sheet node accepts `<field> <value>`, `change <field> <value>`,
//! `help [field]`, `done` and `quit`. `done` commits through the host and
//! ends on the finish node; `quit` leaves the placeholder character and its
//! step marker in place so creation can resume later.

pub mod commit;
pub mod draft;
pub mod fields;
pub mod readiness;
pub mod sheet;
pub mod validators;

use rand::distributions::Alphanumeric;
use rand::Rng;
use strum::IntoEnumIterator;

use crate::dialogue::{Caller, Dialogue, Goto, Input, Menu, NodeView, OptionTable, Transition};
use crate::error::{ChargenError, DialogueError};
use crate::host::{AccountRef, CharacterId, CharacterVault, NameDirectory, PlayableCharacter};
use crate::race::archetype_table;
use crate::rules::{ChargenRules, GameClock};
use crate::text::listify;

use self::draft::Draft;
use self::fields::{Field, ValidationContext};
use self::readiness::Readiness;

/// Step marker stored on a character while it sits on the sheet node.
pub const SHEET_STEP: &str = "node_chargen";
pub const PLACEHOLDER_KEY_LEN: usize = 10;

const FINISH_TEXT: &str = "Dust settles and your vision clears. With one `cLOOK`x, you know something has gone wrong.";
const QUIT_TEXT: &str = "`xCharacter creation paused. Type '`ccreate`x' to pick up where you left off.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargenNode {
    Sheet,
    Finish,
    Quit,
}

impl ChargenNode {
    pub fn step_name(self) -> &'static str {
        match self {
            ChargenNode::Sheet => SHEET_STEP,
            ChargenNode::Finish => "node_chargen_end",
            ChargenNode::Quit => "node_quit",
        }
    }

    /// Node to resume at for a stored step marker. Only the sheet is resumable.
    pub fn from_step(step: &str) -> Option<ChargenNode> {
        (step == SHEET_STEP).then_some(ChargenNode::Sheet)
    }
}

/// State carried between transitions.
#[derive(Debug, Clone)]
pub struct ChargenContext {
    pub account: AccountRef,
    pub character: CharacterId,
    pub draft: Draft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargenOutcome {
    Committed(PlayableCharacter),
    /// Left without committing; the character stays in progress.
    Abandoned,
}

pub struct ChargenMenu {
    rules: ChargenRules,
    clock: GameClock,
}

impl ChargenMenu {
    pub fn new(rules: ChargenRules, clock: GameClock) -> Self {
        Self { rules, clock }
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    fn validation<'a>(&'a self, names: &'a dyn NameDirectory, state: &ChargenContext) -> ValidationContext<'a> {
        ValidationContext {
            names,
            clock: &self.clock,
            minimum_age: self.rules.minimum_character_age,
            character: Some(state.character),
        }
    }
}

impl Dialogue for ChargenMenu {
    type Node = ChargenNode;
    type State = ChargenContext;
    type Host = dyn CharacterVault;
    type Outcome = ChargenOutcome;

    const NAME: &'static str = "chargen";

    fn render(
        &self,
        node: ChargenNode,
        caller: &mut Caller<'_, dyn CharacterVault>,
        state: &ChargenContext,
    ) -> Result<NodeView<Self>, DialogueError> {
        match node {
            ChargenNode::Sheet => {
                let karma = caller.host.karma(state.account.id).map_err(|source| DialogueError::Host {
                    node: node.step_name().to_string(),
                    source,
                })?;
                let readiness = Readiness::evaluate(&self.validation(caller.host.names(), state), &state.draft, karma);
                Ok(NodeView::Page {
                    text: sheet::render(&state.draft, &readiness, &self.clock),
                    options: sheet_options(),
                })
            }
            ChargenNode::Finish => {
                let name = state.draft.full_name().ok_or_else(|| DialogueError::MissingState {
                    node: node.step_name().to_string(),
                    missing: "a character name",
                })?;
                Ok(NodeView::Exit {
                    text: FINISH_TEXT.to_string(),
                    outcome: ChargenOutcome::Committed(PlayableCharacter {
                        id: state.character,
                        name,
                    }),
                })
            }
            ChargenNode::Quit => Ok(NodeView::Exit {
                text: QUIT_TEXT.to_string(),
                outcome: ChargenOutcome::Abandoned,
            }),
        }
    }
}

fn sheet_options() -> OptionTable<ChargenMenu> {
    let mut table = OptionTable::new()
        .exact(&["done"], Goto::Call(handle_done))
        .exact(&["quit", "q"], Goto::Node(ChargenNode::Quit))
        .command(&["help"], Goto::Call(handle_help))
        .command(&["change"], Goto::Call(handle_change));
    for field in Field::iter() {
        table = table.command(field.keys(), Goto::Call(handle_field));
    }
    table.default_to(Goto::Call(handle_unknown))
}

fn update_field(
    menu: &ChargenMenu,
    caller: &mut Caller<'_, dyn CharacterVault>,
    state: &ChargenContext,
    field: Field,
    value: &str,
) -> Transition<ChargenMenu> {
    if value.is_empty() {
        return Transition::reject(field_help(field));
    }
    let parsed = {
        let ctx = menu.validation(caller.host.names(), state);
        field.parse(&ctx, &state.draft, value)
    };
    match parsed {
        Ok(update) => {
            tracing::debug!(character = state.character.0, field = ?field, "draft field updated");
            let mut next = state.clone();
            next.draft.apply(update);
            Transition::GoTo(ChargenNode::Sheet, next)
        }
        Err(message) => Transition::reject(message),
    }
}

fn handle_field(
    menu: &ChargenMenu,
    caller: &mut Caller<'_, dyn CharacterVault>,
    state: &ChargenContext,
    input: &Input<'_>,
) -> Transition<ChargenMenu> {
    match Field::from_key(input.key) {
        Some(field) => update_field(menu, caller, state, field, input.args),
        None => {
            tracing::error!(key = input.key, "option key has no registered field");
            Transition::Rerender(None)
        }
    }
}

fn handle_change(
    menu: &ChargenMenu,
    caller: &mut Caller<'_, dyn CharacterVault>,
    state: &ChargenContext,
    input: &Input<'_>,
) -> Transition<ChargenMenu> {
    let (key, value) = input
        .args
        .split_once(char::is_whitespace)
        .map(|(k, v)| (k, v.trim()))
        .unwrap_or((input.args, ""));
    if key.is_empty() {
        return Transition::reject(sheet::SYNTAX_LINE);
    }
    match Field::from_key(key) {
        Some(field) => update_field(menu, caller, state, field, value),
        None => Transition::reject(unknown_field(key)),
    }
}

fn handle_help(
    _: &ChargenMenu,
    _: &mut Caller<'_, dyn CharacterVault>,
    _: &ChargenContext,
    input: &Input<'_>,
) -> Transition<ChargenMenu> {
    let topic = input.args;
    if topic.is_empty() {
        let keys: Vec<String> = Field::iter().map(|f| format!("`c{}`x", f.keys()[0])).collect();
        return Transition::reject(format!("{}\nFields`Y:`x {}", sheet::SYNTAX_LINE, listify(&keys)));
    }
    if topic.eq_ignore_ascii_case("archetypes") {
        return Transition::reject(archetype_table());
    }
    match Field::from_key(topic) {
        Some(field) => Transition::reject(field_help(field)),
        None => Transition::reject(unknown_field(topic)),
    }
}

fn handle_done(
    menu: &ChargenMenu,
    caller: &mut Caller<'_, dyn CharacterVault>,
    state: &ChargenContext,
    _: &Input<'_>,
) -> Transition<ChargenMenu> {
    let result = commit::commit(
        &mut *caller.host,
        &menu.clock,
        menu.rules.minimum_character_age,
        state.account.id,
        state.character,
        &state.draft,
    );
    match result {
        Ok(_) => Transition::GoTo(ChargenNode::Finish, state.clone()),
        Err(ChargenError::NotReady(fields)) if fields.is_empty() => {
            Transition::reject("You don't have enough karma to create this character.")
        }
        Err(ChargenError::NotReady(fields)) => {
            let labels: Vec<String> = fields.iter().map(|f| format!("`R{}`x", f.label())).collect();
            Transition::reject(format!("This character is not ready yet. Check {}.", listify(&labels)))
        }
        Err(e) => {
            tracing::error!(character = state.character.0, error = %e, "commit failed");
            Transition::reject("`RSomething went wrong saving your character. Please try again.`x")
        }
    }
}

fn handle_unknown(
    _: &ChargenMenu,
    _: &mut Caller<'_, dyn CharacterVault>,
    _: &ChargenContext,
    input: &Input<'_>,
) -> Transition<ChargenMenu> {
    if input.raw.is_empty() {
        Transition::Rerender(None)
    } else {
        Transition::reject(sheet::SYNTAX_LINE)
    }
}

fn field_help(field: Field) -> String {
    match field {
        Field::Race | Field::Tier => format!("{}\n{}", field.help(), archetype_table()),
        _ => field.help().to_string(),
    }
}

fn unknown_field(key: &str) -> String {
    format!("There is no field called '`c{key}`x'. Type '`chelp`x' for a list.")
}

fn random_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Start creation for `account`, resuming its in-progress character if there
/// is one and otherwise creating a placeholder with a random key.
pub fn begin(
    host: &mut dyn CharacterVault,
    account: &AccountRef,
    rules: &ChargenRules,
    clock: GameClock,
) -> Result<Menu<ChargenMenu>, ChargenError> {
    let (character, node) = match host.in_progress(account.id)? {
        Some(pending) => {
            let node = match ChargenNode::from_step(&pending.step) {
                Some(node) => node,
                None => {
                    tracing::warn!(character = pending.id.0, step = %pending.step, "unknown chargen step, restarting at sheet");
                    host.set_chargen_step(pending.id, SHEET_STEP)?;
                    ChargenNode::Sheet
                }
            };
            tracing::info!(account = account.id.0, character = pending.id.0, key = %pending.key, "resuming character creation");
            (pending.id, node)
        }
        None => {
            let count = host.character_count(account.id)?;
            if count >= rules.max_characters_per_account {
                return Err(ChargenError::RosterFull(count));
            }
            let key = random_key();
            let id = host.create_placeholder(account.id, &key, SHEET_STEP)?;
            tracing::info!(account = account.id.0, character = id.0, %key, "placeholder character created");
            (id, ChargenNode::Sheet)
        }
    };

    let context = ChargenContext {
        account: account.clone(),
        character,
        draft: Draft::default(),
    };
    Ok(Menu::new(ChargenMenu::new(rules.clone(), clock), node, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use session::{PlayerSession, SessionId, SessionOutput};

    use crate::dialogue::Step;
    use crate::host::AccountGate;
    use crate::memory::MemoryHost;

    fn clock() -> GameClock {
        GameClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 2)
    }

    struct Harness {
        host: MemoryHost,
        session: PlayerSession,
        outbox: Vec<SessionOutput>,
        account: AccountRef,
    }

    impl Harness {
        fn new() -> Self {
            let mut host = MemoryHost::new();
            let account = host.create_account("ada", "password1", "test").unwrap();
            Self {
                host,
                session: PlayerSession::new(SessionId(1), "test"),
                outbox: Vec::new(),
                account,
            }
        }

        fn begin(&mut self) -> Menu<ChargenMenu> {
            let mut menu = begin(&mut self.host, &self.account, &ChargenRules::default(), clock()).unwrap();
            let host: &mut (dyn CharacterVault + 'static) = &mut self.host;
            let mut caller = Caller::new(&mut self.session, host, &mut self.outbox);
            assert!(matches!(menu.enter(&mut caller), Step::Continue));
            menu
        }

        fn send(&mut self, menu: &mut Menu<ChargenMenu>, line: &str) -> Step<ChargenOutcome> {
            let host: &mut (dyn CharacterVault + 'static) = &mut self.host;
            let mut caller = Caller::new(&mut self.session, host, &mut self.outbox);
            menu.input(&mut caller, line)
        }

        fn last(&self) -> &str {
            &self.outbox.last().unwrap().text
        }
    }

    #[test]
    fn field_commands_update_draft() {
        let mut h = Harness::new();
        let mut menu = h.begin();
        h.send(&mut menu, "first Ada");
        h.send(&mut menu, "lastname Byron");
        h.send(&mut menu, "change hair auburn");
        h.send(&mut menu, "PRONOUNS She Her Hers");
        let draft = &menu.state().draft;
        assert_eq!(draft.full_name().as_deref(), Some("Ada Byron"));
        assert_eq!(draft.hair, Some(crate::appearance::Hair::Auburn));
        assert_eq!(draft.pronouns.joined(), "she her hers");
    }

    #[test]
    fn rejected_value_keeps_previous() {
        let mut h = Harness::new();
        let mut menu = h.begin();
        h.send(&mut menu, "feet 6");
        h.send(&mut menu, "feet 9");
        assert_eq!(menu.state().draft.feet, 6);
        assert!(h.outbox.iter().any(|o| o.text.starts_with("Invalid feet")));
    }

    #[test]
    fn bare_keyword_and_help_show_field_help() {
        let mut h = Harness::new();
        let mut menu = h.begin();
        h.send(&mut menu, "email");
        assert!(h.outbox.iter().any(|o| o.text == Field::Email.help()));
        h.send(&mut menu, "help intro");
        assert!(h.outbox.iter().any(|o| o.text == Field::Intro.help()));
        h.send(&mut menu, "help archetypes");
        assert!(h.outbox.iter().any(|o| o.text.contains("Avalonian Noble")));
        assert_eq!(menu.node(), ChargenNode::Sheet);
    }

    #[test]
    fn done_when_not_ready_stays_on_sheet() {
        let mut h = Harness::new();
        let mut menu = h.begin();
        let step = h.send(&mut menu, "done");
        assert!(matches!(step, Step::Continue));
        assert_eq!(menu.node(), ChargenNode::Sheet);
        assert!(h.outbox.iter().any(|o| o.text.contains("not ready yet")));
        assert!(h.host.roster(h.account.id).unwrap().is_empty());
    }

    #[test]
    fn quit_abandons_without_commit() {
        let mut h = Harness::new();
        let mut menu = h.begin();
        h.send(&mut menu, "first Ada");
        let step = h.send(&mut menu, "q");
        assert!(matches!(step, Step::Finished(ChargenOutcome::Abandoned)));
        assert_eq!(h.last(), QUIT_TEXT);
        let pending = h.host.in_progress(h.account.id).unwrap().unwrap();
        assert_eq!(pending.step, SHEET_STEP);
        assert_eq!(pending.key.len(), PLACEHOLDER_KEY_LEN);
        assert!(h.host.roster(h.account.id).unwrap().is_empty());
    }

    #[test]
    fn begin_resumes_in_progress_character() {
        let mut h = Harness::new();
        let first = h.begin();
        let second = h.begin();
        assert_eq!(first.state().character, second.state().character);
        assert_eq!(h.host.character_count(h.account.id).unwrap(), 1);
    }

    #[test]
    fn begin_repairs_unknown_step() {
        let mut h = Harness::new();
        let id = h.host.create_placeholder(h.account.id, "AbCdEfGhIj", "node_gone").unwrap();
        let menu = h.begin();
        assert_eq!(menu.state().character, id);
        assert_eq!(menu.node(), ChargenNode::Sheet);
        assert_eq!(h.host.in_progress(h.account.id).unwrap().unwrap().step, SHEET_STEP);
    }

    #[test]
    fn begin_refuses_full_roster() {
        let mut h = Harness::new();
        let rules = ChargenRules {
            max_characters_per_account: 1,
            ..ChargenRules::default()
        };
        h.host.add_character_for(h.account.id, "Someone", "");
        let result = begin(&mut h.host, &h.account, &rules, clock());
        assert!(matches!(result, Err(ChargenError::RosterFull(1))));
    }
}
