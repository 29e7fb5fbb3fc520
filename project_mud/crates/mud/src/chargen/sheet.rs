//! Character sheet shown on the creation node.

use strum::IntoEnumIterator;

use crate::chargen::draft::Draft;
use crate::chargen::fields::Field;
use crate::chargen::readiness::Readiness;
use crate::rules::GameClock;

pub const SYNTAX_LINE: &str =
    "Syntax`Y:`c change `x(`cfield`x) (`cthing to change it to`x) or `chelp `x(`cfield`x)";

fn field_line(field: Field, draft: &Draft, readiness: &Readiness) -> String {
    let highlight = if readiness.is_failing(field) { "`R" } else { "" };
    format!("{highlight}{}`Y:`c {}`x", field.label(), field.display(draft))
}

fn archetype_line(draft: &Draft) -> String {
    match draft.race.archetype_markup(draft.tier) {
        Ok(label) => format!("Archetype`Y:`x {label} `Y(`xChange this with `cRace`x and `cTier`Y)`x"),
        Err(_) => "`RArchetype`Y: `RInvalid race and tier `Y(`xChange this with `cRace`x and `cTier`Y)`x".to_string(),
    }
}

pub fn karma_line(readiness: &Readiness) -> String {
    let cost_color = if readiness.cost > 0 { "`R" } else { "`G" };
    format!(
        "This character would cost {cost_color}{}`x karma to create, and you have `c{}`x karma.",
        readiness.cost, readiness.karma
    )
}

pub fn ready_line(readiness: &Readiness) -> &'static str {
    if readiness.is_ready() {
        "This character is `Gready`x to be created! Type '`cdone`x' to proceed."
    } else if !readiness.can_afford() {
        "This character is `Rnot yet ready`x to be created. You don't have enough karma."
    } else {
        "This character is `Rnot yet ready`x to be created. Fields highlighted in `Rred`x must be filled."
    }
}

pub fn render(draft: &Draft, readiness: &Readiness, clock: &GameClock) -> String {
    let mut lines = vec!["`cIn Character Creation`x".to_string(), String::new()];
    for field in Field::iter() {
        lines.push(field_line(field, draft, readiness));
        match field {
            Field::Tier => lines.push(archetype_line(draft)),
            Field::Birthday => lines.push(format!("Resulting Age`Y:`x {}`x", clock.age_on(draft.birthday))),
            _ => {}
        }
    }
    lines.push(String::new());
    lines.push(karma_line(readiness));
    lines.push(ready_line(readiness).to_string());
    lines.push(SYNTAX_LINE.to_string());
    lines.join("\n")
}
