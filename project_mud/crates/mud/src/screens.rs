//! Fixed text blocks shown around login.

pub const CONNECTION_SCREEN: &str = r#"
 `Y  ____                        __  __ _   _ ____
 / ___| _   _ _ __   ___ _ __|  \/  | | | |  _ \
 \___ \| | | | '_ \ / _ \ '__| |\/| | | | | | | |
  ___) | |_| | |_) |  __/ |  | |  | | |_| | |_| |
 |____/ \__,_| .__/ \___|_|  |_|  |_|\___/|____/
             |_|`x

`cWelcome to SuperMUD, a love letter to superhero media set on an alternate
Earth where the existence of superhumans has shaped history since the 1940s.

Our game takes place in Bendis City, a sprawling metropolis in California and
the center of the fantastic, where heroes and villains brawling is the price
you pay for cheap real estate and the chance to rub shoulders with greatness.`x
"#;

pub const ACCOUNT_HELP: &str = "Enter a new or existing user name.";

pub const PASSWORD_HELP: &str = "Password should be a minimum of 8 characters (preferably longer) and \
can contain a mix of letters, spaces, digits and @/./+/-/_/'/, only.";

pub const MATURE_NOTICE: &str = "`cNotice`Y:`x SuperMUD is a mature role playing game in which there are few
restrictions on content. As such depictions of graphic violence or other mature
themes may be presented to the player over the course of their time here. By
continuing you state that you are not offended by mature material and that it
is legal for you to view it. If this is not the case please type '`cquit`x' now.";

/// What `look` shows at the account level.
pub const OOC_LOOK: &str = "`Y--------------------------------------------------------------------`x
Welcome to `YSuperMUD`x!

Type '`cic <name>`x' to play one of your characters, or '`ccreate`x' if you want to create a new one.
'`cquit`x' logs you out.
`Y--------------------------------------------------------------------`x";
