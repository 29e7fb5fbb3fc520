use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};

pub const MIN_FEET: u8 = 5;
pub const MAX_FEET: u8 = 6;
pub const MIN_INCHES: u8 = 0;
pub const MAX_INCHES: u8 = 11;

/// Natural hair colours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Hair {
    Blue,
    Bald,
    Green,
    Pink,
    Purple,
    White,
    Black,
    Brown,
    Blond,
    Auburn,
    Chestnut,
    Red,
    Gray,
}

impl Hair {
    pub fn lookup(input: &str) -> Option<Hair> {
        input.trim().parse().ok()
    }

    pub fn markup(self) -> &'static str {
        match self {
            Hair::Blue => "`cb`Clu`ce`x",
            Hair::Bald => "`wno`x",
            Hair::Green => "`gg`Gree`gn`x",
            Hair::Pink => "`Mpink`x",
            Hair::Purple => "`mpurple`x",
            Hair::White => "`Wwhite`x",
            Hair::Black => "`240black`x",
            Hair::Brown => "`094brown`x",
            Hair::Blond => "`179blond`x",
            Hair::Auburn => "`130auburn`x",
            Hair::Chestnut => "`058chestnut`x",
            Hair::Red => "`166red`x",
            Hair::Gray => "`243g`247ra`243y`x",
        }
    }

    pub fn all_markup() -> Vec<&'static str> {
        Hair::iter().map(Hair::markup).collect()
    }
}

/// Eye colours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Eyes {
    Golden,
    Amber,
    Brown,
    Blue,
    Green,
    Gray,
    Hazel,
    Red,
    Silver,
    Cerulean,
    Yellow,
    Purple,
    Black,
    White,
}

impl Eyes {
    pub fn lookup(input: &str) -> Option<Eyes> {
        input.trim().parse().ok()
    }

    pub fn markup(self) -> &'static str {
        match self {
            Eyes::Golden => "`Yg`yo`Yld`ye`Yn`x",
            Eyes::Amber => "`172am`166b`172er`x",
            Eyes::Brown => "`094br`yo`094wn`x",
            Eyes::Blue => "`027bl`026u`027e`x",
            Eyes::Green => "`Ggr`ge`Gen`x",
            Eyes::Gray => "`243g`247ra`243y`x",
            Eyes::Hazel => "`028ha`058z`028el`x",
            Eyes::Red => "`rr`Re`rd`x",
            Eyes::Silver => "`Ws`xi`Dlv`xe`Wr`x",
            Eyes::Cerulean => "`cc`Cer`cul`Cea`cn`x",
            Eyes::Yellow => "`yye`Yll`yow`x",
            Eyes::Purple => "`013pu`005rp`013le`x",
            Eyes::Black => "`240black`x",
            Eyes::White => "`Wwhite`x",
        }
    }

    pub fn all_markup() -> Vec<&'static str> {
        Eyes::iter().map(Eyes::markup).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(Hair::lookup(" AUBURN "), Some(Hair::Auburn));
        assert_eq!(Hair::lookup("bald"), Some(Hair::Bald));
        assert_eq!(Eyes::lookup("Cerulean"), Some(Eyes::Cerulean));
        assert_eq!(Hair::lookup("golden"), None);
        assert_eq!(Eyes::lookup("chestnut"), None);
    }

    #[test]
    fn markup_lists_cover_every_colour() {
        assert_eq!(Hair::all_markup().len(), 13);
        assert_eq!(Eyes::all_markup().len(), 14);
        assert!(Eyes::all_markup().iter().all(|m| m.ends_with("`x")));
    }
}
