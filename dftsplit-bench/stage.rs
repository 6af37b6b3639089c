use strum_macros::{Display, EnumIter};

#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    #[strum(serialize = "forward")]
    Forward,
    #[strum(serialize = "inverse")]
    Inverse,
}
