/// merge policy: leveling keeps a single run per level, tiering lets
/// up to T - 1 runs accumulate before a level merges down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Leveling,
    Tiering,
}

impl Policy {
    pub const fn all() -> &'static [Self] {
        &[Self::Leveling, Self::Tiering]
    }
    pub const fn is_leveling(&self) -> bool {
        matches!(self, Self::Leveling)
    }
}
