/// How ambiguity is handled while picking an install or one of its assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Refuse to guess: any tie or unparsable input is an error.
    #[default]
    Strict,
    /// Fall back to modification time and path ordering.
    Lenient,
}

impl Strictness {
    pub fn from_lenient_flag(lenient: bool) -> Self {
        if lenient {
            Self::Lenient
        } else {
            Self::Strict
        }
    }

    pub fn is_strict(self) -> bool {
        self == Self::Strict
    }
}
