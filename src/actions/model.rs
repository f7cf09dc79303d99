#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Reminder,
    Weather,
    News,
    Call,
    Fallback,
}

impl Intent {
    /// Return all the variants of this Enum, in the order in which they are
    /// tried during classification.
    pub fn variants() -> Vec<Self> {
        // Walking the successor chain makes the compiler complain about a
        // forgotten variant in `next`, so the list can't silently go stale.
        let mut vs = Vec::new();
        let mut nxt = Some(Self::Reminder);
        while let Some(intent) = nxt {
            vs.push(intent);
            nxt = intent.next();
        }
        vs
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Reminder => Some(Self::Weather),
            Self::Weather => Some(Self::News),
            Self::News => Some(Self::Call),
            Self::Call => Some(Self::Fallback),
            // last is None
            Self::Fallback => None,
        }
    }

    /// The lowercase keyword that selects this intent. `Fallback` matches
    /// whatever nothing else matched.
    #[must_use]
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Reminder => Some("reminder"),
            Self::Weather => Some("weather"),
            Self::News => Some("news"),
            Self::Call => Some("call"),
            Self::Fallback => None,
        }
    }
}
