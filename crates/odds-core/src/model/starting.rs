use core::fmt;

/// Partition key over dealer hands: the first card drawn, with the two
/// ace encodings (1 and 11) merged into a single `Ace` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum StartingCard {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Ace = 11,
}

impl StartingCard {
    /// Presentation order: 2 through 10, then Ace.
    pub const ORDERED: [StartingCard; 10] = [
        StartingCard::Two,
        StartingCard::Three,
        StartingCard::Four,
        StartingCard::Five,
        StartingCard::Six,
        StartingCard::Seven,
        StartingCard::Eight,
        StartingCard::Nine,
        StartingCard::Ten,
        StartingCard::Ace,
    ];

    pub const fn from_first_card(value: u8) -> Option<Self> {
        match value {
            1 | 11 => Some(StartingCard::Ace),
            2 => Some(StartingCard::Two),
            3 => Some(StartingCard::Three),
            4 => Some(StartingCard::Four),
            5 => Some(StartingCard::Five),
            6 => Some(StartingCard::Six),
            7 => Some(StartingCard::Seven),
            8 => Some(StartingCard::Eight),
            9 => Some(StartingCard::Nine),
            10 => Some(StartingCard::Ten),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for StartingCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartingCard::Ace => f.write_str("Ace"),
            other => write!(f, "{}", other.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StartingCard;

    #[test]
    fn ace_encodings_merge() {
        assert_eq!(StartingCard::from_first_card(1), Some(StartingCard::Ace));
        assert_eq!(StartingCard::from_first_card(11), Some(StartingCard::Ace));
        assert_eq!(StartingCard::from_first_card(7), Some(StartingCard::Seven));
        assert_eq!(StartingCard::from_first_card(0), None);
        assert_eq!(StartingCard::from_first_card(12), None);
    }

    #[test]
    fn ordered_ends_with_ace() {
        assert_eq!(StartingCard::ORDERED[0], StartingCard::Two);
        assert_eq!(StartingCard::ORDERED[9], StartingCard::Ace);
        assert!(StartingCard::Ten < StartingCard::Ace);
    }

    #[test]
    fn display_matches_labels() {
        assert_eq!(StartingCard::Ten.to_string(), "10");
        assert_eq!(StartingCard::Ace.to_string(), "Ace");
    }
}
