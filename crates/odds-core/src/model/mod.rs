pub mod hand;
pub mod outcome;
pub mod starting;

pub use hand::{ACE_HIGH, ACE_LOW, DealerHand};
pub use outcome::Outcome;
pub use starting::StartingCard;
