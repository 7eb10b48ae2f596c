//! Outcome of a vote or unvote on a meme or song suggestion.

/// Result of toggling a user's vote inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// The vote row and counter changed; carries the new counter value.
    Applied { votes: i32 },
    /// Nothing changed: already voted (vote) or never voted (unvote).
    Unchanged,
    /// The voted-on item does not exist.
    ItemMissing,
}
