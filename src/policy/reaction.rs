//! Reaction toggle and tally

use crate::models::{ReactionCount, ReactionType};

/// Store mutation produced by reacting to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Create(ReactionType),
    /// Replace the type on the existing reaction
    Change(ReactionType),
    Remove,
}

/// Same type again removes the reaction, another type replaces it
pub fn react_transition(existing: Option<ReactionType>, requested: ReactionType) -> ReactionAction {
    match existing {
        None => ReactionAction::Create(requested),
        Some(current) if current == requested => ReactionAction::Remove,
        Some(_) => ReactionAction::Change(requested),
    }
}

/// One count per reaction type in display order, missing types as zero
pub fn tally(counts: &[(ReactionType, i64)]) -> Vec<ReactionCount> {
    ReactionType::ALL
        .into_iter()
        .map(|reaction_type| ReactionCount {
            reaction_type,
            count: counts
                .iter()
                .filter(|(t, _)| *t == reaction_type)
                .map(|(_, n)| *n)
                .sum(),
        })
        .collect()
}
