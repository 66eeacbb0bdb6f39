#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Effect resolution for Card Defence.
//!
//! Card effects declare a targeting rule and an ordered list of predicates.
//! The [`EffectPipeline`] resolves the targets of each predicate against a
//! fresh world snapshot, lets the predicate queue commands on a
//! [`ResolutionInfo`], and applies those commands before moving on.

mod card;
mod pipeline;
mod predicate;
mod resolution;

pub use card::CardData;
pub use pipeline::EffectPipeline;
pub use predicate::EffectPredicate;
pub use resolution::{ResolutionInfo, SkippedPredicate};
