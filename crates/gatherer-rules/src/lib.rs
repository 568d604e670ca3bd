//! Rule-based action selection.
//!
//! A fixed bank of condition-action rules is evaluated against the cycle's activation vector. Rules
//! whose predicate holds become candidates; a single candidate wins outright, several are resolved
//! by a weighted draw from a seeded RNG so that selection is reproducible.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod arbiter;
pub mod rule;

pub use arbiter::Arbiter;
pub use rule::{Rule, RuleBank, RuleBankError, DEFAULT_WEIGHT};
