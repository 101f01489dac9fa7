//! Rule selection by type-match priority
//!
//! Copyright (c) 2025 Bean-cp Team
//! Licensed under the Apache-2.0 license

use crate::types::TypeInfo;

/// How closely a registered rule's types match a requested pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchRank {
    Exact,
    SourceSubtype,
    DestinationSupertype,
    Applicable,
}

/// Which ranks a rule category may be selected at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strictness {
    /// Any applicable rule
    Relaxed,
    /// Destination type must match exactly and the source must be readable
    /// as the rule's source type without projection
    StrictDestination,
}

pub(crate) fn rank(
    requested_source: &TypeInfo,
    requested_destination: &TypeInfo,
    rule_source: &TypeInfo,
    rule_destination: &TypeInfo,
) -> Option<MatchRank> {
    let source_exact = requested_source == rule_source;
    let destination_exact = requested_destination == rule_destination;
    let source_fits = source_exact
        || requested_source.is_subtype_of(rule_source)
        || rule_source.is_assignable_from(requested_source);
    let destination_fits = destination_exact || requested_destination.is_subtype_of(rule_destination);
    if !source_fits || !destination_fits {
        return None;
    }
    Some(match (source_exact, destination_exact) {
        (true, true) => MatchRank::Exact,
        (false, true) => MatchRank::SourceSubtype,
        (true, false) => MatchRank::DestinationSupertype,
        (false, false) => MatchRank::Applicable,
    })
}

/// Best rule for the requested pair; the earliest registered rule wins ties
pub(crate) fn select<'a, T>(
    rules: &'a [T],
    sides: impl Fn(&T) -> (TypeInfo, TypeInfo),
    source: &TypeInfo,
    destination: &TypeInfo,
    strictness: Strictness,
) -> Option<&'a T> {
    rules
        .iter()
        .filter_map(|rule| {
            let (rule_source, rule_destination) = sides(rule);
            let rank = rank(source, destination, &rule_source, &rule_destination)?;
            let allowed = match strictness {
                Strictness::Relaxed => true,
                Strictness::StrictDestination => {
                    rank <= MatchRank::SourceSubtype && rule_source.is_assignable_from(source)
                }
            };
            allowed.then_some((rank, rule))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, rule)| rule)
}
