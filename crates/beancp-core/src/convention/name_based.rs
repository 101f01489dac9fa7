//! Name-based member matching
//!
//! Destination members are matched to source members with the same name,
//! ignoring case and underscores, so `full_name`, `fullName` and `FULLNAME`
//! all match. With flattening enabled a destination member such as
//! `customer_full_name` can also be matched through the source path
//! `customer` -> `full_name`.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::accessor::{Accessor, MemberKind};
use crate::binding::{Binding, BindingKind};
use crate::convention::{MapConvention, MappingInfo};
use crate::error::{Error, MemberSide, Result};
use crate::types::TypeInfo;

/// Convention binding members by name.
///
/// Include and exclude patterns are case-insensitive regular expressions
/// matched anywhere in the destination member name; exclusion wins, and an
/// empty include list includes every member.
#[derive(Debug, Clone, Default)]
pub struct NameBasedMapConvention {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    flattening: bool,
    fail_if_destination_unmapped: bool,
    fail_if_source_unmapped: bool,
}

impl NameBasedMapConvention {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_destination_members<I, P>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.include.extend(compile(patterns)?);
        Ok(self)
    }

    pub fn exclude_destination_members<I, P>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.exclude.extend(compile(patterns)?);
        Ok(self)
    }

    pub fn enable_flattening(mut self) -> Self {
        self.flattening = true;
        self
    }

    pub fn disable_flattening(mut self) -> Self {
        self.flattening = false;
        self
    }

    pub fn fail_if_not_all_destination_members_mapped(mut self) -> Self {
        self.fail_if_destination_unmapped = true;
        self
    }

    pub fn fail_if_not_all_source_members_mapped(mut self) -> Self {
        self.fail_if_source_unmapped = true;
        self
    }

    pub fn is_flattening_enabled(&self) -> bool {
        self.flattening
    }

    fn is_included(&self, name: &str) -> bool {
        if self.exclude.iter().any(|p| p.is_match(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.is_match(name))
    }

    /// Source path for a destination member, preferring members of the same kind
    fn match_source(&self, members: &[Accessor], name: &str, kind: MemberKind) -> Option<Vec<Accessor>> {
        self.match_by_kind(members, name, kind)
            .or_else(|| self.match_by_kind(members, name, kind.other()))
    }

    fn match_by_kind(&self, members: &[Accessor], name: &str, kind: MemberKind) -> Option<Vec<Accessor>> {
        let candidates: Vec<&Accessor> = members
            .iter()
            .filter(|m| m.kind() == kind && m.is_readable())
            .collect();

        if let Some(exact) = candidates.iter().find(|m| normalize(m.name()) == name) {
            return Some(vec![(*exact).clone()]);
        }
        if !self.flattening {
            return None;
        }

        // Longest prefix wins; the first declared member wins among equals.
        let prefix = candidates
            .iter()
            .filter_map(|m| {
                let normalized = normalize(m.name());
                let usable = !normalized.is_empty()
                    && normalized.len() < name.len()
                    && name.starts_with(normalized.as_str());
                usable.then_some((*m, normalized.len()))
            })
            .min_by_key(|(_, len)| std::cmp::Reverse(*len))?;

        let (head, len) = prefix;
        let nested_type = head.value_type();
        if !nested_type.is_bean() {
            return None;
        }
        let mut path = self.match_source(&nested_type.members(), &name[len..], kind)?;
        path.insert(0, head.clone());
        Some(path)
    }

    fn binding_kind(
        &self,
        info: &dyn MappingInfo,
        source: &TypeInfo,
        destination: &TypeInfo,
        from: &TypeInfo,
        to: &TypeInfo,
    ) -> Option<BindingKind> {
        if from == to {
            Some(BindingKind::Direct)
        } else if from == source && to == destination {
            Some(BindingKind::RecursiveMap)
        } else if info.is_converter_available(from, to) {
            Some(BindingKind::Converted)
        } else if info.is_map_available(from, to) {
            Some(BindingKind::RecursiveMap)
        } else if to.is_assignable_from(from) {
            Some(BindingKind::Direct)
        } else {
            None
        }
    }
}

impl MapConvention for NameBasedMapConvention {
    fn bindings(
        &self,
        info: &dyn MappingInfo,
        source: &TypeInfo,
        destination: &TypeInfo,
    ) -> Result<Vec<Binding>> {
        if !source.is_bean() || !destination.is_bean() {
            return Ok(Vec::new());
        }

        let source_members = source.members();
        let destination_members = destination.members();
        let mut bindings = Vec::new();
        let mut unmapped = Vec::new();

        let ordered = destination_members
            .iter()
            .filter(|m| m.kind() == MemberKind::Property)
            .chain(destination_members.iter().filter(|m| m.kind() == MemberKind::Field));

        for member in ordered.filter(|m| m.is_writable()) {
            if !self.is_included(member.name()) {
                continue;
            }
            let path = self.match_source(&source_members, &normalize(member.name()), member.kind());
            let kind = path.as_ref().and_then(|p| {
                let from = p.last()?.value_type();
                self.binding_kind(info, source, destination, &from, &member.value_type())
            });
            match (path, kind) {
                (Some(path), Some(kind)) => bindings.push(Binding::new(path, member.clone(), kind)?),
                _ => unmapped.push(member.name().to_string()),
            }
        }

        if self.fail_if_destination_unmapped && !unmapped.is_empty() {
            return Err(Error::CoverageViolation {
                side: MemberSide::Destination,
                type_name: destination.name().to_string(),
                members: unmapped,
            });
        }

        if self.fail_if_source_unmapped {
            let unused: Vec<String> = source_members
                .iter()
                .filter(|m| m.is_readable())
                .filter(|m| !bindings.iter().any(|b| b.source_path()[0].same_member(m)))
                .map(|m| m.name().to_string())
                .collect();
            if !unused.is_empty() {
                return Err(Error::CoverageViolation {
                    side: MemberSide::Source,
                    type_name: source.name().to_string(),
                    members: unused,
                });
            }
        }

        if !unmapped.is_empty() {
            debug!(
                source = source.name(),
                destination = destination.name(),
                unmapped = ?unmapped,
                "destination members left unmapped"
            );
        }
        Ok(bindings)
    }
}

fn compile<I, P>(patterns: I) -> Result<Vec<Regex>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| Error::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
        })
        .collect()
}

/// Lowercased member name without underscores
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Bean;
    use crate::value::Shared;

    struct NoMaps;

    impl MappingInfo for NoMaps {
        fn is_converter_available(&self, _: &TypeInfo, _: &TypeInfo) -> bool {
            false
        }

        fn is_map_available(&self, _: &TypeInfo, _: &TypeInfo) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Customer {
        full_name: Option<String>,
        email: Option<String>,
    }

    impl Bean for Customer {
        fn members() -> Vec<Accessor> {
            vec![
                Accessor::optional(
                    "fullName",
                    |c: &Customer| c.full_name.clone(),
                    |c: &mut Customer, v| c.full_name = v,
                ),
                Accessor::optional("email", |c: &Customer| c.email.clone(), |c: &mut Customer, v| {
                    c.email = v
                }),
            ]
        }
    }

    #[derive(Default)]
    struct Order {
        id: i32,
        customer: Option<Shared<Customer>>,
    }

    impl Bean for Order {
        fn members() -> Vec<Accessor> {
            vec![
                Accessor::required("id", |o: &Order| o.id, |o: &mut Order, v| o.id = v),
                Accessor::optional(
                    "customer",
                    |o: &Order| o.customer.clone(),
                    |o: &mut Order, v| o.customer = v,
                ),
            ]
        }
    }

    #[derive(Default)]
    struct OrderSummary {
        id: i64,
        customer_full_name: Option<String>,
        notes: Option<String>,
    }

    impl Bean for OrderSummary {
        fn members() -> Vec<Accessor> {
            vec![
                Accessor::required("id", |o: &OrderSummary| o.id, |o: &mut OrderSummary, v| o.id = v),
                Accessor::optional(
                    "customer_full_name",
                    |o: &OrderSummary| o.customer_full_name.clone(),
                    |o: &mut OrderSummary, v| o.customer_full_name = v,
                ),
                Accessor::optional(
                    "notes",
                    |o: &OrderSummary| o.notes.clone(),
                    |o: &mut OrderSummary, v| o.notes = v,
                )
                .as_field(),
            ]
        }
    }

    fn resolve(convention: &NameBasedMapConvention) -> Result<Vec<Binding>> {
        convention.bindings(
            &NoMaps,
            &TypeInfo::bean::<Order>(),
            &TypeInfo::bean::<OrderSummary>(),
        )
    }

    #[test]
    fn test_exact_name_match_with_widening() {
        let bindings = resolve(&NameBasedMapConvention::new()).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].describe(), "id -> id");
        assert_eq!(bindings[0].kind(), BindingKind::Direct);
    }

    #[test]
    fn test_flattening_resolves_nested_path() {
        let bindings = resolve(&NameBasedMapConvention::new().enable_flattening()).unwrap();
        let descriptions: Vec<String> = bindings.iter().map(Binding::describe).collect();
        assert_eq!(descriptions, vec!["id -> id", "customer.fullName -> customer_full_name"]);
    }

    #[test]
    fn test_exclusion_beats_inclusion() {
        let convention = NameBasedMapConvention::new()
            .enable_flattening()
            .include_destination_members(["ID", "customer"])
            .unwrap()
            .exclude_destination_members(["^id$"])
            .unwrap();
        let bindings = resolve(&convention).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].destination().name(), "customer_full_name");
    }

    #[test]
    fn test_destination_coverage_violation() {
        let convention = NameBasedMapConvention::new()
            .enable_flattening()
            .fail_if_not_all_destination_members_mapped();
        match resolve(&convention) {
            Err(Error::CoverageViolation { side, members, .. }) => {
                assert_eq!(side, MemberSide::Destination);
                assert_eq!(members, vec!["notes".to_string()]);
            }
            other => panic!("expected coverage violation, got {:?}", other),
        }
    }

    #[test]
    fn test_source_coverage_checks_first_hop() {
        let convention = NameBasedMapConvention::new()
            .enable_flattening()
            .fail_if_not_all_source_members_mapped();
        assert!(resolve(&convention).is_ok());

        let without_flattening = NameBasedMapConvention::new().fail_if_not_all_source_members_mapped();
        match resolve(&without_flattening) {
            Err(Error::CoverageViolation { side, members, .. }) => {
                assert_eq!(side, MemberSide::Source);
                assert_eq!(members, vec!["customer".to_string()]);
            }
            other => panic!("expected coverage violation, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = NameBasedMapConvention::new()
            .include_destination_members(["("])
            .unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_normalize_ignores_case_and_underscores() {
        assert_eq!(normalize("customer_Full_name"), "customerfullname");
        assert_eq!(normalize("customerFullName"), "customerfullname");
    }
}
