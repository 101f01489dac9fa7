//! Element-wise collection conversions
//!
//! Each element is taken as-is when it is already readable as the target
//! element type (same type or lossless widening) and otherwise mapped through
//! the dispatcher, so collections of beans map their elements with whatever
//! maps and conventions the mapper knows.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

use beancp_core::{Converter, MapValue, MappingContext};

/// Conversions among `Vec` and `VecDeque` of `S` into `Vec` and `VecDeque` of `D`.
///
/// Pairs where source and destination collection types coincide are skipped.
pub fn list_converters<S, D>() -> Vec<Converter>
where
    S: MapValue,
    D: MapValue,
{
    distinct(vec![
        element_wise::<Vec<S>, Vec<D>, S, D>(),
        element_wise::<Vec<S>, VecDeque<D>, S, D>(),
        element_wise::<VecDeque<S>, Vec<D>, S, D>(),
        element_wise::<VecDeque<S>, VecDeque<D>, S, D>(),
    ])
}

/// Conversions between any two of `Vec`, `VecDeque`, `HashSet` and `BTreeSet`.
///
/// Duplicate elements collapse when the destination is a set.
pub fn collection_converters<S, D>() -> Vec<Converter>
where
    S: MapValue + Eq + Hash + Ord,
    D: MapValue + Eq + Hash + Ord,
{
    let mut converters = list_converters::<S, D>();
    converters.extend(distinct(vec![
        element_wise::<Vec<S>, HashSet<D>, S, D>(),
        element_wise::<Vec<S>, BTreeSet<D>, S, D>(),
        element_wise::<VecDeque<S>, HashSet<D>, S, D>(),
        element_wise::<VecDeque<S>, BTreeSet<D>, S, D>(),
        element_wise::<HashSet<S>, Vec<D>, S, D>(),
        element_wise::<HashSet<S>, VecDeque<D>, S, D>(),
        element_wise::<HashSet<S>, HashSet<D>, S, D>(),
        element_wise::<HashSet<S>, BTreeSet<D>, S, D>(),
        element_wise::<BTreeSet<S>, Vec<D>, S, D>(),
        element_wise::<BTreeSet<S>, VecDeque<D>, S, D>(),
        element_wise::<BTreeSet<S>, HashSet<D>, S, D>(),
        element_wise::<BTreeSet<S>, BTreeSet<D>, S, D>(),
    ]));
    converters
}

fn distinct(converters: Vec<Converter>) -> Vec<Converter> {
    converters
        .into_iter()
        .filter(|c| c.source_type() != c.destination_type())
        .collect()
}

fn element_wise<CS, CD, S, D>() -> Converter
where
    CS: MapValue,
    for<'a> &'a CS: IntoIterator<Item = &'a S>,
    CD: MapValue + FromIterator<D>,
    S: MapValue,
    D: MapValue,
{
    Converter::with_mapper::<CS, CD>(|cx, source| {
        let converted = source
            .into_iter()
            .map(|element| convert_element::<S, D>(cx, element))
            .collect::<beancp_core::Result<CD>>()?;
        Ok(converted)
    })
}

fn convert_element<S: MapValue, D: MapValue>(
    cx: &mut MappingContext<'_>,
    element: &S,
) -> beancp_core::Result<D> {
    match D::from_value(&element.clone().into_value()) {
        Some(element) => Ok(element),
        None => cx.map_to::<D>(element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beancp_core::{Error, Mapper};

    #[test]
    fn test_list_pairs_skip_identity() {
        assert_eq!(list_converters::<i32, i64>().len(), 4);
        assert_eq!(list_converters::<i32, i32>().len(), 2);
        assert_eq!(collection_converters::<String, String>().len(), 12);
    }

    #[test]
    fn test_widening_elements_need_no_element_converter() {
        let mapper = Mapper::builder()
            .add_converters(collection_converters::<i32, i64>())
            .unwrap()
            .build()
            .unwrap();

        let list: VecDeque<i64> = mapper.map_to(&vec![3i32, 1, 3]).unwrap();
        assert_eq!(list, VecDeque::from(vec![3, 1, 3]));

        let set: BTreeSet<i64> = mapper.map_to(&vec![3i32, 1, 3]).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_elements_go_through_dispatcher() {
        let mapper = Mapper::builder()
            .add_converter::<i32, String>(|v| format!("n{}", v))
            .unwrap()
            .add_converters(list_converters::<i32, String>())
            .unwrap()
            .build()
            .unwrap();

        let names: Vec<String> = mapper.map_to(&vec![1i32, 2]).unwrap();
        assert_eq!(names, vec!["n1".to_string(), "n2".to_string()]);
    }

    #[test]
    fn test_missing_element_mapping_is_reported() {
        let mapper = Mapper::builder()
            .add_converters(list_converters::<i32, String>())
            .unwrap()
            .build()
            .unwrap();

        let error = mapper.map_to::<Vec<String>>(&vec![1i32]).unwrap_err();
        assert!(matches!(error, Error::NoMapping { .. }), "got {:?}", error);
    }
}
