//! Cyclic and shared object graphs


use std::sync::Arc;

use beancp_core::{shared, Accessor, Bean, BindOptions, Mapper, NameBasedMapConvention, Shared};
use test_support::*;

fn reusing_tree_mapper() -> Mapper {
    Mapper::builder()
        .add_map::<Node, NodeDto>(|map| {
            map.bind(
                |n: &Node| Some(n.name.clone()),
                |d: &mut NodeDto, v| d.name = v.unwrap_or_default(),
                BindOptions::new(),
            )
            .map_inner_reusing(
                |n: &Node| n.left.clone(),
                |d: &mut NodeDto, v| d.left = v,
                |d: &NodeDto| d.left.clone(),
                BindOptions::new(),
            )
            .map_inner_reusing(
                |n: &Node| n.right.clone(),
                |d: &mut NodeDto, v| d.right = v,
                |d: &NodeDto| d.right.clone(),
                BindOptions::new(),
            )
        })
        .unwrap()
        .build()
        .unwrap()
}

fn left_of(node: &Shared<NodeDto>) -> Shared<NodeDto> {
    node.read().unwrap().left.clone().expect("left mapped")
}

fn right_of(node: &Shared<NodeDto>) -> Shared<NodeDto> {
    node.read().unwrap().right.clone().expect("right mapped")
}

#[test]
fn test_self_reference_maps_to_identity() {
    init_tracing();
    let root = node("root");
    root.write().unwrap().left = Some(root.clone());

    let dto: Shared<NodeDto> = reusing_tree_mapper().map_to(&root).unwrap();
    assert!(Arc::ptr_eq(&left_of(&dto), &dto));
    assert!(dto.read().unwrap().right.is_none());
    assert_eq!(dto.read().unwrap().name, "root");

    // Break the cycles so the test does not leak
    root.write().unwrap().left = None;
    dto.write().unwrap().left = None;
}

#[test]
fn test_self_reference_mapped_into_existing_destination() {
    let root = node("root");
    root.write().unwrap().left = Some(root.clone());
    let destination = shared_dto("old-root");

    reusing_tree_mapper().map(&root, &destination).unwrap();
    assert!(Arc::ptr_eq(&left_of(&destination), &destination));
    assert_eq!(destination.read().unwrap().name, "root");

    root.write().unwrap().left = None;
    destination.write().unwrap().left = None;
}

#[test]
fn test_shared_child_maps_to_single_destination() {
    let leaf = node("leaf");
    let root = node("root");
    {
        let mut root = root.write().unwrap();
        root.left = Some(leaf.clone());
        root.right = Some(leaf.clone());
    }

    let dto: Shared<NodeDto> = reusing_tree_mapper().map_to(&root).unwrap();
    let left = left_of(&dto);
    assert!(Arc::ptr_eq(&left, &right_of(&dto)));
    assert_eq!(left.read().unwrap().name, "leaf");
}

#[test]
fn test_two_node_cycle() {
    let a = node("a");
    let b = node("b");
    a.write().unwrap().left = Some(b.clone());
    b.write().unwrap().left = Some(a.clone());

    let dto: Shared<NodeDto> = reusing_tree_mapper().map_to(&a).unwrap();
    let b_dto = left_of(&dto);
    assert_eq!(b_dto.read().unwrap().name, "b");
    assert!(Arc::ptr_eq(&left_of(&b_dto), &dto));

    a.write().unwrap().left = None;
    b_dto.write().unwrap().left = None;
}

#[test]
fn test_map_any_convention_handles_self_reference() {
    let mapper = Mapper::builder()
        .add_map_any_by_convention(NameBasedMapConvention::new())
        .build()
        .unwrap();

    let root = node("root");
    root.write().unwrap().right = Some(root.clone());

    let dto: Shared<NodeDto> = mapper.map_to(&root).unwrap();
    assert!(Arc::ptr_eq(&right_of(&dto), &dto));
    assert!(dto.read().unwrap().left.is_none());

    root.write().unwrap().right = None;
    dto.write().unwrap().right = None;
}

#[test]
fn test_mapping_into_existing_tree_reuses_children() {
    let mapper = reusing_tree_mapper();
    let source = node("root");
    source.write().unwrap().left = Some(node("new-left"));

    let existing_left = shared_dto("old-left");
    let destination = shared_dto("old-root");
    destination.write().unwrap().left = Some(existing_left.clone());

    mapper.map(&source, &destination).unwrap();
    assert!(Arc::ptr_eq(&left_of(&destination), &existing_left));
    assert_eq!(existing_left.read().unwrap().name, "new-left");
    assert_eq!(destination.read().unwrap().name, "root");
}

#[test]
fn test_deep_chain() {
    let head = node("0");
    let mut tail = head.clone();
    for i in 1..64 {
        let next = node(&i.to_string());
        tail.write().unwrap().left = Some(next.clone());
        tail = next;
    }

    let dto: Shared<NodeDto> = reusing_tree_mapper().map_to(&head).unwrap();
    let mut current = dto;
    let mut depth = 0;
    loop {
        let next = current.read().unwrap().left.clone();
        match next {
            Some(next) => {
                current = next;
                depth += 1;
            }
            None => break,
        }
    }
    assert_eq!(depth, 63);
    assert_eq!(current.read().unwrap().name, "63");
}

fn shared_dto(name: &str) -> Shared<NodeDto> {
    beancp_core::shared(NodeDto {
        name: name.to_string(),
        ..Default::default()
    })
}

#[derive(Default)]
struct Part {
    name: String,
}

impl Bean for Part {
    fn members() -> Vec<Accessor> {
        vec![Accessor::required("name", |p: &Part| p.name.clone(), |p: &mut Part, v| p.name = v)]
    }
}

#[derive(Default)]
struct PartDto {
    name: String,
}

impl Bean for PartDto {
    fn members() -> Vec<Accessor> {
        vec![Accessor::required("name", |p: &PartDto| p.name.clone(), |p: &mut PartDto, v| p.name = v)]
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Default)]
struct Whole {
    a: String,
    b: String,
}

impl Bean for Whole {
    fn members() -> Vec<Accessor> {
        Vec::new()
    }
}

#[derive(Default)]
struct WholeDto {
    a: Option<Shared<PartDto>>,
    b: Option<Shared<PartDto>>,
}

impl Bean for WholeDto {
    fn members() -> Vec<Accessor> {
        Vec::new()
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[test]
fn test_temporary_sources_never_share_destinations() {
    let mapper = Mapper::builder()
        .add_map_any_by_convention(NameBasedMapConvention::new())
        .add_map::<Whole, WholeDto>(|map| {
            map.map_inner_reusing(
                |w: &Whole| Some(shared(Part { name: w.a.clone() })),
                |d: &mut WholeDto, v| d.a = v,
                |d: &WholeDto| d.a.clone(),
                BindOptions::new(),
            )
            .map_inner_reusing(
                |w: &Whole| Some(shared(Part { name: w.b.clone() })),
                |d: &mut WholeDto, v| d.b = v,
                |d: &WholeDto| d.b.clone(),
                BindOptions::new(),
            )
        })
        .unwrap()
        .build()
        .unwrap();

    for _ in 0..16 {
        let whole = shared(Whole {
            a: "A".to_string(),
            b: "B".to_string(),
        });
        let dto: Shared<WholeDto> = mapper.map_to(&whole).unwrap();
        let dto = dto.read().unwrap();
        let a = dto.a.clone().expect("a mapped");
        let b = dto.b.clone().expect("b mapped");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.read().unwrap().name, "A");
        assert_eq!(b.read().unwrap().name, "B");
    }
}
