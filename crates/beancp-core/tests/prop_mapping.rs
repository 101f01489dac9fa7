//! Property-based tests for mapping
//!
//! These check that mapped values follow their sources for arbitrary
//! inputs, and that repeated mapping is stable.


use beancp_core::{shared, Mapper, NameBasedMapConvention, Shared};
use proptest::prelude::*;
use test_support::*;

fn convention_mapper() -> Mapper {
    Mapper::builder()
        .add_map::<Order, OrderOverviewDto>(|map| {
            map.use_convention(NameBasedMapConvention::new().enable_flattening())
        })
        .unwrap()
        .add_map_any_by_convention(NameBasedMapConvention::new())
        .build()
        .unwrap()
}

/// Strategy for orders, with and without a customer
fn order_strategy() -> impl Strategy<Value = (i32, i32, Option<Option<String>>)> {
    (
        any::<i32>(),
        any::<i32>(),
        proptest::option::of(proptest::option::of("[a-zA-Z .'-]{0,40}")),
    )
}

fn build_order(id: i32, total_amount: i32, customer: &Option<Option<String>>) -> Shared<Order> {
    shared(Order {
        id,
        total_amount,
        customer: customer.as_ref().map(|name| {
            shared(Customer {
                id: i64::from(id),
                full_name: name.clone(),
            })
        }),
    })
}

proptest! {
    #[test]
    fn prop_overview_follows_source((id, total, customer) in order_strategy()) {
        let mapper = convention_mapper();
        let dto: Shared<OrderOverviewDto> = mapper.map_to(&build_order(id, total, &customer)).unwrap();

        let expected = OrderOverviewDto {
            id: i64::from(id),
            customer_full_name: customer.flatten(),
            total_amount: i64::from(total),
        };
        prop_assert_eq!(snapshot(&dto), expected);
    }

    #[test]
    fn prop_mapping_is_deterministic((id, total, customer) in order_strategy()) {
        let mapper = convention_mapper();
        let source = build_order(id, total, &customer);

        let first: Shared<OrderOverviewDto> = mapper.map_to(&source).unwrap();
        let second: Shared<OrderOverviewDto> = mapper.map_to(&source).unwrap();
        prop_assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn prop_map_into_existing_overwrites_all_members(
        (id, total, customer) in order_strategy(),
        stale_id in any::<i64>(),
        stale_name in proptest::option::of("[a-z]{1,10}"),
    ) {
        let mapper = convention_mapper();
        let destination = shared(OrderOverviewDto {
            id: stale_id,
            customer_full_name: stale_name,
            total_amount: stale_id,
        });
        mapper.map(&build_order(id, total, &customer), &destination).unwrap();

        let fresh: Shared<OrderOverviewDto> = mapper.map_to(&build_order(id, total, &customer)).unwrap();
        prop_assert_eq!(snapshot(&destination), snapshot(&fresh));
    }

    #[test]
    fn prop_widening_converter_accepts_narrower_sources(value in any::<i16>()) {
        let mapper = Mapper::builder()
            .add_converter::<i64, String>(|v| format!("#{}", v))
            .unwrap()
            .build()
            .unwrap();

        let from_short: String = mapper.map_to(&value).unwrap();
        let from_int: String = mapper.map_to(&i32::from(value)).unwrap();
        prop_assert_eq!(&from_short, &format!("#{}", value));
        prop_assert_eq!(from_short, from_int);
    }

    #[test]
    fn prop_customer_map_any_copies_members(id in any::<i64>(), name in proptest::option::of(".{0,30}")) {
        let mapper = convention_mapper();
        let customer = shared(Customer { id, full_name: name.clone() });
        let dto: Shared<CustomerDto> = mapper.map_to(&customer).unwrap();
        prop_assert_eq!(snapshot(&dto), CustomerDto { id, full_name: name });
    }
}
