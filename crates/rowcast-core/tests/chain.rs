//! Property: for any valid extends chain, identity arity is identical
//! at every level, transient fields never resolve, and leaf identity
//! overrides rename without widening.

mod common;

use proptest::prelude::*;
use rowcast_core::prelude::*;

#[derive(Clone, Debug)]
struct LevelSpec {
    share_parent_table: bool,
    override_identity: bool,
    field_count: usize,
    with_transient: bool,
}

fn level_spec() -> impl Strategy<Value = LevelSpec> {
    (any::<bool>(), any::<bool>(), 0usize..3, any::<bool>()).prop_map(
        |(share_parent_table, override_identity, field_count, with_transient)| LevelSpec {
            share_parent_table,
            override_identity,
            field_count,
            with_transient,
        },
    )
}

fn build_registry(identity_arity: usize, levels: &[LevelSpec]) -> Registry {
    let mut registry = Registry::new();
    let mut parent_table = "t0".to_string();

    for (depth, level) in levels.iter().enumerate() {
        let table = if depth > 0 && level.share_parent_table {
            parent_table.clone()
        } else {
            format!("t{depth}")
        };

        let mut descriptor = TypeDescriptor::new(format!("T{depth}"), table.clone());
        if depth > 0 {
            descriptor = descriptor.with_extends(format!("T{}", depth - 1));
        }

        if depth == 0 {
            for k in 0..identity_arity {
                descriptor = descriptor.with_identity(FieldDescriptor::stored(
                    format!("id{k}"),
                    Storage::column(format!("id{k}"), SqlType::BigInt),
                ));
            }
        } else if level.override_identity {
            // Rename the first identity column at this level.
            descriptor = descriptor.with_identity(FieldDescriptor::stored(
                "id0",
                Storage::column(format!("id0_l{depth}"), SqlType::BigInt),
            ));
        }

        for f in 0..level.field_count {
            descriptor = descriptor.with_field(FieldDescriptor::stored(
                format!("f{depth}_{f}"),
                Storage::column(format!("f{depth}_{f}"), SqlType::Varchar),
            ));
        }
        if level.with_transient {
            descriptor = descriptor.with_field(FieldDescriptor::transient(format!("x{depth}")));
        }

        registry
            .register(descriptor)
            .expect("generated registration should succeed");
        parent_table = table;
    }

    registry
}

proptest! {
    #[test]
    fn identity_arity_is_constant_across_any_chain(
        identity_arity in 1usize..4,
        levels in proptest::collection::vec(level_spec(), 1..6),
    ) {
        let registry = build_registry(identity_arity, &levels);
        let set = EngineSet::build(&registry).expect("generated chain should build");

        for engine in set.iter() {
            prop_assert_eq!(engine.identity_columns().len(), identity_arity);
        }
    }

    #[test]
    fn transient_fields_never_resolve(
        levels in proptest::collection::vec(level_spec(), 1..6),
    ) {
        let registry = build_registry(1, &levels);
        let set = EngineSet::build(&registry).expect("generated chain should build");

        for engine in set.iter() {
            prop_assert!(engine.fields().iter().all(|f| !f.name.starts_with('x')));
        }
    }

    #[test]
    fn leaf_identity_override_renames_without_widening(
        levels in proptest::collection::vec(level_spec(), 2..6),
    ) {
        let registry = build_registry(2, &levels);
        let set = EngineSet::build(&registry).expect("generated chain should build");

        let leaf_depth = levels.len() - 1;
        let leaf = set
            .engine(&format!("T{leaf_depth}"))
            .expect("leaf engine should exist");

        prop_assert_eq!(leaf.identity_columns().len(), 2);
        let expected = if levels[leaf_depth].override_identity {
            format!("id0_l{leaf_depth}")
        } else {
            "id0".to_string()
        };
        prop_assert_eq!(leaf.identity_columns()[0].name.clone(), expected);
        prop_assert_eq!(leaf.identity_columns()[1].name.clone(), "id1");
    }
}
