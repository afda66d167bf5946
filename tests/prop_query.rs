use bson::Bson;
use lincs_store::query::{Compiler, Filter, Op, QueryOptions, build_predicate, qualify};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

proptest! {
    #[test]
    fn prop_qualify_is_idempotent(name in ident(), depth in 0usize..4) {
        let raw = format!("{}{}", "metadata.".repeat(depth), name);
        let once = qualify(&raw);
        prop_assert_eq!(&once, &format!("metadata.{name}"));
        prop_assert_eq!(qualify(&once), once);
    }

    #[test]
    fn prop_predicates_follow_filter_order(names in proptest::collection::btree_set(ident(), 1..8)) {
        // btree_set gives sorted unique names; reverse them so order is not alphabetical
        let names: Vec<String> = names.into_iter().rev().collect();
        let filter: Filter = names.iter().map(|n| (n.clone(), Bson::Int32(1))).collect();
        let stmt = Compiler::default().compile(&filter, &QueryOptions::default(), false).unwrap();
        let paths: Vec<String> = stmt.predicates.iter().map(|p| p.path.clone()).collect();
        let expected: Vec<String> = names.iter().map(|n| qualify(n)).collect();
        prop_assert_eq!(paths, expected);
        prop_assert_eq!(stmt.text.matches(" AND ").count(), names.len() - 1);
    }

    #[test]
    fn prop_operator_depends_on_value_count(values in proptest::collection::vec(any::<i32>(), 1..20)) {
        let bson = Bson::Array(values.iter().copied().map(Bson::Int32).collect());
        let p = build_predicate("metadata.pert_dose", &bson).unwrap();
        if values.len() == 1 {
            prop_assert_eq!(p.op, Op::Eq);
            prop_assert_eq!(p.clause, format!("metadata.pert_dose = {}", values[0]));
        } else {
            prop_assert_eq!(p.op, Op::In);
            prop_assert!(p.clause.starts_with("metadata.pert_dose IN ["));
        }
    }

    #[test]
    fn prop_pert_desc_ignores_case(s in "[A-Za-z][A-Za-z0-9 -]{0,20}") {
        let upper = build_predicate("metadata.pert_desc", &Bson::String(s.to_uppercase())).unwrap();
        let lower = build_predicate("metadata.pert_desc", &Bson::String(s.to_lowercase())).unwrap();
        prop_assert_eq!(upper.clause, lower.clause);
    }

    #[test]
    fn prop_paging_clauses(skip in 0usize..100, limit in 0usize..100) {
        let filter = Filter::new().with("cell_id", "A375");
        let opts = QueryOptions::default().skip(skip).limit(limit);
        let stmt = Compiler::default().compile(&filter, &opts, false).unwrap();
        prop_assert_eq!(stmt.text.contains(" LIMIT "), limit > 0);
        prop_assert_eq!(stmt.text.contains(" OFFSET "), skip > 0);
        if skip > 0 && limit > 0 {
            prop_assert!(stmt.text.find(" LIMIT ").unwrap() < stmt.text.find(" OFFSET ").unwrap());
        }
    }
}
