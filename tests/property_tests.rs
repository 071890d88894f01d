// Property-based tests using proptest for the allowed-only assignor
//
// These tests generate random groups, constraints and configuration values to
// verify the assignment guarantees hold beyond the hand-picked scenarios.

#[cfg(test)]
mod property_tests {
    use std::collections::HashSet;

    use allowed_assignor::{
        assign_with, parse_allowed_partitions, BalanceMode, Constraint, Member,
        MemberSubscription, PartitionIndex, RawAllowedPartitions, Topology,
    };
    use proptest::prelude::*;

    fn constraint_strategy() -> impl Strategy<Value = Constraint> {
        prop_oneof![
            1 => Just(Constraint::Unrestricted),
            3 => prop::collection::vec(0u16..48, 0..12).prop_map(Constraint::allow),
        ]
    }

    fn group_strategy() -> impl Strategy<Value = Vec<Constraint>> {
        prop::collection::vec(constraint_strategy(), 1..7)
    }

    fn mode_strategy() -> impl Strategy<Value = BalanceMode> {
        prop_oneof![Just(BalanceMode::FewestLoaded), Just(BalanceMode::Lookahead)]
    }

    fn make_members(constraints: &[Constraint]) -> Vec<Member> {
        constraints
            .iter()
            .enumerate()
            .map(|(i, c)| Member::new(format!("member-{}", i), c.clone(), i))
            .collect()
    }

    fn make_topology(partition_count: usize) -> Topology {
        Topology::new(vec!["topic-a".to_string(), "topic-b".to_string()], partition_count)
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_members_only_get_allowed_partitions(
            partition_count in 0usize..40,
            constraints in group_strategy(),
            mode in mode_strategy(),
        ) {
            // Property: no member ever receives a partition its constraint excludes
            let members = make_members(&constraints);
            let assignment = assign_with(&make_topology(partition_count), &members, mode).unwrap();

            for member in &members {
                for p in assignment.partition_indices(&member.id) {
                    prop_assert!(member.constraint.allows(p), "{} got {}", member.id, p);
                    prop_assert!((p as usize) < partition_count);
                }
            }
        }

        #[test]
        fn test_partitions_have_exactly_one_fate(
            partition_count in 0usize..40,
            constraints in group_strategy(),
            mode in mode_strategy(),
        ) {
            // Property: every index is owned by one member, or by nobody when
            // nobody is eligible for it
            let members = make_members(&constraints);
            let assignment = assign_with(&make_topology(partition_count), &members, mode).unwrap();

            let mut seen = HashSet::new();
            for (_, partitions) in assignment.iter() {
                for &p in partitions {
                    prop_assert!(seen.insert(p), "partition {} assigned twice", p);
                }
            }

            for p in 0..partition_count as PartitionIndex {
                let eligible = constraints.iter().any(|c| c.allows(p));
                prop_assert_eq!(seen.contains(&p), eligible);
                prop_assert_eq!(assignment.unassigned().contains(&p), !eligible);
            }
            prop_assert_eq!(assignment.assigned_count(), seen.len());
        }

        #[test]
        fn test_topics_are_co_partitioned(
            partition_count in 0usize..40,
            constraints in group_strategy(),
        ) {
            // Property: a member owns (topic-a, p) exactly when it owns (topic-b, p)
            let members = make_members(&constraints);
            let output = allowed_assignor::assign(&make_topology(partition_count), &members)
                .unwrap()
                .into_output();

            for (_, member_assignment) in &output {
                prop_assert_eq!(
                    member_assignment.partitions("topic-a"),
                    member_assignment.partitions("topic-b")
                );
                prop_assert_eq!(
                    member_assignment.partition_count(),
                    member_assignment.partition_indices().len() * 2
                );
            }
        }

        #[test]
        fn test_unrestricted_groups_are_balanced(
            partition_count in 0usize..200,
            group_size in 1usize..12,
            mode in mode_strategy(),
        ) {
            // Property: with no constraints, counts differ by at most one
            let members = make_members(&vec![Constraint::Unrestricted; group_size]);
            let assignment = assign_with(&make_topology(partition_count), &members, mode).unwrap();

            let counts: Vec<usize> = assignment.iter().map(|(_, p)| p.len()).collect();
            let max = counts.iter().copied().max().unwrap();
            let min = counts.iter().copied().min().unwrap();
            prop_assert!(max - min <= 1, "counts {:?}", counts);
            prop_assert_eq!(counts.iter().sum::<usize>(), partition_count);
        }

        #[test]
        fn test_assignment_is_deterministic(
            partition_count in 0usize..40,
            constraints in group_strategy(),
            mode in mode_strategy(),
        ) {
            // Property: the result depends on join order only, not on the
            // order members are handed over in
            let members = make_members(&constraints);
            let mut shuffled = members.clone();
            shuffled.reverse();

            let topology = make_topology(partition_count);
            let first = assign_with(&topology, &members, mode).unwrap();
            let second = assign_with(&topology, &members, mode).unwrap();
            let reversed = assign_with(&topology, &shuffled, mode).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &reversed);
        }

        #[test]
        fn test_canonical_rendering_round_trip(
            indices in prop::collection::vec(0u16..=32767, 0..20),
        ) {
            // Property: parse(render(c)) == c, and parsing is idempotent
            let constraint = Constraint::allow(indices);
            let reparsed = parse_allowed_partitions(&constraint.to_raw()).unwrap();
            prop_assert_eq!(&reparsed, &constraint);

            let again = parse_allowed_partitions(&reparsed.to_raw()).unwrap();
            prop_assert_eq!(again, reparsed);
        }

        #[test]
        fn test_integer_sequences_normalize(
            indices in prop::collection::vec(0i64..=32767, 0..20),
        ) {
            // Property: any order with duplicates yields the sorted distinct set
            let constraint = parse_allowed_partitions(&RawAllowedPartitions::from(indices.clone())).unwrap();

            let mut expected: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            expected.sort_unstable();
            expected.dedup();

            prop_assert_eq!(constraint.allow_set().unwrap().as_slice(), expected.as_slice());
        }

        #[test]
        fn test_out_of_range_values_rejected(
            value in prop_oneof![i64::MIN..0i64, 32768i64..i64::MAX],
        ) {
            // Property: negatives and values above the bound are configuration errors
            let scalar = parse_allowed_partitions(&RawAllowedPartitions::from(value));
            prop_assert!(scalar.unwrap_err().is_configuration());

            let delimited = parse_allowed_partitions(&RawAllowedPartitions::from(format!("1, {}", value)));
            prop_assert!(delimited.unwrap_err().is_configuration());
        }

        #[test]
        fn test_non_numeric_tokens_rejected(token in "[a-zA-Z_][a-zA-Z0-9_]{0,8}") {
            // Property: a token that is not an integer fails the whole value
            let raw = RawAllowedPartitions::from(format!("0,{},2", token));
            prop_assert!(parse_allowed_partitions(&raw).unwrap_err().is_configuration());
        }

        #[test]
        fn test_constraint_survives_subscription(
            constraint in constraint_strategy(),
            topic in "[a-z][a-z0-9.-]{0,20}",
        ) {
            // Property: the constraint a member advertises is the one the leader decodes
            let sub = MemberSubscription::with_constraint(vec![topic], &constraint);
            let decoded = MemberSubscription::parse(&sub.encode()).unwrap();
            prop_assert_eq!(decoded.constraint().unwrap(), constraint);
        }
    }
}
