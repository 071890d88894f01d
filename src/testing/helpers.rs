// Test helper functions
//
// Short constructors for the shapes the assignment tests keep rebuilding.

use crate::assignment::{Constraint, Member, MemberSubscription};
use crate::constants::{PartitionIndex, STRATEGY_NAME};

/// Owned topic names
pub fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Members "member-1", "member-2", ... joined in list order
///
/// `None` is an unrestricted member, `Some(list)` an allow-set.
pub fn make_members(allowed: &[Option<&[PartitionIndex]>]) -> Vec<Member> {
    allowed
        .iter()
        .enumerate()
        .map(|(i, allowed)| {
            let constraint = match allowed {
                None => Constraint::Unrestricted,
                Some(list) => Constraint::allow(list.iter().copied()),
            };
            Member::new(format!("member-{}", i + 1), constraint, i)
        })
        .collect()
}

/// Subscription metadata for `topic_names` carrying `constraint`
pub fn make_subscription(topic_names: &[&str], constraint: &Constraint) -> MemberSubscription {
    MemberSubscription::with_constraint(topics(topic_names), constraint)
}

/// JoinGroup protocol lists of `members`, each advertising only this assignor
pub fn make_protocols(
    members: &[Member],
    topic_names: &[&str],
) -> Vec<(String, Vec<(String, Vec<u8>)>)> {
    let mut ordered: Vec<&Member> = members.iter().collect();
    ordered.sort_by_key(|member| member.join_order);

    ordered
        .into_iter()
        .map(|member| {
            let metadata = make_subscription(topic_names, &member.constraint).encode();
            (
                member.id.clone(),
                vec![(STRATEGY_NAME.to_string(), metadata)],
            )
        })
        .collect()
}
