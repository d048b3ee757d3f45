//! Tests for membership states and successor selection.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};
use uuid::Uuid;

#[fixture]
fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn member_at(community_id: CommunityId, joined_at: DateTime<Utc>, role: MemberRole) -> Member {
    Member {
        community_id,
        user_id: UserId::random(),
        role,
        joined_at,
        left_at: None,
        is_pending: false,
    }
}

#[rstest]
fn successor_is_earliest_joiner_excluding_departing(start: DateTime<Utc>) {
    let community_id = CommunityId::random();
    let admin = member_at(community_id, start, MemberRole::Admin);
    let day_one = member_at(community_id, start + Duration::days(1), MemberRole::Member);
    let day_two = member_at(community_id, start + Duration::days(2), MemberRole::Member);
    let members = vec![day_two, day_one.clone(), admin.clone()];

    assert_eq!(select_successor(&members, &admin.user_id), Some(&day_one));
}

#[rstest]
fn successor_is_none_when_departing_is_alone(start: DateTime<Utc>) {
    let admin = member_at(CommunityId::random(), start, MemberRole::Admin);
    let members = vec![admin.clone()];

    assert_eq!(select_successor(&members, &admin.user_id), None);
}

#[rstest]
fn identical_join_times_break_ties_on_user_id(start: DateTime<Utc>) {
    let community_id = CommunityId::random();
    let admin = member_at(community_id, start, MemberRole::Admin);
    let low = Member {
        user_id: UserId::from_uuid(Uuid::from_u128(1)),
        ..member_at(community_id, start + Duration::hours(1), MemberRole::Member)
    };
    let high = Member {
        user_id: UserId::from_uuid(Uuid::from_u128(2)),
        ..member_at(community_id, start + Duration::hours(1), MemberRole::Member)
    };

    let forward = vec![admin.clone(), high.clone(), low.clone()];
    let backward = vec![low.clone(), high, admin.clone()];
    assert_eq!(select_successor(&forward, &admin.user_id), Some(&low));
    assert_eq!(select_successor(&backward, &admin.user_id), Some(&low));
}

#[rstest]
#[case::none(None, MembershipState::None)]
#[case::member(Some(MemberRole::Member), MembershipState::Member)]
#[case::admin(Some(MemberRole::Admin), MembershipState::Admin)]
fn state_follows_role(
    start: DateTime<Utc>,
    #[case] role: Option<MemberRole>,
    #[case] expected: MembershipState,
) {
    let member = role.map(|role| member_at(CommunityId::random(), start, role));
    assert_eq!(MembershipState::of(member.as_ref()), expected);
}

#[rstest]
fn departure_stamps_left_at(start: DateTime<Utc>) {
    let member = member_at(CommunityId::random(), start, MemberRole::Member);
    let left = member.departed_at(start + Duration::days(3));
    assert_eq!(left.left_at, Some(start + Duration::days(3)));
}

#[rstest]
#[case::delete("\"delete\"", LastMemberPolicy::Delete)]
#[case::archive("\"archive\"", LastMemberPolicy::Archive)]
#[case::retain("\"retain\"", LastMemberPolicy::Retain)]
fn policy_deserialises_lowercase(#[case] json: &str, #[case] expected: LastMemberPolicy) {
    let policy: LastMemberPolicy = serde_json::from_str(json).expect("policy deserialises");
    assert_eq!(policy, expected);
}

#[rstest]
fn role_serialises_in_upper_case() {
    let json = serde_json::to_string(&MemberRole::Admin).expect("role serialises");
    assert_eq!(json, "\"ADMIN\"");
}

#[rstest]
#[case::lowercase("archive", Ok(LastMemberPolicy::Archive))]
#[case::mixed_case(" Delete ", Ok(LastMemberPolicy::Delete))]
#[case::unknown("orphan", Err(UnknownLastMemberPolicy("orphan".to_owned())))]
fn policy_parses_from_text(
    #[case] raw: &str,
    #[case] expected: Result<LastMemberPolicy, UnknownLastMemberPolicy>,
) {
    assert_eq!(raw.parse::<LastMemberPolicy>(), expected);
}
