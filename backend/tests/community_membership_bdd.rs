//! Behaviour-driven tests for community membership and admin succession.
//!
//! Scenarios run against the in-memory store with a clock that advances one
//! day per join, so join order is always well defined.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use mealflow_backend::domain::ports::{
    CommunityCommand, CommunityQuery, CreateCommunityRequest, MembershipRequest, SetAdminsRequest,
};
use mealflow_backend::domain::{
    Community, CommunityDraft, CommunityService, CommunityServiceOptions, Error, Member,
    MemberRole, UserId,
};
use mealflow_backend::outbound::memory::InMemoryCommunityStore;
use mealflow_backend::test_support::MutableClock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

type Service = CommunityService<InMemoryCommunityStore, InMemoryCommunityStore>;

/// Wrapper for non-Clone types to enable storage in `Slot`.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct MembershipWorld {
    runtime: Slot<RuntimeHandle>,
    store: Slot<Arc<InMemoryCommunityStore>>,
    clock: Slot<Arc<MutableClock>>,
    service: Slot<Service>,
    users: Slot<HashMap<String, UserId>>,
    community: Slot<Community>,
    last_outcome: Slot<Result<(), Error>>,
}

impl MembershipWorld {
    fn start(&self) {
        let runtime = Runtime::new().expect("create runtime");
        let store = Arc::new(InMemoryCommunityStore::with_category_names([
            "Italian", "Soup",
        ]));
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .expect("valid start time");
        let clock = Arc::new(MutableClock::new(start));
        let service = CommunityService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
            CommunityServiceOptions::default(),
        );

        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.store.set(store);
        self.clock.set(clock);
        self.service.set(service);
        self.users.set(HashMap::new());
    }

    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        let handle = self.runtime.get().expect("runtime");
        handle.0.block_on(future)
    }

    fn service(&self) -> Service {
        self.service.get().expect("service")
    }

    fn user(&self, name: &str) -> UserId {
        let mut users = self.users.get().unwrap_or_default();
        let id = users
            .entry(name.to_owned())
            .or_insert_with(UserId::random)
            .clone();
        self.users.set(users);
        id
    }

    fn community_id(&self) -> String {
        self.community.get().expect("community").id.to_string()
    }

    fn record<T>(&self, outcome: Result<T, Error>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.last_outcome.set(Ok(()));
                Some(value)
            }
            Err(error) => {
                self.last_outcome.set(Err(error));
                None
            }
        }
    }

    fn create(&self, owner: &str, name: &str, categories: Option<&str>) {
        let mut draft = CommunityDraft::named(name.trim_matches('"'));
        if let Some(categories) = categories {
            draft = draft.with_categories(categories.trim_matches('"'));
        }
        let request = CreateCommunityRequest {
            actor_id: self.user(owner).to_string(),
            draft,
        };
        let service = self.service();
        let outcome = self.block_on(service.create_community(request));
        if let Some(community) = self.record(outcome) {
            self.community.set(community);
        }
    }

    fn join(&self, name: &str) {
        if let Some(clock) = self.clock.get() {
            clock.advance(TimeDelta::days(1));
        }
        let request = MembershipRequest::new(self.community_id(), self.user(name).to_string());
        let service = self.service();
        let outcome = self.block_on(service.join_community(request));
        self.record(outcome);
    }

    fn promote(&self, requester: &str, member: &str) {
        let request = SetAdminsRequest {
            community_id: self.community_id(),
            requested_by: self.user(requester).to_string(),
            member_ids: vec![self.user(member).to_string()],
        };
        let service = self.service();
        let outcome = self.block_on(service.set_admins(request));
        self.record(outcome);
    }

    fn members(&self) -> Vec<Member> {
        let service = self.service();
        let community_id = self.community_id();
        self.block_on(service.get_all_members(&community_id))
            .expect("members load")
    }

    fn role_of(&self, name: &str) -> Option<MemberRole> {
        let user = self.user(name);
        self.members()
            .into_iter()
            .find(|member| member.user_id == user)
            .map(|member| member.role)
    }

    fn last_error(&self) -> Error {
        match self.last_outcome.get().expect("an operation ran") {
            Ok(()) => panic!("expected the last operation to fail"),
            Err(error) => error,
        }
    }
}

#[fixture]
fn world() -> MembershipWorld {
    let world = MembershipWorld::default();
    world.start();
    world
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("{owner} has created the community {name}")]
fn has_created_the_community(world: &MembershipWorld, owner: String, name: String) {
    world.create(&owner, &name, None);
    assert!(world.community.get().is_some(), "community should exist");
}

#[given("{user} has joined the community")]
fn has_joined_the_community(world: &MembershipWorld, user: String) {
    world.join(&user);
    assert!(matches!(world.last_outcome.get(), Some(Ok(()))));
}

#[given("{admin} has promoted {user} to admin")]
fn has_promoted_to_admin(world: &MembershipWorld, admin: String, user: String) {
    world.promote(&admin, &user);
    assert!(matches!(world.last_outcome.get(), Some(Ok(()))));
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("{owner} creates the community {name}")]
fn creates_the_community(world: &MembershipWorld, owner: String, name: String) {
    world.create(&owner, &name, None);
}

#[when("{owner} creates {name} with categories {categories}")]
fn creates_with_categories(
    world: &MembershipWorld,
    owner: String,
    name: String,
    categories: String,
) {
    world.create(&owner, &name, Some(&categories));
}

#[when("{user} joins the community again")]
fn joins_again(world: &MembershipWorld, user: String) {
    world.join(&user);
}

#[when("{user} leaves the community")]
fn leaves_the_community(world: &MembershipWorld, user: String) {
    let request = MembershipRequest::new(world.community_id(), world.user(&user).to_string());
    let service = world.service();
    let outcome = world.block_on(service.leave_community(request));
    world.record(outcome);
}

#[when("{requester} promotes {user} to admin")]
fn promotes_to_admin(world: &MembershipWorld, requester: String, user: String) {
    world.promote(&requester, &user);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the member count is {count}")]
fn the_member_count_is(world: &MembershipWorld, count: usize) {
    assert_eq!(world.members().len(), count);
}

#[then("{user} is an admin of the community")]
fn is_an_admin(world: &MembershipWorld, user: String) {
    assert_eq!(world.role_of(&user), Some(MemberRole::Admin));
}

#[then("{user} is a member of the community")]
fn is_a_member(world: &MembershipWorld, user: String) {
    assert_eq!(world.role_of(&user), Some(MemberRole::Member));
}

#[then("{user} is the only admin of the community")]
fn is_the_only_admin(world: &MembershipWorld, user: String) {
    let expected = world.user(&user);
    let admins: Vec<UserId> = world
        .members()
        .into_iter()
        .filter(Member::is_admin)
        .map(|member| member.user_id)
        .collect();
    assert_eq!(admins, vec![expected]);
}

#[then("{user} has no membership in the community")]
fn has_no_membership(world: &MembershipWorld, user: String) {
    assert_eq!(world.role_of(&user), None);
}

#[then("the last operation fails with {code}")]
fn the_last_operation_fails_with(world: &MembershipWorld, code: String) {
    let error = world.last_error();
    let actual = serde_json::to_value(error.code()).expect("code serialises");
    assert_eq!(actual, serde_json::Value::String(code));
}

#[then("the last error mentions {text}")]
fn the_last_error_mentions(world: &MembershipWorld, text: String) {
    let error = world.last_error();
    assert!(
        error.message().contains(&text),
        "{:?} should mention {text}",
        error.message()
    );
}

#[then("no communities exist")]
fn no_communities_exist(world: &MembershipWorld) {
    let store = world.store.get().expect("store");
    assert!(world.block_on(store.snapshot()).is_empty());
    let service = world.service();
    let all = world
        .block_on(service.get_all_communities())
        .expect("listing");
    assert!(all.is_empty());
}

#[then("the number of linked categories is {count}")]
fn the_number_of_linked_categories_is(world: &MembershipWorld, count: usize) {
    assert!(matches!(world.last_outcome.get(), Some(Ok(()))));
    let community = world.community.get().expect("community created");
    assert_eq!(community.categories.len(), count);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "Creator is the only admin of a new community"
)]
fn creator_is_the_only_admin(world: MembershipWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "Joining twice is a conflict"
)]
fn joining_twice_is_a_conflict(world: MembershipWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "A remaining co-admin keeps governing"
)]
fn remaining_co_admin_keeps_governing(world: MembershipWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "The earliest joiner succeeds the sole admin"
)]
fn earliest_joiner_succeeds_sole_admin(world: MembershipWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "Members who are not admins cannot promote"
)]
fn members_who_are_not_admins_cannot_promote(world: MembershipWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/community_membership.feature",
    name = "Unknown categories block creation entirely"
)]
fn unknown_categories_block_creation(world: MembershipWorld) {
    let _ = world;
}
