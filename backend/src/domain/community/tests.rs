//! Tests for community value objects and formatting.

use super::*;
use crate::domain::{CategoryName, ErrorCode, MemberRole};
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: CategoryName::new(name).expect("valid category"),
        parent_id: None,
    }
}

#[rstest]
#[case::too_short("ab", CommunityValidationError::NameTooShort { min: COMMUNITY_NAME_MIN })]
#[case::padded_too_short("  ab  ", CommunityValidationError::NameTooShort { min: COMMUNITY_NAME_MIN })]
#[case::too_long(&"x".repeat(COMMUNITY_NAME_MAX + 1), CommunityValidationError::NameTooLong { max: COMMUNITY_NAME_MAX })]
fn name_length_is_enforced(#[case] raw: &str, #[case] expected: CommunityValidationError) {
    assert_eq!(CommunityName::new(raw), Err(expected));
}

#[rstest]
fn name_is_trimmed() {
    let name = CommunityName::new("  Soup Club ").expect("valid");
    assert_eq!(name.as_str(), "Soup Club");
}

#[rstest]
#[case::blank("   ")]
#[case::empty("")]
fn blank_community_id_is_missing(#[case] raw: &str) {
    assert_eq!(CommunityId::new(raw), Err(CommunityValidationError::EmptyId));
}

#[rstest]
fn validation_errors_map_to_bad_requests_naming_the_field() {
    let error: Error = CommunityValidationError::DescriptionTooLong {
        max: COMMUNITY_DESCRIPTION_MAX,
    }
    .into();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "description");
}

#[rstest]
#[case::absent(None, Ok(None))]
#[case::blank(Some("   "), Ok(None))]
#[case::https(Some("https://cdn.example.test/soup.png"), Ok(Some("https://cdn.example.test/soup.png".to_owned())))]
#[case::relative(Some("soup.png"), Err(CommunityValidationError::InvalidImageUri { value: "soup.png".to_owned() }))]
#[case::ftp(Some("ftp://example.test/soup.png"), Err(CommunityValidationError::InvalidImageUri { value: "ftp://example.test/soup.png".to_owned() }))]
fn image_must_be_http_uri(
    #[case] raw: Option<&str>,
    #[case] expected: Result<Option<String>, CommunityValidationError>,
) {
    assert_eq!(validate_image(raw), expected);
}

#[rstest]
fn description_limit_counts_characters() {
    let at_limit = "é".repeat(COMMUNITY_DESCRIPTION_MAX);
    assert!(validate_description(Some(&at_limit)).is_ok());

    let over_limit = "é".repeat(COMMUNITY_DESCRIPTION_MAX + 1);
    assert!(validate_description(Some(&over_limit)).is_err());
}

#[rstest]
fn draft_deserialises_with_defaults() {
    let draft: CommunityDraft =
        serde_json::from_str(r#"{ "name": "Soup Club" }"#).expect("draft deserialises");
    assert_eq!(draft, CommunityDraft::named("Soup Club"));
    assert_eq!(draft.categories, CategoryInput::Absent);
}

#[rstest]
fn draft_accepts_form_encoded_categories() {
    let draft: CommunityDraft = serde_json::from_str(
        r#"{ "name": "Soup Club", "privacy": "PRIVATE", "categories": "Italian,Soup" }"#,
    )
    .expect("draft deserialises");
    assert_eq!(draft.privacy, Some(Privacy::Private));
    assert_eq!(draft.categories, CategoryInput::from("Italian,Soup"));
}

#[rstest]
fn formatting_flattens_category_links(created_at: DateTime<Utc>) {
    let owner = UserId::random();
    let id = CommunityId::random();
    let italian = category("Italian");
    let soup = category("Soup");
    let record = CommunityRecord {
        id,
        name: CommunityName::new("Soup Club").expect("valid"),
        description: Some("Broths and bisques".to_owned()),
        image: None,
        privacy: Privacy::Public,
        recipe_creation_permission: RecipeCreationPermission::AnyMember,
        owner_id: owner.clone(),
        created_at,
        updated_at: created_at,
        archived_at: None,
        categories: vec![
            CommunityCategoryLink {
                category: italian.clone(),
            },
            CommunityCategoryLink {
                category: soup.clone(),
            },
        ],
        members: vec![Member {
            community_id: id,
            user_id: owner,
            role: MemberRole::Admin,
            joined_at: created_at,
            left_at: None,
            is_pending: false,
        }],
    };

    let community = Community::from(record);
    assert_eq!(community.categories, vec![italian, soup]);
    assert_eq!(community.member_count, 1);

    let json = serde_json::to_value(&community).expect("serialises");
    assert_eq!(json["categories"][0]["name"], "Italian");
    assert_eq!(json["recipeCreationPermission"], "ANY_MEMBER");
    assert!(json.get("archivedAt").is_none());
}
