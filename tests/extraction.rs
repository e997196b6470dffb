use channel_intel::extract::{extract_category, extract_target_info};
use channel_intel::{extract, IdentifierCategory, ItemKind, VideoRecord};

#[test]
fn empty_text_yields_every_category_empty() {
    let identifiers = extract("");
    assert_eq!(identifiers.iter().count(), 16);
    assert!(identifiers.iter().all(|(_, values)| values.is_empty()));
    assert!(identifiers.is_empty());
}

#[test]
fn contact_scenario_picks_up_email_handle_and_github() {
    let text = "Contact me at jane@example.com or follow @janedoe on twitter, linktr.ee skipped, github.com/janedoe";
    let identifiers = extract(text);

    assert_eq!(identifiers.get(IdentifierCategory::Email), ["jane@example.com"]);
    assert!(identifiers
        .get(IdentifierCategory::Twitter)
        .contains(&"janedoe".to_string()));
    assert_eq!(identifiers.get(IdentifierCategory::Github), ["janedoe"]);

    let websites = identifiers.get(IdentifierCategory::Website);
    assert!(websites.contains(&"linktr.ee".to_string()));
    assert!(websites.contains(&"github.com".to_string()));
}

#[test]
fn handle_and_url_forms_stay_separate_unless_identical() {
    let identifiers = extract("ping @Foo or https://twitter.com/foo and https://twitter.com/Foo");
    assert_eq!(identifiers.get(IdentifierCategory::Twitter), ["Foo", "foo"]);
}

#[test]
fn x_dot_com_urls_count_as_twitter() {
    let identifiers = extract("new home: https://x.com/jane_d");
    assert!(identifiers
        .get(IdentifierCategory::Twitter)
        .contains(&"jane_d".to_string()));
}

#[test]
fn discord_invites_from_all_hosts() {
    let text = "join discord.gg/abc-123 or https://discord.com/invite/xyz and discordapp.com/invite/q1";
    assert_eq!(
        extract_category(text, IdentifierCategory::Discord),
        vec!["abc-123", "xyz", "q1"]
    );
}

#[test]
fn phone_numbers_tolerate_separators() {
    let with_country = extract("Call +1 555-123-4567 today");
    assert_eq!(with_country.get(IdentifierCategory::Phone), ["+1 555-123-4567"]);

    let with_parens = extract("Call (555) 123-4567");
    assert!(with_parens
        .get(IdentifierCategory::Phone)
        .contains(&"(555) 123-4567".to_string()));
}

#[test]
fn website_strips_scheme_and_www() {
    let identifiers = extract("Visit https://www.example.com/shop today");
    assert_eq!(identifiers.get(IdentifierCategory::Website), ["example.com"]);
}

#[test]
fn telegram_requires_five_characters() {
    assert!(extract_category("t.me/abcd", IdentifierCategory::Telegram).is_empty());
    assert_eq!(
        extract_category("t.me/abcde and telegram.me/channel_x", IdentifierCategory::Telegram),
        vec!["abcde", "channel_x"]
    );
}

#[test]
fn pinterest_keeps_full_url_and_handle() {
    let identifiers = extract("boards at https://pinterest.com/janecrafts");
    assert_eq!(
        identifiers.get(IdentifierCategory::Pinterest),
        ["https://pinterest.com/janecrafts", "janecrafts"]
    );
}

#[test]
fn platform_profile_paths() {
    let text = "youtube.com/@JaneDoe reddit.com/r/rust twitch.tv/jane_live \
                linkedin.com/in/jane-doe snapchat.com/add/jane.d \
                https://facebook.com/profile.php?id=12345 fb.com/janepage";
    let identifiers = extract(text);

    assert_eq!(identifiers.get(IdentifierCategory::Youtube), ["JaneDoe"]);
    assert_eq!(identifiers.get(IdentifierCategory::Reddit), ["rust"]);
    assert_eq!(identifiers.get(IdentifierCategory::Twitch), ["jane_live"]);
    assert_eq!(identifiers.get(IdentifierCategory::Linkedin), ["jane-doe"]);
    assert_eq!(identifiers.get(IdentifierCategory::Snapchat), ["jane.d"]);
    assert_eq!(identifiers.get(IdentifierCategory::Facebook), ["12345", "janepage"]);
}

#[test]
fn repeated_matches_are_deduplicated_in_first_seen_order() {
    let identifiers = extract("b@x.io a@x.io b@x.io");
    assert_eq!(identifiers.get(IdentifierCategory::Email), ["b@x.io", "a@x.io"]);
}

#[test]
fn serialized_set_has_all_category_keys() {
    let value = serde_json::to_value(extract("nothing to see")).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 16);
    for category in IdentifierCategory::all() {
        assert!(object.contains_key(category.as_str()));
    }
}

#[test]
fn deserialized_set_restores_missing_categories() {
    let identifiers: channel_intel::IdentifierSet =
        serde_json::from_str(r#"{"email": ["a@b.io", " a@b.io ", ""]}"#).unwrap();
    assert_eq!(identifiers.get(IdentifierCategory::Email), ["a@b.io"]);
    assert_eq!(identifiers.iter().count(), 16);
}

#[test]
fn category_names_round_trip() {
    for category in IdentifierCategory::all() {
        assert_eq!(IdentifierCategory::from_name(category.as_str()), Some(*category));
        assert_eq!(category.as_str().parse::<IdentifierCategory>().unwrap(), *category);
    }
    assert_eq!(IdentifierCategory::from_name(" GitHub "), Some(IdentifierCategory::Github));
    assert_eq!(IdentifierCategory::from_name("myspace"), None);

    let err = "myspace".parse::<IdentifierCategory>().unwrap_err();
    assert!(err.to_string().contains("unknown category: myspace"));
}

#[test]
fn target_info_comes_from_first_channel() {
    let records = vec![
        VideoRecord {
            kind: ItemKind::Video,
            title: "Some clip".to_string(),
            description: "other@video.io".to_string(),
            ..VideoRecord::default()
        },
        VideoRecord {
            kind: ItemKind::Channel,
            title: "Jane Doe Studio".to_string(),
            description: "Business: jane@studio.io, call 555-123-4567".to_string(),
            ..VideoRecord::default()
        },
    ];

    let target = extract_target_info(&records);
    assert_eq!(target.name.as_deref(), Some("Jane Doe Studio"));
    assert_eq!(target.username.as_deref(), Some("jane_doe_studio"));
    assert_eq!(target.email.as_deref(), Some("jane@studio.io"));
    assert_eq!(target.phone.as_deref(), Some("555-123-4567"));
}

#[test]
fn target_info_is_empty_without_channels() {
    let records = vec![VideoRecord::default()];
    assert!(extract_target_info(&records).is_empty());
}
