use chrono::{DateTime, Duration, TimeZone, Utc};
use persona_core::{Comment, CoreError, Post, UserRecord, ValidationError};
use persona_engine::{
    generate_persona, KeywordCategory, KeywordTable, PersonaGenerator, PersonaTables,
    PersonaTrait,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn post(id: &str, title: &str, subreddit: &str) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        selftext: String::new(),
        subreddit: subreddit.to_string(),
        score: 5,
        created_utc: 1_700_000_000.0,
        url: format!("https://reddit.com/r/{}/comments/{}/", subreddit, id),
        num_comments: 2,
        upvote_ratio: Some(0.9),
    }
}

fn comment(id: &str, body: &str, subreddit: &str) -> Comment {
    Comment {
        id: id.to_string(),
        body: body.to_string(),
        subreddit: subreddit.to_string(),
        score: 1,
        created_utc: 1_700_000_000.0,
        permalink: format!("https://reddit.com/r/{}/comments/abc/title/{}/", subreddit, id),
        submission_title: Some("Weekly thread".to_string()),
        submission_id: Some("abc".to_string()),
    }
}

fn user(posts: Vec<Post>, comments: Vec<Comment>) -> UserRecord {
    UserRecord {
        username: "test_user".to_string(),
        created_utc: 1_500_000_000.0,
        link_karma: 1234,
        comment_karma: 5678,
        posts,
        comments,
    }
}

fn active_user() -> UserRecord {
    let posts = (0..5)
        .map(|i| post(&format!("p{}", i), "Weekly thread", &format!("s{}", i)))
        .collect();
    let comments = (0..30)
        .map(|i| comment(&format!("c{}", i), "agreed", "s5"))
        .collect();
    user(posts, comments)
}

fn labels(traits: &[PersonaTrait]) -> Vec<&str> {
    traits.iter().map(|t| t.label.as_str()).collect()
}

#[test]
fn test_empty_activity_gives_defaults_only() {
    let generator = PersonaGenerator::default();
    let analysis = generator.analyze(&user(vec![], vec![]), fixed_now()).unwrap();

    let demographics = &analysis.profile.demographics;
    assert_eq!(demographics.location, "Unknown");
    assert_eq!(demographics.occupation, "Unknown");
    assert_eq!(demographics.age, "Adult (estimated from Reddit usage)");
    assert_eq!(
        demographics.education,
        "College-educated (inferred from communication style)"
    );
    assert_eq!(analysis.profile.trait_count(), 0);

    let report = analysis.render(&user(vec![], vec![]), fixed_now()).unwrap();
    assert!(report.contains("Posts analyzed: 0\nComments analyzed: 0\n"));
    assert!(!report.contains("•"));
}

#[test]
fn test_every_citation_resolves() {
    let mut record = active_user();
    record.posts.push(post(
        "p_help",
        "Need advice: this bug is the worst, terrible problem and annoying issue",
        "techsupport",
    ));
    record
        .comments
        .push(comment("c_social", "people misunderstand me", "socialskills"));

    let analysis = PersonaGenerator::default()
        .analyze(&record, fixed_now())
        .unwrap();
    assert!(analysis.profile.trait_count() > 0);
    for id in analysis.profile.citation_ids() {
        assert!(analysis.citations.contains(id), "dangling citation {}", id);
    }
}

#[test]
fn test_dangling_citation_renders_placeholders() {
    let record = active_user();
    let mut analysis = PersonaGenerator::default()
        .analyze(&record, fixed_now())
        .unwrap();
    analysis
        .profile
        .goals
        .push(PersonaTrait::new("Mystery goal", vec!["gone".to_string()]));

    let report = analysis.render(&record, fixed_now()).unwrap();
    assert!(report.contains("• Mystery goal\n  Citations:\n    - Unknown: No URL\n      \"No preview\"\n"));
}

#[test]
fn test_reports_are_idempotent_for_fixed_time() {
    let generator = PersonaGenerator::default();
    let record = active_user();
    let first = generator.generate_persona_at(&record, fixed_now()).unwrap();
    let second = generator.generate_persona_at(&record, fixed_now()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_keyword_ties_follow_table_order() {
    let mut tables = PersonaTables::default();
    tables.occupation = KeywordTable::new(vec![
        KeywordCategory::new("Gardener", &["garden"]),
        KeywordCategory::new("Baker", &["bread"]),
    ]);
    let record = user(vec![post("p1", "bread from the garden", "food")], vec![]);

    let analysis = PersonaGenerator::new(tables)
        .analyze(&record, fixed_now())
        .unwrap();
    assert_eq!(
        analysis.profile.demographics.occupation,
        "Gardener (based on content analysis)"
    );
}

#[test]
fn test_interest_top_three() {
    // Gaming 5, Technology 5, Sports 2, Food 0.
    let record = user(
        vec![post(
            "p1",
            "gaming game xbox playstation nintendo tech apple android computer hardware football tennis",
            "misc",
        )],
        vec![],
    );
    let analysis = PersonaGenerator::default()
        .analyze(&record, fixed_now())
        .unwrap();

    assert_eq!(
        labels(&analysis.profile.behaviors),
        vec![
            "Shows strong interest in gaming",
            "Shows strong interest in technology",
            "Shows strong interest in sports",
        ]
    );
    for behavior in &analysis.profile.behaviors {
        assert_eq!(behavior.citations, vec!["p1"]);
    }
}

#[test]
fn test_archetype_three_year_boundary() {
    let generator = PersonaGenerator::default();
    let now = fixed_now();

    let mut record = user(vec![], vec![]);
    record.created_utc = (now - Duration::days(1095)).timestamp() as f64;
    let analysis = generator.analyze(&record, now).unwrap();
    assert_eq!(
        analysis.profile.demographics.archetype,
        "Long-term Reddit user"
    );

    record.created_utc = (now - Duration::days(1094)).timestamp() as f64;
    let analysis = generator.analyze(&record, now).unwrap();
    assert_eq!(analysis.profile.demographics.archetype, "Regular Reddit user");

    record.created_utc = (now - Duration::days(364)).timestamp() as f64;
    let analysis = generator.analyze(&record, now).unwrap();
    assert_eq!(analysis.profile.demographics.archetype, "Newer Reddit user");
}

#[test]
fn test_active_commenter_rules() {
    let analysis = PersonaGenerator::default()
        .analyze(&active_user(), fixed_now())
        .unwrap();
    let profile = &analysis.profile;

    assert_eq!(
        labels(&profile.behaviors),
        vec![
            "Prefers commenting over posting - more reactive than proactive",
            "Engages across diverse communities and topics",
        ]
    );
    assert_eq!(profile.behaviors[0].citations, vec!["c0", "c1", "c2"]);
    assert_eq!(profile.behaviors[1].citations, vec!["p0", "p1"]);

    let build = profile
        .goals
        .iter()
        .find(|g| g.label == "Build connections and contribute to online communities")
        .unwrap();
    assert_eq!(build.citations, vec!["c0", "c1", "c2"]);

    assert_eq!(
        labels(&profile.personality),
        vec!["Highly Engaged"]
    );
    assert_eq!(
        profile.personality[0].description.as_deref(),
        Some("Actively participates in discussions and community interactions")
    );
}

#[test]
fn test_record_missing_comments_is_rejected() {
    let raw = serde_json::json!({
        "username": "someone",
        "posts": []
    })
    .to_string();
    let result = UserRecord::from_json(&raw);
    assert!(matches!(
        result,
        Err(CoreError::Validation(ValidationError::MissingField { ref field })) if field == "comments"
    ));
}

#[test]
fn test_default_generator_report_shape() {
    let report = generate_persona(&active_user()).unwrap();
    assert!(report.starts_with("\n========================================\nUSER PERSONA: test_user\n"));
    assert!(report.contains("Link karma: 1234\nComment karma: 5678\n"));
    assert!(report.contains("    - Comment: https://reddit.com/r/s5/comments/abc/title/c0/\n      \"agreed\"\n"));
}
