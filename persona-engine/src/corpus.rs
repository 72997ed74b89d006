use persona_core::UserRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

const PREVIEW_CHARS: usize = 100;

/// All of a user's text flattened into one lowercase string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    text: String,
}

impl Corpus {
    pub fn from_record(record: &UserRecord) -> Self {
        let mut pieces: Vec<&str> =
            Vec::with_capacity(record.posts.len() * 3 + record.comments.len() * 2);

        for post in &record.posts {
            pieces.push(&post.title);
            pieces.push(&post.selftext);
            pieces.push(&post.subreddit);
        }
        for comment in &record.comments {
            pieces.push(&comment.body);
            pieces.push(&comment.subreddit);
        }

        Self {
            text: pieces.join(" ").to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CitationKind {
    Post,
    Comment,
}

impl fmt::Display for CitationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationKind::Post => write!(f, "Post"),
            CitationKind::Comment => write!(f, "Comment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub kind: CitationKind,
    pub url: String,
    pub preview: String,
}

/// Item id → citation, covering every post and comment of one record.
#[derive(Debug, Clone, Default)]
pub struct CitationLookup {
    entries: HashMap<String, Citation>,
}

impl CitationLookup {
    pub fn from_record(record: &UserRecord) -> Self {
        let mut entries = HashMap::with_capacity(record.posts.len() + record.comments.len());

        for post in &record.posts {
            entries.insert(
                post.id.clone(),
                Citation {
                    kind: CitationKind::Post,
                    url: post.url.clone(),
                    preview: preview(&post.title),
                },
            );
        }
        for comment in &record.comments {
            entries.insert(
                comment.id.clone(),
                Citation {
                    kind: CitationKind::Comment,
                    url: comment.permalink.clone(),
                    preview: preview(&comment.body),
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&Citation> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First 100 characters, with `...` appended when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{Comment, Post};

    fn record() -> UserRecord {
        UserRecord {
            username: "tester".to_string(),
            created_utc: 0.0,
            link_karma: 0,
            comment_karma: 0,
            posts: vec![Post {
                id: "p1".to_string(),
                title: "Learning RUST".to_string(),
                selftext: "".to_string(),
                subreddit: "rust".to_string(),
                score: 3,
                created_utc: 0.0,
                url: "https://reddit.com/r/rust/comments/p1/".to_string(),
                num_comments: 0,
                upvote_ratio: Some(1.0),
            }],
            comments: vec![Comment {
                id: "c1".to_string(),
                body: "x".repeat(150),
                subreddit: "AskReddit".to_string(),
                score: 1,
                created_utc: 0.0,
                permalink: "https://reddit.com/r/AskReddit/comments/a/b/c1/".to_string(),
                submission_title: None,
                submission_id: None,
            }],
        }
    }

    #[test]
    fn test_corpus_flattens_and_lowercases() {
        let corpus = Corpus::from_record(&record());
        assert!(corpus.as_str().starts_with("learning rust  rust "));
        assert!(corpus.as_str().ends_with(" askreddit"));
        assert_eq!(corpus.word_count(), 5);
    }

    #[test]
    fn test_empty_record_gives_empty_corpus() {
        let mut empty = record();
        empty.posts.clear();
        empty.comments.clear();
        let corpus = Corpus::from_record(&empty);
        assert!(corpus.is_empty());
        assert_eq!(corpus.word_count(), 0);
        assert!(CitationLookup::from_record(&empty).is_empty());
    }

    #[test]
    fn test_citation_lookup_covers_posts_and_comments() {
        let lookup = CitationLookup::from_record(&record());
        assert_eq!(lookup.len(), 2);

        let post = lookup.get("p1").unwrap();
        assert_eq!(post.kind, CitationKind::Post);
        assert_eq!(post.preview, "Learning RUST");

        let comment = lookup.get("c1").unwrap();
        assert_eq!(comment.kind.to_string(), "Comment");
        assert_eq!(comment.preview.chars().count(), 103);
        assert!(comment.preview.ends_with("..."));
        assert!(!lookup.contains("missing"));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let exact = "é".repeat(100);
        assert_eq!(preview(&exact), exact);

        let long = "é".repeat(101);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.starts_with(&"é".repeat(100)));
    }
}
