use crate::error::{CoreError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Everything scraped for one Reddit account. Posts and comments keep scrape order
/// (newest first), which is also the order citations are taken in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub link_karma: u64,
    #[serde(default)]
    pub comment_karma: u64,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub submission_title: Option<String>,
    #[serde(default)]
    pub submission_id: Option<String>,
}

impl UserRecord {
    /// Parses a saved record, rejecting documents that lack `username`, `posts` or
    /// `comments` before attempting typed deserialization.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let object = value.as_object().ok_or_else(|| ValidationError::InvalidField {
            field: "record".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;

        match object.get("username") {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    field: "username".to_string(),
                    reason: "expected a string".to_string(),
                }
                .into())
            }
            None => {
                return Err(ValidationError::MissingField {
                    field: "username".to_string(),
                }
                .into())
            }
        }

        for field in ["posts", "comments"] {
            match object.get(field) {
                Some(Value::Array(_)) => {}
                Some(_) => {
                    return Err(ValidationError::InvalidField {
                        field: field.to_string(),
                        reason: "expected an array".to_string(),
                    }
                    .into())
                }
                None => {
                    return Err(ValidationError::MissingField {
                        field: field.to_string(),
                    }
                    .into())
                }
            }
        }

        let record: UserRecord =
            serde_json::from_value(value).map_err(|e| ValidationError::InvalidField {
                field: "record".to_string(),
                reason: e.to_string(),
            })?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "username".to_string(),
            });
        }
        Ok(())
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Distinct subreddit names across posts and comments.
    pub fn distinct_subreddits(&self) -> BTreeSet<&str> {
        self.posts
            .iter()
            .map(|post| post.subreddit.as_str())
            .chain(self.comments.iter().map(|comment| comment.subreddit.as_str()))
            .collect()
    }

    pub fn distinct_comment_subreddits(&self) -> BTreeSet<&str> {
        self.comments
            .iter()
            .map(|comment| comment.subreddit.as_str())
            .collect()
    }

    pub fn first_post_ids(&self, n: usize) -> Vec<String> {
        self.posts.iter().take(n).map(|post| post.id.clone()).collect()
    }

    pub fn first_comment_ids(&self, n: usize) -> Vec<String> {
        self.comments
            .iter()
            .take(n)
            .map(|comment| comment.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment(id: &str, subreddit: &str) -> Comment {
        Comment {
            id: id.to_string(),
            body: "body".to_string(),
            subreddit: subreddit.to_string(),
            score: 1,
            created_utc: 0.0,
            permalink: format!("https://reddit.com/r/{}/comments/{}", subreddit, id),
            submission_title: None,
            submission_id: None,
        }
    }

    #[test]
    fn test_from_json_accepts_minimal_record() {
        let raw = json!({
            "username": "spez",
            "posts": [{"id": "p1", "title": "Hello"}],
            "comments": []
        })
        .to_string();

        let record = UserRecord::from_json(&raw).unwrap();
        assert_eq!(record.username, "spez");
        assert_eq!(record.posts[0].selftext, "");
        assert_eq!(record.posts[0].upvote_ratio, None);
        assert_eq!(record.link_karma, 0);
    }

    #[test]
    fn test_from_json_missing_fields() {
        let raw = json!({"username": "spez", "posts": []}).to_string();
        match UserRecord::from_json(&raw) {
            Err(CoreError::Validation(ValidationError::MissingField { field })) => {
                assert_eq!(field, "comments");
            }
            other => panic!("Expected missing comments, got {:?}", other),
        }

        let raw = json!({"posts": [], "comments": []}).to_string();
        assert!(matches!(
            UserRecord::from_json(&raw),
            Err(CoreError::Validation(ValidationError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_from_json_rejects_non_array_posts() {
        let raw = json!({"username": "spez", "posts": "none", "comments": []}).to_string();
        match UserRecord::from_json(&raw) {
            Err(CoreError::Validation(ValidationError::InvalidField { field, .. })) => {
                assert_eq!(field, "posts");
            }
            other => panic!("Expected invalid posts, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_username_fails_validation() {
        let raw = json!({"username": "  ", "posts": [], "comments": []}).to_string();
        assert!(matches!(
            UserRecord::from_json(&raw),
            Err(CoreError::Validation(ValidationError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_subreddit_sets_and_citation_slices() {
        let record = UserRecord {
            username: "tester".to_string(),
            created_utc: 0.0,
            link_karma: 0,
            comment_karma: 0,
            posts: vec![],
            comments: vec![
                comment("c1", "rust"),
                comment("c2", "rust"),
                comment("c3", "golang"),
            ],
        };

        assert_eq!(record.distinct_subreddits().len(), 2);
        assert_eq!(record.distinct_comment_subreddits().len(), 2);
        assert_eq!(record.first_comment_ids(2), vec!["c1", "c2"]);
        assert_eq!(record.first_comment_ids(10).len(), 3);
        assert!(record.first_post_ids(2).is_empty());
    }
}
