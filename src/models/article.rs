use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id: i32,
  pub title: String,
  pub content: String,
  pub summary: String,
  pub author: String,
  pub author_id: i32,
  pub category: String,
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cover_image: Option<String>,
  pub views: u64,
  pub likes: u64,
  pub comments: u64,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
  pub is_published: bool,
}

impl Article {
  /// Case-insensitive substring match against title, summary or any tag.
  /// `needle` must already be lowercase.
  pub fn matches_search(&self, needle: &str) -> bool {
    self.title.to_lowercase().contains(needle)
      || self.summary.to_lowercase().contains(needle)
      || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
  }

  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }
}
