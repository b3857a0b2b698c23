use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::models::*;

/// Sort keys accepted by the article list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
  CreatedAt,
  UpdatedAt,
  Views,
  Likes,
}

impl FromStr for SortBy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "createdAt" | "created_at" => Ok(SortBy::CreatedAt),
      "updatedAt" | "updated_at" => Ok(SortBy::UpdatedAt),
      "views" => Ok(SortBy::Views),
      "likes" => Ok(SortBy::Likes),
      _ => Err(Error::BadRequest(format!("unknown sort key: {}", s))),
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  Desc,
}

impl Default for SortOrder {
  fn default() -> Self {
    SortOrder::Desc
  }
}

impl FromStr for SortOrder {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "asc" => Ok(SortOrder::Asc),
      "desc" => Ok(SortOrder::Desc),
      _ => Err(Error::BadRequest(format!("unknown sort order: {}", s))),
    }
  }
}

/// Parameters for `ArticleStore::list`.  Empty strings and zero numbers are
/// treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleQuery {
  pub page: Option<u32>,
  pub limit: Option<u32>,
  pub search: Option<String>,
  pub category: Option<String>,
  pub tag: Option<String>,
  pub author_id: Option<i32>,
  pub sort_by: Option<SortBy>,
  pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
  pub title: String,
  pub content: String,
  pub summary: String,
  pub author: String,
  pub author_id: i32,
  pub category: String,
  pub tags: Vec<String>,
  pub cover_image: Option<String>,
  pub is_published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticle {
  pub title: Option<String>,
  pub content: Option<String>,
  pub summary: Option<String>,
  pub category: Option<String>,
  pub tags: Option<Vec<String>>,
  pub cover_image: Option<String>,
  pub is_published: Option<bool>,
}

impl UpdateArticle {
  /// Merge the supplied fields into `article`.  Identity and timestamps are
  /// left to the caller.
  pub fn apply_to(&self, article: &mut Article) {
    if let Some(title) = &self.title {
      article.title = title.clone();
    }
    if let Some(content) = &self.content {
      article.content = content.clone();
    }
    if let Some(summary) = &self.summary {
      article.summary = summary.clone();
    }
    if let Some(category) = &self.category {
      article.category = category.clone();
    }
    if let Some(tags) = &self.tags {
      article.tags = tags.clone();
    }
    if let Some(cover_image) = &self.cover_image {
      article.cover_image = Some(cover_image.clone());
    }
    if let Some(is_published) = self.is_published {
      article.is_published = is_published;
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleOut<T> {
  pub article: T,
}

/// One page of the filtered article view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
  pub articles: Vec<Article>,
  pub page: u32,
  pub limit: u32,
  pub total_pages: u32,
  pub filtered_count: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_from_json() {
    let query: ArticleQuery = serde_json::from_str(
      r#"{"search":"vue","authorId":1,"sortBy":"views","order":"asc"}"#
    ).expect("valid query");
    assert_eq!(query.search.as_deref(), Some("vue"));
    assert_eq!(query.author_id, Some(1));
    assert_eq!(query.sort_by, Some(SortBy::Views));
    assert_eq!(query.order, Some(SortOrder::Asc));
    assert_eq!(query.page, None);
  }

  #[test]
  fn sort_keys_parse() {
    assert_eq!("createdAt".parse::<SortBy>().ok(), Some(SortBy::CreatedAt));
    assert_eq!("likes".parse::<SortBy>().ok(), Some(SortBy::Likes));
    assert!("title".parse::<SortBy>().is_err());
    assert!("up".parse::<SortOrder>().is_err());
  }
}
