use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::models::*;
use crate::forms::article::*;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Current search/filter/pagination parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
  pub search: String,
  pub category: String,
  pub tag: String,
  pub author_id: Option<i32>,
  pub page: u32,
  pub limit: u32,
  pub sort_by: Option<SortBy>,
  pub order: SortOrder,
}

impl Default for QueryState {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

impl QueryState {
  pub fn new(limit: u32) -> Self {
    Self {
      search: String::new(),
      category: String::new(),
      tag: String::new(),
      author_id: None,
      page: 1,
      limit: if limit == 0 { DEFAULT_PAGE_SIZE } else { limit },
      sort_by: None,
      order: SortOrder::default(),
    }
  }

  /// Merge list parameters.  Empty strings and zeros leave the current value
  /// alone.  Returns true if anything changed.
  pub fn merge(&mut self, params: &ArticleQuery) -> bool {
    let before = self.clone();
    if let Some(search) = non_empty(&params.search) {
      self.search = search.to_string();
    }
    if let Some(category) = non_empty(&params.category) {
      self.category = category.to_string();
    }
    if let Some(tag) = non_empty(&params.tag) {
      self.tag = tag.to_string();
    }
    if let Some(author_id) = params.author_id.filter(|id| *id != 0) {
      self.author_id = Some(author_id);
    }
    if let Some(page) = params.page.filter(|p| *p > 0) {
      self.page = page;
    }
    if let Some(limit) = params.limit.filter(|l| *l > 0) {
      self.limit = limit;
    }
    if let Some(sort_by) = params.sort_by {
      self.sort_by = Some(sort_by);
    }
    if let Some(order) = params.order {
      self.order = order;
    }
    *self != before
  }

  /// Clear search, category, tag and author filters and go back to page 1.
  pub fn reset_filters(&mut self) {
    self.search.clear();
    self.category.clear();
    self.tag.clear();
    self.author_id = None;
    self.page = 1;
  }

  pub fn set_page(&mut self, page: u32) -> Result<()> {
    if page == 0 {
      return Err(Error::BadRequest("page starts at 1".to_string()));
    }
    self.page = page;
    Ok(())
  }

  pub fn set_limit(&mut self, limit: u32) -> Result<()> {
    if limit == 0 {
      return Err(Error::BadRequest("page size must be > 0".to_string()));
    }
    self.limit = limit;
    Ok(())
  }

  /// Apply the search, category, tag and author predicates in that order,
  /// then sort if a sort key is selected.
  pub fn filter(&self, articles: &[Article]) -> Vec<Article> {
    let needle = self.search.to_lowercase();
    let mut filtered: Vec<Article> = articles.iter()
      .filter(|a| needle.is_empty() || a.matches_search(&needle))
      .filter(|a| self.category.is_empty() || a.category == self.category)
      .filter(|a| self.tag.is_empty() || a.has_tag(&self.tag))
      .filter(|a| self.author_id.map_or(true, |id| a.author_id == id))
      .cloned()
      .collect();

    if let Some(sort_by) = self.sort_by {
      let order = self.order;
      filtered.sort_by(|a, b| {
        let ord = compare_by(sort_by, a, b);
        match order {
          SortOrder::Asc => ord,
          SortOrder::Desc => ord.reverse(),
        }
      });
    }
    filtered
  }

  /// Slice the filtered view down to the current page.
  pub fn paginate(&self, filtered: Vec<Article>) -> ArticlePage {
    let limit = self.limit as usize;
    let filtered_count = filtered.len();
    let start = (self.page.saturating_sub(1) as usize).saturating_mul(limit);
    let articles = filtered.into_iter().skip(start).take(limit).collect();
    ArticlePage {
      articles,
      page: self.page,
      limit: self.limit,
      total_pages: total_pages(filtered_count, self.limit),
      filtered_count,
    }
  }
}

fn non_empty(val: &Option<String>) -> Option<&str> {
  val.as_deref().filter(|s| !s.is_empty())
}

fn compare_by(sort_by: SortBy, a: &Article, b: &Article) -> Ordering {
  match sort_by {
    SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
    SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    SortBy::Views => a.views.cmp(&b.views),
    SortBy::Likes => a.likes.cmp(&b.likes),
  }
}

/// Ceiling of `total / limit`.
pub fn total_pages(total: usize, limit: u32) -> u32 {
  if limit == 0 {
    return 0;
  }
  let limit = limit as usize;
  ((total + limit - 1) / limit) as u32
}

/// Distinct categories, in first-seen order.
pub fn categories(articles: &[Article]) -> Vec<String> {
  let mut seen = HashSet::new();
  articles.iter()
    .filter(|a| seen.insert(a.category.as_str()))
    .map(|a| a.category.clone())
    .collect()
}

/// Distinct tags across all articles, in first-seen order.
pub fn all_tags(articles: &[Article]) -> Vec<String> {
  let mut seen = HashSet::new();
  articles.iter()
    .flat_map(|a| a.tags.iter())
    .filter(|tag| seen.insert(tag.as_str()))
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::seed_articles;

  fn ids(articles: &[Article]) -> Vec<i32> {
    articles.iter().map(|a| a.id).collect()
  }

  #[test]
  fn empty_query_passes_everything() {
    let articles = seed_articles();
    let query = QueryState::default();
    assert_eq!(ids(&query.filter(&articles)), vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn search_is_case_insensitive_over_title_summary_and_tags() {
    let articles = seed_articles();
    let mut query = QueryState::default();

    // title of 1, tag of 4.
    query.search = "vue3".to_string();
    assert_eq!(ids(&query.filter(&articles)), vec![1, 4]);

    // title and tags of article 5.
    query.search = "组件库".to_string();
    assert_eq!(ids(&query.filter(&articles)), vec![5]);

    query.search = "WEBPACK".to_string();
    assert_eq!(ids(&query.filter(&articles)), vec![3]);

    query.search = "no such text".to_string();
    assert!(query.filter(&articles).is_empty());
  }

  #[test]
  fn combined_filters_intersect() {
    let articles = seed_articles();
    let single = |f: &dyn Fn(&mut QueryState)| {
      let mut q = QueryState::default();
      f(&mut q);
      ids(&q.filter(&articles))
    };
    let by_search = single(&|q: &mut QueryState| q.search = "typescript".to_string());
    let by_tag = single(&|q: &mut QueryState| q.tag = "TypeScript".to_string());
    let by_category = single(&|q: &mut QueryState| q.category = "前端开发".to_string());

    let mut combined = QueryState::default();
    combined.search = "typescript".to_string();
    combined.tag = "TypeScript".to_string();
    combined.category = "前端开发".to_string();
    let got = ids(&combined.filter(&articles));

    let expected: Vec<i32> = by_search.iter()
      .filter(|id| by_tag.contains(id) && by_category.contains(id))
      .cloned()
      .collect();
    assert_eq!(got, expected);
    assert_eq!(got, vec![1]);
  }

  #[test]
  fn tag_match_is_exact_containment() {
    let articles = seed_articles();
    let mut query = QueryState::default();
    query.tag = "Vue".to_string();
    assert!(query.filter(&articles).is_empty());
    query.tag = "Vue3".to_string();
    assert_eq!(ids(&query.filter(&articles)), vec![1, 4]);
  }

  #[test]
  fn author_filter_and_sorting() {
    let articles = seed_articles();
    let mut query = QueryState::default();
    query.author_id = Some(2);
    assert_eq!(ids(&query.filter(&articles)), vec![2, 5]);

    query.author_id = None;
    query.sort_by = Some(SortBy::Likes);
    query.order = SortOrder::Asc;
    assert_eq!(ids(&query.filter(&articles)), vec![5, 4, 2, 3, 1]);
    query.order = SortOrder::Desc;
    assert_eq!(ids(&query.filter(&articles)), vec![1, 3, 2, 4, 5]);
    query.sort_by = Some(SortBy::CreatedAt);
    query.order = SortOrder::Asc;
    assert_eq!(ids(&query.filter(&articles)), vec![5, 4, 3, 2, 1]);
  }

  #[test]
  fn merge_ignores_empty_values() {
    let mut query = QueryState::default();
    query.search = "vue".to_string();
    let changed = query.merge(&ArticleQuery {
      search: Some(String::new()),
      page: Some(0),
      limit: Some(0),
      category: Some("TypeScript".to_string()),
      ..Default::default()
    });
    assert!(changed);
    assert_eq!(query.search, "vue");
    assert_eq!(query.category, "TypeScript");
    assert_eq!(query.page, 1);
    assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    assert!(!query.merge(&ArticleQuery::default()));
  }

  #[test]
  fn reset_is_idempotent() {
    let mut query = QueryState::default();
    query.merge(&ArticleQuery {
      search: Some("vue".to_string()),
      tag: Some("Vue3".to_string()),
      page: Some(3),
      limit: Some(2),
      ..Default::default()
    });
    query.reset_filters();
    let once = query.clone();
    query.reset_filters();
    assert_eq!(query, once);
    assert_eq!(once.page, 1);
    assert!(once.search.is_empty() && once.tag.is_empty());
    // page size is not a filter.
    assert_eq!(once.limit, 2);
  }

  #[test]
  fn pages() {
    assert_eq!(total_pages(5, 10), 1);
    assert_eq!(total_pages(5, 2), 3);
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(4, 2), 2);

    let mut query = QueryState::new(2);
    query.page = 3;
    let page = query.paginate(seed_articles());
    assert_eq!(ids(&page.articles), vec![5]);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.filtered_count, 5);

    query.page = 9;
    assert!(query.paginate(seed_articles()).articles.is_empty());
  }

  #[test]
  fn derived_sets_keep_first_seen_order() {
    let articles = seed_articles();
    assert_eq!(categories(&articles), vec!["前端开发", "TypeScript", "构建工具", "状态管理", "UI框架"]);
    let tags = all_tags(&articles);
    assert_eq!(&tags[..4], &["Vue3", "TypeScript", "前端", "类型系统"]);
    assert_eq!(tags.len(), 13);
  }

  #[test]
  fn setters_reject_zero() {
    let mut query = QueryState::default();
    assert!(query.set_page(0).is_err());
    assert!(query.set_limit(0).is_err());
    query.set_page(2).expect("page 2");
    assert_eq!(query.page, 2);
  }
}
