use log::*;

use std::cell::RefCell;
use std::time::Duration;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::*;
use crate::app::*;
use crate::models::*;
use crate::util::from_rfc3339_or_now;

use super::source::*;

/// Simulated round-trip delay per request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
  pub list: Duration,
  pub get: Duration,
  pub write: Duration,
}

impl Default for Latency {
  fn default() -> Self {
    Self {
      list: Duration::from_millis(500),
      get: Duration::from_millis(300),
      write: Duration::from_millis(500),
    }
  }
}

impl Latency {
  pub fn none() -> Self {
    Self {
      list: Duration::from_millis(0),
      get: Duration::from_millis(0),
      write: Duration::from_millis(0),
    }
  }

  /// Load `latency.*_ms` overrides from AppConfig.
  pub fn from_config(config: &AppConfig) -> Result<Self> {
    let mut latency = Self::default();
    if let Some(ms) = config.get_int("latency.list_ms")? {
      latency.list = millis(ms, "latency.list_ms")?;
    }
    if let Some(ms) = config.get_int("latency.get_ms")? {
      latency.get = millis(ms, "latency.get_ms")?;
    }
    if let Some(ms) = config.get_int("latency.write_ms")? {
      latency.write = millis(ms, "latency.write_ms")?;
    }
    Ok(latency)
  }

  pub fn for_request(&self, req: Request) -> Duration {
    match req {
      Request::List => self.list,
      Request::Get => self.get,
      Request::Write => self.write,
    }
  }
}

fn millis(ms: i64, key: &str) -> Result<Duration> {
  if ms < 0 {
    return Err(Error::BadRequest(format!("{} must be >= 0, got {}", key, ms)));
  }
  Ok(Duration::from_millis(ms as u64))
}

struct Seed {
  id: i32,
  title: &'static str,
  content: &'static str,
  summary: &'static str,
  author: &'static str,
  author_id: i32,
  category: &'static str,
  tags: &'static [&'static str],
  cover_image: &'static str,
  views: u64,
  likes: u64,
  comments: u64,
  created_at: &'static str,
}

static SEEDS: &'static [Seed] = &[
  Seed {
    id: 1,
    title: "Vue3 组合式 API 完全指南",
    content: "# Vue3 组合式 API\n\n内容...",
    summary: "本文详细介绍 Vue3 组合式 API 的核心概念和使用技巧，帮助你快速上手 Vue3 开发。",
    author: "张三",
    author_id: 1,
    category: "前端开发",
    tags: &["Vue3", "TypeScript", "前端"],
    cover_image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    views: 1234,
    likes: 89,
    comments: 24,
    created_at: "2024-01-15T10:30:00Z",
  },
  Seed {
    id: 2,
    title: "TypeScript 类型系统深入解析",
    content: "# TypeScript 类型系统\n\n内容...",
    summary: "深入理解 TypeScript 的类型系统，掌握高级类型技巧，提升代码质量和开发效率。",
    author: "李四",
    author_id: 2,
    category: "TypeScript",
    tags: &["TypeScript", "类型系统", "教程"],
    cover_image: "https://images.unsplash.com/photo-1516116216624-53e697fedbea?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    views: 856,
    likes: 67,
    comments: 18,
    created_at: "2024-01-14T14:20:00Z",
  },
  Seed {
    id: 3,
    title: "Vite vs Webpack：现代构建工具对比",
    content: "# Vite vs Webpack\n\n内容...",
    summary: "对比 Vite 和 Webpack 的优缺点，帮助你选择适合项目的构建工具。",
    author: "王五",
    author_id: 3,
    category: "构建工具",
    tags: &["Vite", "Webpack", "构建工具"],
    cover_image: "https://images.unsplash.com/photo-1555066931-4365d14bab8c?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    views: 945,
    likes: 72,
    comments: 32,
    created_at: "2024-01-13T09:15:00Z",
  },
  Seed {
    id: 4,
    title: "Pinia 状态管理最佳实践",
    content: "# Pinia 状态管理\n\n内容...",
    summary: "学习 Pinia 状态管理的核心概念和最佳实践，构建可维护的大型应用。",
    author: "张三",
    author_id: 1,
    category: "状态管理",
    tags: &["Pinia", "Vue3", "状态管理"],
    cover_image: "https://images.unsplash.com/photo-1551650975-87deedd944c3?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    views: 712,
    likes: 58,
    comments: 15,
    created_at: "2024-01-12T16:45:00Z",
  },
  Seed {
    id: 5,
    title: "Element Plus 组件库使用技巧",
    content: "# Element Plus\n\n内容...",
    summary: "掌握 Element Plus 组件库的高级用法和自定义技巧，提升开发效率。",
    author: "李四",
    author_id: 2,
    category: "UI框架",
    tags: &["Element Plus", "UI", "组件库"],
    cover_image: "https://images.unsplash.com/photo-1551650975-87deedd944c3?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    views: 623,
    likes: 45,
    comments: 12,
    created_at: "2024-01-11T11:20:00Z",
  },
];

fn article_from_seed(seed: &Seed) -> Article {
  let created_at = from_rfc3339_or_now(seed.created_at);
  Article {
    id: seed.id,
    title: seed.title.to_string(),
    content: seed.content.to_string(),
    summary: seed.summary.to_string(),
    author: seed.author.to_string(),
    author_id: seed.author_id,
    category: seed.category.to_string(),
    tags: seed.tags.iter().map(|s| s.to_string()).collect(),
    cover_image: Some(seed.cover_image.to_string()),
    views: seed.views,
    likes: seed.likes,
    comments: seed.comments,
    created_at,
    updated_at: created_at,
    is_published: true,
  }
}

lazy_static! {
  static ref SEED_ARTICLES: Vec<Article> = SEEDS.iter().map(article_from_seed).collect();
}

/// The fixed seed articles.
pub fn seed_articles() -> Vec<Article> {
  SEED_ARTICLES.clone()
}

/// In-process stand-in for the remote article API.  Writes are kept for
/// the lifetime of the source, so a reload sees them.
#[derive(Debug, Clone)]
pub struct MockSource {
  articles: RefCell<Vec<Article>>,
  latency: Latency,
}

impl MockSource {
  pub fn new(latency: Latency) -> Self {
    Self::with_articles(seed_articles(), latency)
  }

  pub fn with_articles(articles: Vec<Article>, latency: Latency) -> Self {
    Self {
      articles: RefCell::new(articles),
      latency,
    }
  }

  pub fn from_config(config: &AppConfig) -> Result<Self> {
    let latency = Latency::from_config(config)?;
    debug!("MockSource: latency={:?}", latency);
    Ok(Self::new(latency))
  }

  fn position(&self, id: i32) -> Result<usize> {
    self.articles.borrow().iter().position(|a| a.id == id)
      .ok_or(Error::NotFound(id))
  }

  fn insert(&self, article: Article) -> Result<()> {
    if self.position(article.id).is_ok() {
      return Err(Error::UnprocessableEntity(format!("duplicate article id: {}", article.id)));
    }
    debug!("MockSource: insert {}", article.id);
    self.articles.borrow_mut().push(article);
    Ok(())
  }

  fn save(&self, article: Article) -> Result<()> {
    let idx = self.position(article.id)?;
    self.articles.borrow_mut()[idx] = article;
    Ok(())
  }

  fn delete(&self, id: i32) -> Result<()> {
    let idx = self.position(id)?;
    debug!("MockSource: delete {}", id);
    self.articles.borrow_mut().remove(idx);
    Ok(())
  }
}

impl ArticleSource for MockSource {
  fn fetch_articles(&self) -> LocalBoxFuture<'_, Result<Vec<Article>>> {
    future::ready(Ok(self.articles.borrow().clone())).boxed_local()
  }

  fn insert_article(&self, article: Article) -> LocalBoxFuture<'_, Result<()>> {
    future::ready(self.insert(article)).boxed_local()
  }

  fn save_article(&self, article: Article) -> LocalBoxFuture<'_, Result<()>> {
    future::ready(self.save(article)).boxed_local()
  }

  fn delete_article(&self, id: i32) -> LocalBoxFuture<'_, Result<()>> {
    future::ready(self.delete(id)).boxed_local()
  }

  fn round_trip(&self, req: Request) -> LocalBoxFuture<'_, ()> {
    let delay = self.latency.for_request(req);
    async move {
      if delay > Duration::from_millis(0) {
        async_std::task::sleep(delay).await;
      }
    }.boxed_local()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_has_five_articles() {
    let articles = seed_articles();
    assert_eq!(articles.len(), 5);
    let ids: Vec<i32> = articles.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(articles[2].likes, 72);
    assert_eq!(articles[0].content, "# Vue3 组合式 API\n\n内容...");
    assert_eq!(articles[2].content, "# Vite vs Webpack\n\n内容...");
    for article in articles.iter() {
      assert_eq!(article.created_at, article.updated_at);
    }
  }

  #[test]
  fn latency_per_request() {
    let latency = Latency::default();
    assert_eq!(latency.for_request(Request::List), Duration::from_millis(500));
    assert_eq!(latency.for_request(Request::Get), Duration::from_millis(300));
    assert_eq!(latency.for_request(Request::Write), Duration::from_millis(500));
    assert!(millis(-1, "latency.list_ms").is_err());
  }

  #[async_std::test]
  async fn fetch_returns_copies() {
    let source = MockSource::new(Latency::none());
    let mut first = source.fetch_articles().await.expect("fetch");
    first[0].views = 0;
    let second = source.fetch_articles().await.expect("fetch");
    assert_eq!(second[0].views, 1234);
  }

  #[async_std::test]
  async fn writes_survive_fetch() {
    let source = MockSource::new(Latency::none());
    let mut article = source.fetch_articles().await.expect("fetch").remove(2);
    article.likes += 1;
    source.save_article(article.clone()).await.expect("save");

    article.id = 6;
    source.insert_article(article.clone()).await.expect("insert");
    assert!(source.insert_article(article).await.is_err());
    source.delete_article(1).await.expect("delete");
    assert!(matches!(source.delete_article(1).await, Err(Error::NotFound(1))));

    let articles = source.fetch_articles().await.expect("fetch");
    let ids: Vec<i32> = articles.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![2, 3, 4, 5, 6]);
    assert_eq!(articles[1].likes, 73);
  }
}
