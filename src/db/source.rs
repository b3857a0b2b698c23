use futures::future::LocalBoxFuture;

use crate::error::*;
use crate::models::*;

/// Kind of remote request, used to pick the simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
  List,
  Get,
  Write,
}

/// Data-access interface behind the article store.
///
/// The store only suspends inside these calls, so swapping the mock for a
/// real backend (or for a zero-latency source in tests) leaves the
/// filtering and pagination logic untouched.
pub trait ArticleSource {
  /// Fetch the full backing collection.
  fn fetch_articles(&self) -> LocalBoxFuture<'_, Result<Vec<Article>>>;

  /// Store a new article.  Its id is already assigned.
  fn insert_article(&self, article: Article) -> LocalBoxFuture<'_, Result<()>>;

  /// Replace the stored article with the same id.
  fn save_article(&self, article: Article) -> LocalBoxFuture<'_, Result<()>>;

  fn delete_article(&self, id: i32) -> LocalBoxFuture<'_, Result<()>>;

  /// Wait out one request round trip.
  fn round_trip(&self, req: Request) -> LocalBoxFuture<'_, ()>;
}
