use log::*;

use std::convert::TryFrom;
use std::rc::Rc;
use std::cell::RefCell;

use crossbeam_channel::Receiver;

use crate::error::*;
use crate::app::*;
use crate::models::*;
use crate::forms::article::*;
use crate::db::*;
use crate::util;

mod query;
mod events;
pub use self::{
  query::*,
  events::*,
};

struct StoreState {
  articles: Vec<Article>,
  current_id: Option<i32>,
  total: usize,
  query: QueryState,
  next_id: i32,
  in_flight: usize,
  observers: Observers,
}

impl StoreState {
  fn new(page_size: u32) -> Self {
    Self {
      articles: Vec::new(),
      current_id: None,
      total: 0,
      query: QueryState::new(page_size),
      next_id: 1,
      in_flight: 0,
      observers: Observers::default(),
    }
  }

  fn position(&self, id: i32) -> Option<usize> {
    self.articles.iter().position(|a| a.id == id)
  }

  fn query_changed(&mut self, before: &QueryState) {
    if self.query != *before {
      self.observers.notify(StoreEvent::QueryChanged);
    }
  }

  /// Keep ids monotonic for the lifetime of the store, even across reloads
  /// and deletions.
  fn bump_next_id(&mut self) {
    if let Some(max) = self.articles.iter().map(|a| a.id).max() {
      if max >= self.next_id {
        self.next_id = max + 1;
      }
    }
  }
}

/// Marks the store as loading while alive.  Dropping it (also on early
/// return through `?`) ends the loading state.
struct LoadingGuard {
  state: Rc<RefCell<StoreState>>,
}

impl LoadingGuard {
  fn new(state: &Rc<RefCell<StoreState>>) -> Self {
    {
      let mut st = state.borrow_mut();
      st.in_flight += 1;
      if st.in_flight == 1 {
        debug!("store: idle -> loading");
        st.observers.notify(StoreEvent::LoadingChanged(true));
      }
    }
    Self {
      state: state.clone(),
    }
  }
}

impl Drop for LoadingGuard {
  fn drop(&mut self) {
    let mut st = self.state.borrow_mut();
    st.in_flight -= 1;
    if st.in_flight == 0 {
      debug!("store: loading -> idle");
      st.observers.notify(StoreEvent::LoadingChanged(false));
    }
  }
}

/// The article catalog: owns the loaded collection and the query state.
///
/// Single-threaded by construction (`Rc`).  State is never borrowed across
/// an await, so concurrent calls interleave only at the data source's
/// suspension points and the last one to resume wins.  Every accessor
/// returns copies.
#[derive(Clone)]
pub struct ArticleStore {
  source: Rc<dyn ArticleSource>,
  state: Rc<RefCell<StoreState>>,
}

impl ArticleStore {
  pub fn new<S: ArticleSource + 'static>(source: S) -> Self {
    Self::with_page_size(source, DEFAULT_PAGE_SIZE)
  }

  pub fn with_page_size<S: ArticleSource + 'static>(source: S, page_size: u32) -> Self {
    Self {
      source: Rc::new(source),
      state: Rc::new(RefCell::new(StoreState::new(page_size))),
    }
  }

  /// Build the store and its mock data source from AppConfig.
  pub fn from_config(config: &AppConfig) -> Result<Self> {
    let page_size = match config.get_int("catalog.page_size")? {
      Some(size) => match u32::try_from(size) {
        Ok(size) if size > 0 => size,
        _ => {
          return Err(Error::BadRequest(format!("catalog.page_size must be in 1..={}, got {}", u32::MAX, size)));
        },
      },
      None => DEFAULT_PAGE_SIZE,
    };
    let source = config.get_str("catalog.source")?.unwrap_or_else(|| "mock".to_string());
    if source != "mock" {
      return Err(Error::BadRequest(format!("unknown article source: {}", source)));
    }
    info!("ArticleStore: source={}, page_size={}", source, page_size);
    let source = MockSource::from_config(config)?;
    Ok(Self::with_page_size(source, page_size))
  }

  /// Register an observer for store changes.
  pub fn subscribe(&self) -> Receiver<StoreEvent> {
    self.state.borrow_mut().observers.subscribe()
  }

  fn notify(&self, event: StoreEvent) {
    self.state.borrow_mut().observers.notify(event);
  }

  /// Merge `params` into the query state, then reload the collection.
  pub async fn list(&self, params: Option<ArticleQuery>) -> Result<()> {
    let _loading = LoadingGuard::new(&self.state);

    if let Some(params) = params {
      let changed = self.state.borrow_mut().query.merge(&params);
      if changed {
        debug!("store: query -> {:?}", self.state.borrow().query);
        self.notify(StoreEvent::QueryChanged);
      }
    }

    self.source.round_trip(Request::List).await;
    let articles = self.source.fetch_articles().await?;

    let mut st = self.state.borrow_mut();
    st.total = articles.len();
    st.articles = articles;
    st.bump_next_id();
    info!("store: loaded {} articles", st.total);
    let total = st.total;
    st.observers.notify(StoreEvent::Loaded { total });
    Ok(())
  }

  /// Look up a loaded article.  A hit becomes the current article and has
  /// its view count bumped.
  pub async fn get_by_id(&self, id: i32) -> Option<Article> {
    let _loading = LoadingGuard::new(&self.state);
    self.source.round_trip(Request::Get).await;

    let mut st = self.state.borrow_mut();
    let idx = match st.position(id) {
      Some(idx) => idx,
      None => {
        debug!("store: get_by_id({}): not found", id);
        return None;
      },
    };
    let article = {
      let article = &mut st.articles[idx];
      article.views += 1;
      article.clone()
    };
    st.current_id = Some(id);
    st.observers.notify(StoreEvent::Viewed { id, views: article.views });
    drop(st);

    self.persist(article.clone()).await;
    Some(article)
  }

  /// Push a counter bump to the source.  Views and likes never fail, so a
  /// source error is only logged.
  async fn persist(&self, article: Article) {
    let id = article.id;
    if let Err(err) = self.source.save_article(article).await {
      warn!("store: failed to save article {}: {}", id, err);
    }
  }

  pub async fn create(&self, fields: CreateArticle) -> Result<Article> {
    validate_title(&fields.title)?;
    let _loading = LoadingGuard::new(&self.state);
    self.source.round_trip(Request::Write).await;

    let id = {
      let mut st = self.state.borrow_mut();
      let id = st.next_id;
      st.next_id += 1;
      id
    };
    let now = util::now();
    let article = Article {
      id,
      title: fields.title,
      content: fields.content,
      summary: fields.summary,
      author: fields.author,
      author_id: fields.author_id,
      category: fields.category,
      tags: fields.tags,
      cover_image: fields.cover_image,
      views: 0,
      likes: 0,
      comments: 0,
      created_at: now,
      updated_at: now,
      is_published: fields.is_published,
    };
    self.source.insert_article(article.clone()).await?;

    let mut st = self.state.borrow_mut();
    st.articles.push(article.clone());
    st.total += 1;
    info!("store: created article {}", id);
    st.observers.notify(StoreEvent::Created { id });
    Ok(article)
  }

  /// Merge `fields` into an existing article.  `id` and `created_at` never
  /// change; `updated_at` is stamped.
  pub async fn update(&self, id: i32, fields: UpdateArticle) -> Result<Article> {
    if let Some(title) = &fields.title {
      validate_title(title)?;
    }
    let _loading = LoadingGuard::new(&self.state);
    self.source.round_trip(Request::Write).await;

    let mut article = match self.find(id) {
      Some(article) => article,
      None => {
        warn!("store: update({}): not found", id);
        return Err(Error::NotFound(id));
      },
    };
    fields.apply_to(&mut article);
    article.updated_at = util::now_after(article.created_at);
    self.source.save_article(article.clone()).await?;

    let mut st = self.state.borrow_mut();
    if let Some(idx) = st.position(id) {
      st.articles[idx] = article.clone();
    }
    st.observers.notify(StoreEvent::Updated { id });
    Ok(article)
  }

  pub async fn delete(&self, id: i32) -> Result<()> {
    let _loading = LoadingGuard::new(&self.state);
    self.source.round_trip(Request::Write).await;

    if self.find(id).is_none() {
      warn!("store: delete({}): not found", id);
      return Err(Error::NotFound(id));
    }
    self.source.delete_article(id).await?;

    let mut st = self.state.borrow_mut();
    if let Some(idx) = st.position(id) {
      st.articles.remove(idx);
      st.total = st.total.saturating_sub(1);
    }
    info!("store: deleted article {}", id);
    st.observers.notify(StoreEvent::Deleted { id });
    if st.current_id == Some(id) {
      st.current_id = None;
      st.observers.notify(StoreEvent::FocusCleared);
    }
    Ok(())
  }

  /// Bump the like count.  Returns the new count, or 0 if there is no such
  /// article.
  pub async fn like(&self, id: i32) -> u64 {
    let article = {
      let mut st = self.state.borrow_mut();
      let article = match st.position(id) {
        Some(idx) => {
          let article = &mut st.articles[idx];
          article.likes += 1;
          article.clone()
        },
        None => return 0,
      };
      st.observers.notify(StoreEvent::Liked { id, likes: article.likes });
      article
    };
    let likes = article.likes;
    self.persist(article).await;
    likes
  }

  fn find(&self, id: i32) -> Option<Article> {
    self.state.borrow().articles.iter().find(|a| a.id == id).cloned()
  }

  pub fn reset_filters(&self) {
    self.change_query(QueryState::reset_filters);
  }

  fn change_query<F>(&self, f: F)
  where
    F: FnOnce(&mut QueryState),
  {
    let mut st = self.state.borrow_mut();
    let before = st.query.clone();
    f(&mut st.query);
    st.query_changed(&before);
  }

  fn try_change_query<F>(&self, f: F) -> Result<()>
  where
    F: FnOnce(&mut QueryState) -> Result<()>,
  {
    let mut st = self.state.borrow_mut();
    let before = st.query.clone();
    f(&mut st.query)?;
    st.query_changed(&before);
    Ok(())
  }

  pub fn set_search(&self, search: &str) {
    self.change_query(|q| q.search = search.to_string());
  }

  pub fn set_category(&self, category: &str) {
    self.change_query(|q| q.category = category.to_string());
  }

  pub fn set_tag(&self, tag: &str) {
    self.change_query(|q| q.tag = tag.to_string());
  }

  pub fn set_page(&self, page: u32) -> Result<()> {
    self.try_change_query(|q| q.set_page(page))
  }

  pub fn set_page_size(&self, limit: u32) -> Result<()> {
    self.try_change_query(|q| q.set_limit(limit))
  }

  pub fn articles(&self) -> Vec<Article> {
    self.state.borrow().articles.clone()
  }

  pub fn current_article(&self) -> Option<Article> {
    let st = self.state.borrow();
    let id = st.current_id?;
    st.articles.iter().find(|a| a.id == id).cloned()
  }

  pub fn total_articles(&self) -> usize {
    self.state.borrow().total
  }

  pub fn is_loading(&self) -> bool {
    self.state.borrow().in_flight > 0
  }

  pub fn query(&self) -> QueryState {
    self.state.borrow().query.clone()
  }

  pub fn filtered_articles(&self) -> Vec<Article> {
    let st = self.state.borrow();
    st.query.filter(&st.articles)
  }

  pub fn total_pages(&self) -> u32 {
    let st = self.state.borrow();
    total_pages(st.total, st.query.limit)
  }

  pub fn categories(&self) -> Vec<String> {
    categories(&self.state.borrow().articles)
  }

  pub fn all_tags(&self) -> Vec<String> {
    all_tags(&self.state.borrow().articles)
  }

  /// The current page of `filtered_articles`.
  pub fn page_articles(&self) -> ArticlePage {
    let st = self.state.borrow();
    st.query.paginate(st.query.filter(&st.articles))
  }
}

fn validate_title(title: &str) -> Result<()> {
  if title.trim().is_empty() {
    return Err(Error::UnprocessableEntity("title must not be blank".to_string()));
  }
  Ok(())
}
