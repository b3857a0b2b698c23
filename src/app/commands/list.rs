use log::*;

use async_std::task;
use clap::ArgMatches;

use crate::{
  error::*,
  app::*,
  forms::article::*,
  store::ArticleStore,
};

use super::{parse_arg, print_json};

pub fn query_from_args(m: &ArgMatches) -> Result<ArticleQuery> {
  Ok(ArticleQuery {
    search: m.value_of("search").map(String::from),
    category: m.value_of("category").map(String::from),
    tag: m.value_of("tag").map(String::from),
    author_id: parse_arg(m, "author")?,
    page: parse_arg(m, "page")?,
    limit: parse_arg(m, "limit")?,
    sort_by: parse_arg(m, "sort")?,
    order: parse_arg(m, "order")?,
  })
}

pub fn execute(config: AppConfig, m: &ArgMatches) -> Result<()> {
  let query = query_from_args(m)?;
  run(config, query)
}

pub fn run(config: AppConfig, query: ArticleQuery) -> Result<()> {
  let store = ArticleStore::from_config(&config)?;
  task::block_on(store.list(Some(query)))?;

  let page = store.page_articles();
  info!("list: page {}/{}, {} of {} articles match",
    page.page, page.total_pages, page.filtered_count, store.total_articles());
  print_json(&config, &page)
}
