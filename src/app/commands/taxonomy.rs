use async_std::task;

use crate::{
  error::*,
  app::*,
  store::ArticleStore,
};

use super::print_json;

fn load(config: &AppConfig) -> Result<ArticleStore> {
  let store = ArticleStore::from_config(config)?;
  task::block_on(store.list(None))?;
  Ok(store)
}

pub fn categories(config: AppConfig) -> Result<()> {
  let store = load(&config)?;
  print_json(&config, &store.categories())
}

pub fn tags(config: AppConfig) -> Result<()> {
  let store = load(&config)?;
  print_json(&config, &store.all_tags())
}
