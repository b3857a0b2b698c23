use log::*;

use async_std::task;
use clap::ArgMatches;

use crate::{
  error::*,
  app::*,
  forms::article::*,
  store::ArticleStore,
};

use super::{required_id, print_json};

/// Show one article.  Counts as a view.
pub fn execute(config: AppConfig, m: &ArgMatches) -> Result<()> {
  let id = required_id(m)?;
  let store = ArticleStore::from_config(&config)?;
  let article = task::block_on(async {
    store.list(None).await?;
    Ok::<_, Error>(store.get_by_id(id).await)
  })?;

  match article {
    Some(article) => print_json(&config, &ArticleOut { article }),
    None => Err(Error::NotFound(id)),
  }
}

pub fn like(config: AppConfig, m: &ArgMatches) -> Result<()> {
  let id = required_id(m)?;
  let store = ArticleStore::from_config(&config)?;
  let likes = task::block_on(async {
    store.list(None).await?;
    Ok::<_, Error>(store.like(id).await)
  })?;
  if likes == 0 {
    return Err(Error::NotFound(id));
  }
  debug!("like: article {} now has {} likes", id, likes);
  println!("{}", likes);
  Ok(())
}
