use std::fmt::Display;
use std::str::FromStr;

use clap::ArgMatches;
use serde::Serialize;

use crate::error::*;
use crate::app::AppConfig;

pub mod list;
pub mod show;
pub mod taxonomy;

/// Parse an optional argument, reporting bad values as `BadRequest`.
fn parse_arg<T>(m: &ArgMatches, name: &str) -> Result<Option<T>>
where
  T: FromStr,
  T::Err: Display,
{
  match m.value_of(name) {
    Some(val) => val.parse::<T>()
      .map(Some)
      .map_err(|e| Error::BadRequest(format!("invalid {}: {}", name, e))),
    None => Ok(None),
  }
}

fn required_id(m: &ArgMatches) -> Result<i32> {
  parse_arg(m, "id")?
    .ok_or_else(|| Error::BadRequest("missing article id".to_string()))
}

fn print_json<T: Serialize>(config: &AppConfig, val: &T) -> Result<()> {
  let pretty = config.get_bool("output.pretty")?.unwrap_or(false);
  let out = if pretty {
    serde_json::to_string_pretty(val)?
  } else {
    serde_json::to_string(val)?
  };
  println!("{}", out);
  Ok(())
}
