use chrono::{DateTime, NaiveDateTime, Utc};

// chrono util functions.

pub fn now() -> NaiveDateTime {
  Utc::now().naive_utc()
}

pub fn from_rfc3339(ts: &str) -> Option<NaiveDateTime> {
  let ts = ts.trim();
  if ts.len() == 0 {
    return None;
  }
  match DateTime::parse_from_rfc3339(ts) {
    Ok(ts) => Some(ts.naive_utc()),
    Err(err) => {
      log::info!("Failed to parse rfc3339 timestamp: {:?}", err);
      None
    },
  }
}

pub fn from_rfc3339_or_now(ts: &str) -> NaiveDateTime {
  from_rfc3339(ts).unwrap_or_else(now)
}

/// Current time, never earlier than `floor`.
pub fn now_after(floor: NaiveDateTime) -> NaiveDateTime {
  let ts = now();
  if ts < floor { floor } else { ts }
}
