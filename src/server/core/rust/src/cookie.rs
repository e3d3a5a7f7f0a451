/* src/server/core/rust/src/cookie.rs */

// The only place progress touches the cookie jar: requests are read into a
// `ProgressRecord`, and the difference between two records becomes
// `Set-Cookie` header values.

use std::collections::BTreeSet;

use flu_engine::{
  CAPTURED_COOKIE, COMPLETION_FLAG_VALUE, COOKIE_MAX_AGE_SECS, ProgressRecord, Region,
  VISITED_COOKIE, cookie_pairs, write_set,
};
use time::OffsetDateTime;
use time::macros::format_description;

/// One `Set-Cookie` header, always scoped to path `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
  pub name: String,
  pub value: String,
  /// `None` expires the cookie immediately.
  pub max_age: Option<u64>,
}

impl SetCookie {
  pub fn persistent(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self { name: name.into(), value: value.into(), max_age: Some(COOKIE_MAX_AGE_SECS) }
  }

  pub fn expired(name: impl Into<String>) -> Self {
    Self { name: name.into(), value: String::new(), max_age: None }
  }

  /// Render the header value. `now` anchors the `Expires` attribute.
  pub fn header_value(&self, now: OffsetDateTime) -> String {
    match self.max_age {
      Some(secs) => {
        let expires = now + time::Duration::seconds(secs as i64);
        format!(
          "{}={}; Path=/; Max-Age={secs}; Expires={}",
          self.name,
          self.value,
          http_date(expires)
        )
      }
      None => format!(
        "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        self.name
      ),
    }
  }
}

fn http_date(at: OffsetDateTime) -> String {
  let format = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
  );
  at.to_offset(time::UtcOffset::UTC).format(format).unwrap_or_default()
}

/// Read the client's progress from a `Cookie:` header. Missing header means no progress.
pub fn read_record(cookie_header: Option<&str>) -> ProgressRecord {
  cookie_header.map(ProgressRecord::from_cookie_header).unwrap_or_default()
}

/// Cookies to send so the client's jar matches `after`.
pub fn progress_cookies(before: &ProgressRecord, after: &ProgressRecord) -> Vec<SetCookie> {
  let delta = after.delta_since(before);
  let mut out = Vec::new();
  if delta.visited {
    out.push(SetCookie::persistent(VISITED_COOKIE, write_set(&after.visited)));
  }
  if delta.captured {
    out.push(SetCookie::persistent(CAPTURED_COOKIE, write_set(&after.captured)));
  }
  for region in &delta.completed {
    out.push(SetCookie::persistent(region.completion_cookie(), COMPLETION_FLAG_VALUE));
  }
  out
}

/// Cookies that wipe all progress: both progress sets, every completion flag
/// the client holds or could hold, and the extra permission cookies.
pub fn reset_cookies<'a>(
  cookie_header: Option<&str>,
  known_regions: impl IntoIterator<Item = &'a Region>,
  extra: &[String],
) -> Vec<SetCookie> {
  let mut names: BTreeSet<String> =
    [VISITED_COOKIE.to_string(), CAPTURED_COOKIE.to_string()].into_iter().collect();
  if let Some(header) = cookie_header {
    for (name, _) in cookie_pairs(header) {
      if Region::from_completion_cookie(name).is_some() {
        names.insert(name.to_string());
      }
    }
  }
  names.extend(known_regions.into_iter().map(Region::completion_cookie));
  names.extend(extra.iter().filter(|n| !n.is_empty()).cloned());
  names.into_iter().map(SetCookie::expired).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use time::macros::datetime;

  fn now() -> OffsetDateTime {
    datetime!(2026-10-19 12:00:00 UTC)
  }

  #[test]
  fn persistent_cookie_lasts_a_year() {
    let header = SetCookie::persistent("arga_completado", "si").header_value(now());
    assert_eq!(
      header,
      "arga_completado=si; Path=/; Max-Age=31536000; Expires=Tue, 19 Oct 2027 12:00:00 GMT"
    );
  }

  #[test]
  fn expired_cookie_clears() {
    let header = SetCookie::expired("flu_visited_pages").header_value(now());
    assert!(header.starts_with("flu_visited_pages=; Path=/; Max-Age=0;"));
  }

  #[test]
  fn read_record_without_header_is_empty() {
    assert_eq!(read_record(None), ProgressRecord::default());
  }

  #[test]
  fn only_changed_cookies_are_written() {
    let before = read_record(Some("flu_visited_pages=[10]; flu_captured_pages=[10]"));
    let mut after = before.clone();
    assert!(progress_cookies(&before, &after).is_empty());

    after.mark_captured(11);
    let region = Region::parse("arga", "eu").unwrap();
    after.mark_completed(&region);
    let cookies = progress_cookies(&before, &after);
    assert_eq!(cookies, vec![
      SetCookie::persistent("flu_captured_pages", "%5B10%2C11%5D"),
      SetCookie::persistent("arga_eu_completado", "si"),
    ]);
  }

  #[test]
  fn reset_clears_every_family() {
    let known = [Region::parse("ultzama", "es").unwrap()];
    let cookies = reset_cookies(
      Some("arga_eu_completado=si; other=1; flu_captured_pages=[1]"),
      known.iter(),
      &["flu_camera_permission".to_string()],
    );
    let names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec![
      "arga_eu_completado",
      "flu_camera_permission",
      "flu_captured_pages",
      "flu_visited_pages",
      "ultzama_completado",
    ]);
    assert!(cookies.iter().all(|c| c.max_age.is_none()));
  }
}
