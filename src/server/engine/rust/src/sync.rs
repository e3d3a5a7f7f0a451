/* src/server/engine/rust/src/sync.rs */

// Reflect progress in rendered markup: list items carrying `data-page-id`
// inside a progress container get `visited` / `captured` classes, and links
// inside captured items jump straight to the capture anchor.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::progress::ProgressRecord;
use crate::region::PageId;

pub const DEFAULT_PROGRESS_MARKER: &str = "flu-progress";
pub const VISITED_CLASS: &str = "visited";
pub const CAPTURED_CLASS: &str = "captured";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
  /// Class token identifying a progress container.
  pub marker: String,
  /// Fragment (without `#`) appended to links of captured items.
  pub anchor: String,
  /// Absolute site origin; links starting with it count as same-origin.
  pub site_url: Option<String>,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      marker: DEFAULT_PROGRESS_MARKER.to_string(),
      anchor: crate::capture::DEFAULT_CAPTURE_ANCHOR.to_string(),
      site_url: None,
    }
  }
}

fn container_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"<([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?\bclass\s*=\s*"([^"]*)"[^>]*>"#).unwrap()
  })
}

fn item_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"<li\b([^>]*)>").unwrap())
}

fn page_id_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"\bdata-page-id\s*=\s*["']?(\d+)"#).unwrap())
}

fn class_attr_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"\bclass\s*=\s*"([^"]*)""#).unwrap())
}

fn href_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"\bhref\s*=\s*"([^"]*)""#).unwrap())
}

/// Decorate every progress container in `html`. Safe to run repeatedly.
pub fn decorate(html: &str, record: &ProgressRecord, opts: &SyncOptions) -> String {
  let mut out = String::with_capacity(html.len() + 64);
  let mut cursor = 0;

  for caps in container_re().captures_iter(html) {
    let (Some(open), Some(tag), Some(class)) = (caps.get(0), caps.get(1), caps.get(2)) else {
      continue;
    };
    if open.start() < cursor || !class.as_str().split_whitespace().any(|c| c == opts.marker) {
      continue;
    }
    let close = format!("</{}>", tag.as_str());
    let body_end = html[open.end()..].find(&close).map_or(html.len(), |i| open.end() + i);

    out.push_str(&html[cursor..open.end()]);
    out.push_str(&decorate_items(&html[open.end()..body_end], record, opts));
    cursor = body_end;
  }
  out.push_str(&html[cursor..]);
  out
}

fn decorate_items(body: &str, record: &ProgressRecord, opts: &SyncOptions) -> String {
  let mut out = String::with_capacity(body.len() + 32);
  let mut cursor = 0;

  for caps in item_re().captures_iter(body) {
    let (Some(open), Some(attrs)) = (caps.get(0), caps.get(1)) else {
      continue;
    };
    if open.start() < cursor {
      continue;
    }
    let item_end = body[open.end()..].find("</li>").map_or(body.len(), |i| open.end() + i);
    out.push_str(&body[cursor..open.start()]);

    let Some(page_id) = page_id_re()
      .captures(attrs.as_str())
      .and_then(|c| c.get(1))
      .and_then(|m| m.as_str().parse::<PageId>().ok())
    else {
      out.push_str(&body[open.start()..item_end]);
      cursor = item_end;
      continue;
    };

    let visited = record.visited.contains(&page_id);
    let captured = record.captured.contains(&page_id);
    let mut classes = Vec::new();
    if visited {
      classes.push(VISITED_CLASS);
    }
    if captured {
      classes.push(CAPTURED_CLASS);
    }

    out.push_str("<li");
    out.push_str(&add_classes(attrs.as_str(), &classes));
    out.push('>');
    let inner = &body[open.end()..item_end];
    if captured {
      out.push_str(&rewrite_links(inner, opts));
    } else {
      out.push_str(inner);
    }
    cursor = item_end;
  }
  out.push_str(&body[cursor..]);
  out
}

fn add_classes(attrs: &str, classes: &[&str]) -> String {
  if classes.is_empty() {
    return attrs.to_string();
  }
  if let Some(existing) = class_attr_re().captures(attrs).and_then(|c| c.get(1)) {
    let mut tokens: Vec<&str> = existing.as_str().split_whitespace().collect();
    for class in classes {
      if !tokens.contains(class) {
        tokens.push(class);
      }
    }
    let replaced = format!(r#"class="{}""#, tokens.join(" "));
    class_attr_re().replace(attrs, replaced.as_str()).into_owned()
  } else {
    format!(r#"{attrs} class="{}""#, classes.join(" "))
  }
}

fn rewrite_links(inner: &str, opts: &SyncOptions) -> String {
  href_re()
    .replace_all(inner, |caps: &Captures| {
      let url = &caps[1];
      if is_same_origin(url, opts.site_url.as_deref()) {
        let base = url.split('#').next().unwrap_or(url);
        format!(r#"href="{base}#{}""#, opts.anchor)
      } else {
        caps[0].to_string()
      }
    })
    .into_owned()
}

fn is_same_origin(url: &str, site_url: Option<&str>) -> bool {
  if url.is_empty() || url.starts_with('#') || url.starts_with("//") {
    return false;
  }
  if let Some(site) = site_url.map(|s| s.trim_end_matches('/')).filter(|s| !s.is_empty())
    && let Some(rest) = url.strip_prefix(site)
  {
    return rest.is_empty() || rest.starts_with(['/', '?', '#']);
  }
  // Anything with a scheme (`https:`, `mailto:`, `javascript:`) is foreign.
  match url.find(':') {
    Some(colon) => url.find('/').is_some_and(|slash| slash < colon),
    None => true,
  }
}
