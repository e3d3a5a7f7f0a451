/* src/server/engine/rust/src/escape.rs */

/// Make JSON safe to embed in an inline `<script>` element.
///
/// Non-ASCII characters inside string values become `\uXXXX` (surrogate
/// pairs outside the BMP) and `<` becomes `\u003c`, so neither the page
/// encoding nor a `</script>` inside a page title can break the document.
pub fn script_safe_json(json: &str) -> String {
  let mut out = String::with_capacity(json.len());
  let mut in_string = false;
  let mut chars = json.chars();

  while let Some(ch) = chars.next() {
    if !in_string {
      if ch == '"' {
        in_string = true;
      }
      out.push(ch);
      continue;
    }
    match ch {
      '\\' => {
        out.push(ch);
        if let Some(next) = chars.next() {
          out.push(next);
        }
      }
      '"' => {
        in_string = false;
        out.push(ch);
      }
      '<' => out.push_str("\\u003c"),
      c if (c as u32) > 0x7F => {
        let code = c as u32;
        if code > 0xFFFF {
          let adjusted = code - 0x1_0000;
          let hi = (adjusted >> 10) + 0xD800;
          let lo = (adjusted & 0x3FF) + 0xDC00;
          out.push_str(&format!("\\u{hi:04x}\\u{lo:04x}"));
        } else {
          out.push_str(&format!("\\u{code:04x}"));
        }
      }
      c => out.push(c),
    }
  }
  out
}
