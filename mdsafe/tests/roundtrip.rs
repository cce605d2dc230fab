#![allow(clippy::expect_used, reason = "Fine in tests")]
use mdsafe::{BaseUri, Capabilities, Markdown};

fn round_trip(markdown: &Markdown, text: &str, config: Option<&Capabilities>) -> String {
  let html = markdown.render(text, config).expect("render should succeed");
  markdown
    .convert_back(&html, None, config)
    .expect("convert back should succeed")
}

#[test]
fn test_plain_text_survives_round_trip() {
  let markdown = Markdown::default();
  let text = "Hello world. This is plain text.\n\nSecond paragraph.";
  assert_eq!(round_trip(&markdown, text, None), text);
}

#[test]
fn test_common_markdown_survives_round_trip() {
  let markdown = Markdown::default();
  let text = "# Title\n\nSome **bold** and *em* text with `code`.\n\n- one\n- \
              two\n\n> quoted";
  assert_eq!(round_trip(&markdown, text, None), text);
}

#[test]
fn test_sanitize_is_idempotent() {
  let markdown = Markdown::default();
  let text = "Hello <b>world</b>\n\n<script>alert(1)</script>";

  let once = markdown.sanitize(text, None).expect("sanitize should succeed");
  let twice = markdown.sanitize(&once, None).expect("sanitize should succeed");

  assert_eq!(once, "Hello **world**\n\n\\<script\\>alert(1)\\</script\\>");
  assert_eq!(once, twice);
}

#[test]
fn test_sanitize_removes_html() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().remove_html(true).build();
  let clean = markdown
    .sanitize(r#"<em>hi</em> <img src="x" onerror="alert(1)">"#, Some(&config))
    .expect("sanitize should succeed");
  assert_eq!(clean, "hi");
}

#[test]
fn test_sanitize_drops_event_handlers_of_kept_html() {
  let markdown = Markdown::default();
  let clean = markdown
    .sanitize(r#"Say <span onmouseover="steal()">hi</span>"#, None)
    .expect("sanitize should succeed");
  assert_eq!(clean, "Say <span>hi</span>");
}

#[test]
fn test_sanitize_drops_script_urls_in_foreign_content() {
  let markdown = Markdown::default();
  let inputs = [
    r#"<svg><a><animate attributeName="href" values="javascript:alert(1)"></animate><text>click</text></a></svg>"#,
    r#"<math><maction actiontype="statusline" xlink:href="javascript:alert(1)">m</maction></math>"#,
    r#"Go <a href="jav&#x09;ascript:alert(1)">there</a>"#,
  ];

  for input in inputs {
    let clean = markdown
      .sanitize(input, None)
      .expect("sanitize should succeed");
    assert!(!clean.contains("javascript:"), "{input} -> {clean}");

    let html = markdown.render(&clean, None).expect("render should succeed");
    assert!(!html.contains("javascript:"), "{input} -> {html}");
  }
}

#[test]
fn test_tables_round_trip_with_all() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().all(true).build();
  let text = "| Name |\n| --- |\n| Ada |";
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}

#[test]
fn test_remove_tables() {
  let markdown = Markdown::default();
  let html = "<p>Before</p><table><thead><tr><th>Name</th></tr></thead><tbody><tr><td>Ada</td></tr></tbody></table>";

  let remove = Capabilities::builder().remove_tables(true).build();
  assert_eq!(
    markdown
      .convert_back(html, None, Some(&remove))
      .expect("convert back should succeed"),
    "Before"
  );

  let keep = Capabilities::builder()
    .remove_tables(true)
    .all(true)
    .build();
  assert_eq!(
    markdown
      .convert_back(html, None, Some(&keep))
      .expect("convert back should succeed"),
    "Before\n\n| Name |\n| --- |\n| Ada |"
  );
}

#[test]
fn test_base_uri_resolution() {
  let markdown = Markdown::default();
  let html = r#"<a href="x">y</a>"#;

  let docs = Capabilities::builder()
    .base_uri(BaseUri::Uri("http://example.com/docs".to_string()))
    .build();
  assert_eq!(
    markdown
      .convert_back(html, None, Some(&docs))
      .expect("convert back should succeed"),
    "[y](http://example.com/docs/x)"
  );

  let disabled = Capabilities::builder().base_uri(BaseUri::Disabled).build();
  assert_eq!(
    markdown
      .convert_back(html, None, Some(&disabled))
      .expect("convert back should succeed"),
    "[y](x)"
  );
}

#[test]
fn test_fenced_code_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().fenced_code_blocks(true).build();
  let text = "~~~rust\nfn main() {}\n~~~";
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}

#[test]
fn test_definition_list_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().definition_lists(true).build();
  let text = "Term\n\n: Meaning";
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}

#[test]
fn test_abbreviation_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().abbreviations(true).build();
  let text = "The HTML page\n\n*[HTML]: HyperText";

  let html = markdown
    .render(text, Some(&config))
    .expect("render should succeed");
  assert!(html.contains(r#"<abbr title="HyperText">HTML</abbr>"#));
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}

#[test]
fn test_smart_typography_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().smart(true).build();
  let text = "\"Hi\" -- there...";

  let html = markdown
    .render(text, Some(&config))
    .expect("render should succeed");
  assert!(html.contains('\u{201c}'));
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}

#[test]
fn test_auto_links_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().auto_links(true).build();
  assert_eq!(
    round_trip(&markdown, "Visit https://example.com today", Some(&config)),
    "Visit <https://example.com> today"
  );
}

#[test]
fn test_hardwraps_round_trip() {
  let markdown = Markdown::default();
  let config = Capabilities::builder().hardwraps(true).build();
  let text = "first\nsecond";
  assert_eq!(round_trip(&markdown, text, Some(&config)), text);
}
