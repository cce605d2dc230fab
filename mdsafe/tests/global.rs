#![allow(clippy::expect_used, reason = "Fine in tests")]
use mdsafe::{Capabilities, Markdown};

// Kept as the only test in this binary: the global service is set once per
// process.
#[test]
fn test_installed_service_backs_free_functions() {
  let service = Markdown::with_capabilities(
    Capabilities::builder().tables(true).build(),
    Some("http://server.example".to_string()),
  );
  assert!(mdsafe::install(service).is_ok());
  assert!(mdsafe::install(Markdown::default()).is_err());

  let html = mdsafe::render("| a |\n| --- |\n| 1 |", None)
    .expect("render should succeed");
  assert!(html.contains("<table>"));

  assert_eq!(
    mdsafe::convert_back(r#"<a href="x">y</a>"#, None, None)
      .expect("convert back should succeed"),
    "[y](http://server.example/x)"
  );
  assert_eq!(
    mdsafe::sanitize("| a |\n| --- |\n| 1 |", None)
      .expect("sanitize should succeed"),
    "| a |\n| --- |\n| 1 |"
  );
}
