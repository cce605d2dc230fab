//! Serialized access to a shared render engine.
use std::sync::{Mutex, PoisonError};

use crate::{
  error::Result,
  render::{RenderEngine, RenderFlags},
};

/// A [`RenderEngine`] that many threads may use, one render at a time.
///
/// The engine keeps scratch state between the start and the end of a
/// render, so concurrent calls on the same instance are queued on a mutex.
/// A lock poisoned by a panicking caller is recovered, since every render
/// starts by resetting that state.
#[derive(Debug)]
pub struct SharedRenderer {
  engine: Mutex<RenderEngine>,
}

impl SharedRenderer {
  #[must_use]
  pub const fn new(engine: RenderEngine) -> Self {
    Self {
      engine: Mutex::new(engine),
    }
  }

  /// Render `markdown`, waiting for any in-flight render to finish first.
  ///
  /// # Errors
  ///
  /// Returns the engine's error unchanged.
  pub fn render(&self, markdown: &str) -> Result<String> {
    let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
    engine.render(markdown)
  }

  #[must_use]
  pub fn flags(&self) -> RenderFlags {
    self
      .engine
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .flags()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use std::{sync::Arc, thread};

  use super::*;

  #[test]
  fn test_render_through_guard() {
    let shared = SharedRenderer::new(RenderEngine::new(RenderFlags::TABLES));
    assert_eq!(shared.flags(), RenderFlags::TABLES);
    assert!(shared.render("*x*").unwrap().contains("<em>x</em>"));
  }

  #[test]
  fn test_poisoned_lock_is_recovered() {
    let shared = Arc::new(SharedRenderer::new(RenderEngine::new(
      RenderFlags::empty(),
    )));

    let poisoner = Arc::clone(&shared);
    let result = thread::spawn(move || {
      let _guard = poisoner.engine.lock().unwrap();
      panic!("poison the lock");
    })
    .join();
    assert!(result.is_err());
    assert!(shared.engine.is_poisoned());

    assert!(shared.render("**ok**").unwrap().contains("<strong>ok</strong>"));
  }
}
