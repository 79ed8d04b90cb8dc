pub mod collector;
pub mod injector;
pub mod rewriter;

pub use collector::{classify, Action};
pub use injector::{inject_all, RewriteLimits};
pub use rewriter::{MarkerRewriter, Rewrite, CSS_MARKER, JS_MARKER};
