//! # modwatch-hooks
//!
//! Load-interception hook dispatch for modwatch. Provides:
//!
//! - Hook bookkeeping with registration-order dispatch and
//!   deregistration by predicate
//! - A notifier that fires hooks exactly once per successful load,
//!   isolating individual hook failures
//! - A pipeline interceptor that observes load requests for watched
//!   names without re-entering itself
//! - Completer chaining so previously installed loaders keep working
//! - A watcher facade with one-time idempotent pipeline installation
//!
//! Hooks registered before their unit loads fire at load time; hooks
//! registered after fire immediately with a warning. Both paths invoke a
//! hook exactly once per load.

pub mod completer;
pub mod hook;
pub mod interceptor;
pub mod notifier;
pub mod registry;
pub mod watcher;

pub use completer::{ChainedCompleter, PreloadedCompleter};
pub use hook::{DeferredHook, LoadHook};
pub use interceptor::LoadInterceptor;
pub use notifier::LoadNotifier;
pub use registry::HookRegistry;
pub use watcher::LoadWatcher;
