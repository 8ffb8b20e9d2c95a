//! Builds a static HTML wall of GitHub Actions workflow badges for the repositories of an organization.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`config::ConfigStore`] loads the grouped repository list and the credential.
//! 2. [`client::RemoteWorkflowClient`] fetches the workflows of each repository from a [`workflow::WorkflowProvider`].
//! 3. [`aggregate::BadgeAggregator`] filters and groups them into a [`aggregate::GroupedBadgeWall`].
//! 4. [`render::WallRenderer`] turns the wall into a document, and [`render::write`] stores it.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod env;
pub mod error;
pub mod render;
pub mod state;
pub mod workflow;

pub use error::{WallError, WallResult};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use badge_wall::static_lazy_lock;
/// use std::sync::LazyLock;
///
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: LazyLock<String> = LazyLock::new(|| String::from("a static variable"));
///
/// assert_eq!(*VAR_1, *VAR_2);
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
