//! Tools that we could imagine being in the Rust standard library, but aren't.

pub mod log;

/// Trait alias for [`Sync`] when the `auto-threads` feature is enabled, and no bound
/// otherwise.
///
/// Scenes and cameras must be shared between threads to be classified in parallel,
/// but single-threaded builds should not have to require that.
#[cfg(feature = "auto-threads")]
pub trait SyncIfThreaded: Sync {}
#[cfg(feature = "auto-threads")]
impl<T: ?Sized + Sync> SyncIfThreaded for T {}

/// Trait alias for [`Sync`] when the `auto-threads` feature is enabled, and no bound
/// otherwise.
///
/// Scenes and cameras must be shared between threads to be classified in parallel,
/// but single-threaded builds should not have to require that.
#[cfg(not(feature = "auto-threads"))]
pub trait SyncIfThreaded {}
#[cfg(not(feature = "auto-threads"))]
impl<T: ?Sized> SyncIfThreaded for T {}

#[doc(hidden)] // for use in internal tests only
pub fn assert_conditional_sync<T: ?Sized + SyncIfThreaded>() {
    // We don't need to do anything in this function; the call to it having been successfully
    // compiled is the assertion.
}
