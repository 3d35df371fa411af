#[cfg(feature = "loom")]
pub use loom::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
#[cfg(not(feature = "loom"))]
pub use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

#[cfg(feature = "loom")]
pub use loom::sync::Arc;
#[cfg(not(feature = "loom"))]
pub use std::sync::Arc;

#[cfg(not(feature = "loom"))]
pub use antidote::Mutex;

#[cfg(not(feature = "loom"))]
pub use crossbeam_utils::Backoff;

/// Slot cell with the closure-based access API shared by std and loom.
///
/// loom 需要追踪每一次对槽位的访问，因此统一使用 `with` / `with_mut` 接口。
#[cfg(not(feature = "loom"))]
#[derive(Debug)]
pub struct UnsafeCell<T>(std::cell::UnsafeCell<T>);

#[cfg(not(feature = "loom"))]
impl<T> UnsafeCell<T> {
    #[inline]
    pub fn new(data: T) -> Self {
        Self(std::cell::UnsafeCell::new(data))
    }

    #[inline(always)]
    pub fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
        f(self.0.get())
    }

    #[inline(always)]
    pub fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.0.get())
    }
}

#[cfg(feature = "loom")]
pub use loom::cell::UnsafeCell;

/// Spin backoff that yields to the loom scheduler instead of the CPU.
#[cfg(feature = "loom")]
#[derive(Debug, Default)]
pub struct Backoff;

#[cfg(feature = "loom")]
impl Backoff {
    pub fn new() -> Self {
        Backoff
    }

    pub fn snooze(&self) {
        loom::thread::yield_now();
    }
}
