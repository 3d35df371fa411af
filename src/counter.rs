//! Visibility strategies for the ring's `head` / `tail` counters.
//!
//! Each counter has exactly one writer (the producer owns `tail`, the consumer
//! owns `head`) and exactly one remote reader. A strategy decides how the
//! owner publishes a new value and how the peer observes it.
//!
//! - [`Ordered`]: real atomics. The owner's `Release` store pairs with the
//!   peer's `Acquire` load, so a slot written before `tail` is published is
//!   visible to whoever observes that `tail`. This is the only sound strategy
//!   and the default.
//! - `Volatile` / `Plain` (feature `racy-counters`): the same counters without
//!   atomics. They are data races under the Rust memory model and exist only so
//!   benchmarks can measure what the ordering costs. `Plain` loads may be
//!   hoisted out of a spin loop by the optimizer, hanging it forever;
//!   `Volatile` forces a reload but still orders nothing across cores.
//!
//! 环形缓冲区 `head` / `tail` 计数器的可见性策略。
//!
//! 每个计数器恰好有一个写入者（生产者拥有 `tail`，消费者拥有 `head`）和一个远端读者。
//! 策略决定所有者如何发布新值以及对端如何观察它。
//!
//! - [`Ordered`]：真正的原子变量。所有者的 `Release` 写入与对端的 `Acquire` 读取配对，
//!   因此在发布 `tail` 之前写入的槽位对观察到该 `tail` 的一方可见。
//!   这是唯一健全的策略，也是默认策略。
//! - `Volatile` / `Plain`（特性 `racy-counters`）：不使用原子操作的同一计数器。
//!   它们在 Rust 内存模型下属于数据竞争，仅用于让基准测试衡量内存序的开销。

use crate::sync::{AtomicUsize, Ordering};

mod private {
    pub trait Sealed {}
}

/// A single-writer counter shared between the two ends of a ring.
///
/// # Safety
/// Implementations must make a value passed to [`publish`](Counter::publish)
/// eventually observable by [`load_shared`](Counter::load_shared) on another
/// thread. Only [`Ordered`] additionally guarantees the happens-before edge the
/// ring relies on for soundness; that is what [`Counter::SOUND`] reports.
///
/// 在环形缓冲区两端之间共享的单写入者计数器。
pub unsafe trait Counter: private::Sealed + Send + Sync + 'static {
    /// Human-readable strategy name, used in benchmarks and events.
    const NAME: &'static str;

    /// Whether the strategy orders slot accesses across threads.
    const SOUND: bool;

    fn new(value: usize) -> Self;

    /// Read by the owning side. Never races with a write.
    /// 由拥有方读取。永远不会与写入竞争。
    fn load_owned(&self) -> usize;

    /// Read by the peer side. Must observe the owner's latest publication eventually.
    /// 由对端读取。最终必须观察到所有者最新发布的值。
    fn load_shared(&self) -> usize;

    /// Publish a new value from the owning side.
    /// 由拥有方发布新值。
    fn publish(&self, value: usize);
}

/// Atomic counters with acquire loads and release stores.
///
/// 使用 acquire 读取和 release 写入的原子计数器。
#[derive(Debug)]
pub struct Ordered(AtomicUsize);

impl private::Sealed for Ordered {}

// SAFETY: Release publication paired with Acquire observation.
unsafe impl Counter for Ordered {
    const NAME: &'static str = "ordered";
    const SOUND: bool = true;

    #[inline]
    fn new(value: usize) -> Self {
        Ordered(AtomicUsize::new(value))
    }

    #[inline(always)]
    fn load_owned(&self) -> usize {
        // Only this side ever stores, so it always sees its own last value.
        self.0.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn load_shared(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn publish(&self, value: usize) {
        self.0.store(value, Ordering::Release);
    }
}

#[cfg(all(feature = "racy-counters", not(feature = "loom")))]
pub use racy::{Plain, Volatile};

#[cfg(all(feature = "racy-counters", not(feature = "loom")))]
mod racy {
    use super::{Counter, private};
    use std::cell::UnsafeCell;
    use std::ptr;

    /// Counters read and written with volatile accesses.
    ///
    /// **Unsound**: concurrent use is a data race. Benchmarking only.
    ///
    /// 使用 volatile 访问读写的计数器。
    ///
    /// **不健全**：并发使用属于数据竞争。仅用于基准测试。
    #[derive(Debug)]
    pub struct Volatile(UnsafeCell<usize>);

    // SAFETY: not actually sound; constructing a ring with this strategy is `unsafe`.
    unsafe impl Sync for Volatile {}

    impl private::Sealed for Volatile {}

    unsafe impl Counter for Volatile {
        const NAME: &'static str = "volatile";
        const SOUND: bool = false;

        fn new(value: usize) -> Self {
            Volatile(UnsafeCell::new(value))
        }

        #[inline(always)]
        fn load_owned(&self) -> usize {
            unsafe { ptr::read_volatile(self.0.get()) }
        }

        #[inline(always)]
        fn load_shared(&self) -> usize {
            unsafe { ptr::read_volatile(self.0.get()) }
        }

        #[inline(always)]
        fn publish(&self, value: usize) {
            unsafe { ptr::write_volatile(self.0.get(), value) }
        }
    }

    /// Counters read and written with ordinary memory accesses.
    ///
    /// **Unsound**: concurrent use is a data race, and a spin loop on
    /// `load_shared` may be compiled into a single load. Benchmarking only.
    ///
    /// 使用普通内存访问读写的计数器。
    ///
    /// **不健全**：并发使用属于数据竞争，并且对 `load_shared` 的自旋循环
    /// 可能被编译成一次读取。仅用于基准测试。
    #[derive(Debug)]
    pub struct Plain(UnsafeCell<usize>);

    // SAFETY: not actually sound; constructing a ring with this strategy is `unsafe`.
    unsafe impl Sync for Plain {}

    impl private::Sealed for Plain {}

    unsafe impl Counter for Plain {
        const NAME: &'static str = "plain";
        const SOUND: bool = false;

        fn new(value: usize) -> Self {
            Plain(UnsafeCell::new(value))
        }

        #[inline(always)]
        fn load_owned(&self) -> usize {
            unsafe { *self.0.get() }
        }

        #[inline(always)]
        fn load_shared(&self) -> usize {
            unsafe { *self.0.get() }
        }

        #[inline(always)]
        fn publish(&self, value: usize) {
            unsafe { *self.0.get() = value }
        }
    }
}
