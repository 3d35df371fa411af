use crate::counter::{Counter, Ordered};
use crate::ring::{Empty, Full, SpscRing};
use crate::sync::{Arc, Backoff};
use crate::trace::{self, Side};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned by a spin wait when its stop flag was raised before it could finish.
///
/// For `enqueue_spin`, it carries the element that was never enqueued.
///
/// 当停止标志在自旋等待完成之前被置位时返回。
/// 对于 `enqueue_spin`，它携带从未入队的元素。
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Cancelled<T>(pub T);

impl<T> Cancelled<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Cancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cancelled(..)")
    }
}

impl<T> fmt::Display for Cancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("spin wait cancelled")
    }
}

impl<T> std::error::Error for Cancelled<T> {}

// `Cell<()>` keeps the handles `!Sync` without affecting `Send`.
type NotSync = PhantomData<std::cell::Cell<()>>;

/// The producing end of an [`SpscRing`].
///
/// `Send` but neither `Clone` nor `Sync`: exactly one thread at a time can
/// enqueue, which is the whole of the producer-side contract.
///
/// [`SpscRing`] 的生产端。
///
/// 它是 `Send` 的，但既不是 `Clone` 也不是 `Sync`：同一时刻恰好只有一个线程可以入队，
/// 这就是生产端契约的全部内容。
pub struct Producer<T, C: Counter = Ordered> {
    ring: Arc<SpscRing<T, C>>,
    _not_sync: NotSync,
}

impl<T, C: Counter> Producer<T, C> {
    pub(crate) fn new(ring: Arc<SpscRing<T, C>>) -> Self {
        Self {
            ring,
            _not_sync: PhantomData,
        }
    }

    /// Move `value` into the ring, or hand it back in [`Full`].
    ///
    /// Never blocks. `Full` is backpressure: the consumer has not caught up yet.
    ///
    /// 将 `value` 移入环形缓冲区，或通过 [`Full`] 返还。
    /// 永不阻塞。`Full` 是背压信号：消费者还没有跟上。
    #[inline]
    pub fn try_enqueue(&mut self, value: T) -> Result<(), Full<T>> {
        // SAFETY: `&mut self` on the unique, `!Sync`, `!Clone` producer handle.
        unsafe { self.ring.enqueue_inner(value) }
    }

    /// Enqueue `value`, spinning while the ring is full.
    ///
    /// The `stop` flag is checked before every retry; once it reads `true`
    /// the element is handed back in [`Cancelled`]. Use this when the
    /// consumer may terminate and never drain the ring.
    ///
    /// 入队 `value`，在环满时自旋等待。
    ///
    /// 每次重试之前都会检查 `stop` 标志；一旦读到 `true`，元素会通过 [`Cancelled`] 返还。
    /// 当消费者可能终止且不再清空环时使用此方法。
    pub fn enqueue_spin(&mut self, value: T, stop: &AtomicBool) -> Result<(), Cancelled<T>> {
        let backoff = Backoff::new();
        let mut value = value;
        loop {
            match self.try_enqueue(value) {
                Ok(()) => return Ok(()),
                Err(Full(rejected)) => value = rejected,
            }
            if stop.load(Ordering::Relaxed) {
                trace::spin_cancelled(Side::Producer);
                return Err(Cancelled(value));
            }
            backoff.snooze();
        }
    }

    /// See [`SpscRing::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`SpscRing::len`].
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// See [`SpscRing::is_empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// See [`SpscRing::is_full`].
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<T, C: Counter> fmt::Debug for Producer<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(&self.ring).finish()
    }
}

/// The consuming end of an [`SpscRing`].
///
/// `Send` but neither `Clone` nor `Sync`: exactly one thread at a time can
/// dequeue.
///
/// [`SpscRing`] 的消费端。
/// 它是 `Send` 的，但既不是 `Clone` 也不是 `Sync`：同一时刻恰好只有一个线程可以出队。
pub struct Consumer<T, C: Counter = Ordered> {
    ring: Arc<SpscRing<T, C>>,
    _not_sync: NotSync,
}

impl<T, C: Counter> Consumer<T, C> {
    pub(crate) fn new(ring: Arc<SpscRing<T, C>>) -> Self {
        Self {
            ring,
            _not_sync: PhantomData,
        }
    }

    /// Move the oldest element out of the ring, or report [`Empty`].
    ///
    /// 将最早的元素移出环形缓冲区，或报告 [`Empty`]。
    #[inline]
    pub fn try_dequeue(&mut self) -> Result<T, Empty> {
        // SAFETY: `&mut self` on the unique, `!Sync`, `!Clone` consumer handle.
        unsafe { self.ring.dequeue_inner() }
    }

    /// Dequeue, spinning while the ring is empty, until `stop` reads `true`.
    ///
    /// 出队，在环为空时自旋等待，直到 `stop` 读到 `true`。
    pub fn dequeue_spin(&mut self, stop: &AtomicBool) -> Result<T, Cancelled<()>> {
        let backoff = Backoff::new();
        loop {
            if let Ok(value) = self.try_dequeue() {
                return Ok(value);
            }
            if stop.load(Ordering::Relaxed) {
                trace::spin_cancelled(Side::Consumer);
                return Err(Cancelled(()));
            }
            backoff.snooze();
        }
    }

    /// See [`SpscRing::capacity`].
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// See [`SpscRing::len`].
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// See [`SpscRing::is_empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// See [`SpscRing::is_full`].
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<T, C: Counter> fmt::Debug for Consumer<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Consumer").field(&self.ring).finish()
    }
}
