use crate::counter::{Counter, Ordered};
use crate::handle::{Consumer, Producer};
use crate::role::RoleCheck;
use crate::sync::{Arc, UnsafeCell};
use crate::trace::{self, Side};
use crossbeam_utils::CachePadded;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;

/// Default ring capacity, the pool size of a typical free-list / work-list pair.
/// 默认环形缓冲区容量，即典型空闲链表 / 工作链表对的池大小。
pub(crate) const DEFAULT_CAPACITY: usize = 16;

/// Returned by `enqueue` when the ring holds `capacity` elements.
///
/// Carries the rejected element back to the producer. This is backpressure,
/// not a fault: retry later.
///
/// 当环形缓冲区已有 `capacity` 个元素时由 `enqueue` 返回。
/// 携带被拒绝的元素返回给生产者。这是背压信号，而不是故障：稍后重试即可。
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Take back the element that could not be enqueued.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ring buffer is full")
    }
}

impl<T> std::error::Error for Full<T> {}

/// Returned by `dequeue` when the ring holds no elements.
/// 当环形缓冲区没有元素时由 `dequeue` 返回。
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Empty;

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ring buffer is empty")
    }
}

impl std::error::Error for Empty {}

type Slot<T> = UnsafeCell<MaybeUninit<T>>;

/// A bounded, lock-free single-producer single-consumer ring buffer.
///
/// Elements move from exactly one producer thread to exactly one consumer
/// thread in FIFO order. The producer owns `tail`, the consumer owns `head`;
/// since neither counter ever has two writers, no compare-and-swap is needed.
/// Both counters run modulo `2 * capacity`, so the distance from `head` to
/// `tail` tells a full ring (`capacity`) from an empty one (`0`) for any
/// capacity, power of two or not, and no counter ever overflows.
///
/// There are two ways to respect the single-producer / single-consumer rule:
/// - [`split`](SpscRing::split) the ring into a [`Producer`] and a [`Consumer`].
///   Each handle is `Send` but neither `Clone` nor `Sync`, so the compiler
///   enforces the rule.
/// - Share the ring itself and call the `unsafe` [`enqueue`](SpscRing::enqueue) /
///   [`dequeue`](SpscRing::dequeue) methods, upholding the rule yourself.
///   Debug builds record which thread owns each side and panic on a mismatch.
///
/// `C` selects how counters are published; see [`crate::counter`]. The default
/// [`Ordered`] strategy is the only sound one.
///
/// **Typical Usage**:
/// ```
/// use spsc_mark::SpscRing;
///
/// let (mut tx, mut rx) = SpscRing::new(4).split();
///
/// for v in ["A", "B", "C", "D"] {
///     tx.try_enqueue(v).unwrap();
/// }
/// assert!(tx.try_enqueue("E").is_err());
///
/// assert_eq!(rx.try_dequeue(), Ok("A"));
/// ```
///
/// 一个有界、无锁的单生产者单消费者环形缓冲区。
///
/// 元素以 FIFO 顺序从恰好一个生产者线程移动到恰好一个消费者线程。
/// 生产者拥有 `tail`，消费者拥有 `head`；由于任何计数器都不会有两个写入者，
/// 因此不需要 CAS。两个计数器都以 `2 * capacity` 为模运行，因此从 `head` 到 `tail` 的距离
/// 对任意容量（无论是否为 2 的幂）都能区分满环（`capacity`）与空环（`0`），且计数器永远不会溢出。
///
/// 有两种方式遵守单生产者 / 单消费者规则：
/// - 将环 [`split`](SpscRing::split) 为 [`Producer`] 和 [`Consumer`]。
///   每个句柄是 `Send` 的，但既不是 `Clone` 也不是 `Sync`，因此由编译器强制执行规则。
/// - 直接共享环本身并调用 `unsafe` 的 [`enqueue`](SpscRing::enqueue) / [`dequeue`](SpscRing::dequeue)，
///   由你自己遵守规则。调试构建会记录每一端属于哪个线程，并在不匹配时 panic。
pub struct SpscRing<T, C: Counter = Ordered> {
    /// Next slot to dequeue. Written by the consumer only.
    /// 下一个出队的槽位。仅由消费者写入。
    head: CachePadded<C>,
    /// Next slot to enqueue. Written by the producer only.
    /// 下一个入队的槽位。仅由生产者写入。
    tail: CachePadded<C>,
    slots: Box<[Slot<T>]>,
    /// Counter modulus, `2 * capacity`.
    wrap: usize,
    roles: RoleCheck,
}

// SAFETY: slots are partitioned by index ownership. The producer only touches
// the slot behind `tail` before publishing `tail`, the consumer only touches
// the slot behind `head` after observing it, so `T` only needs to be `Send`.
unsafe impl<T: Send, C: Counter> Send for SpscRing<T, C> {}
unsafe impl<T: Send, C: Counter> Sync for SpscRing<T, C> {}

impl<T> SpscRing<T, Ordered> {
    /// Create an empty ring with room for `capacity` elements.
    ///
    /// # Panics
    /// If `capacity` is zero.
    ///
    /// 创建一个可容纳 `capacity` 个元素的空环。
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Create a builder for configuring the ring.
    ///
    /// # Example
    /// ```
    /// use spsc_mark::SpscRing;
    ///
    /// let (tx, rx) = SpscRing::<Box<[u8; 256]>>::builder()
    ///     .capacity(64)
    ///     .build_split();
    /// assert_eq!(tx.capacity(), 64);
    /// ```
    ///
    /// 创建一个用于配置环形缓冲区的构建器。
    #[inline]
    pub fn builder() -> SpscRingBuilder<T> {
        SpscRingBuilder::new()
    }
}

impl<T, C: Counter> SpscRing<T, C> {
    /// Create a ring with an explicit counter strategy.
    ///
    /// # Safety
    /// If `C::SOUND` is `false` (the `Plain` / `Volatile` strategies), using the
    /// ring from two threads at once is a data race. Such rings may only be used
    /// where that is acceptable, i.e. benchmarks.
    ///
    /// 使用显式的计数器策略创建环形缓冲区。
    ///
    /// # Safety
    /// 如果 `C::SOUND` 为 `false`（`Plain` / `Volatile` 策略），从两个线程同时使用该环属于数据竞争。
    pub unsafe fn with_counters(capacity: usize) -> Self {
        Self::from_parts(capacity, cfg!(debug_assertions))
    }

    pub(crate) fn from_parts(capacity: usize, role_check: bool) -> Self {
        Self::starting_at(capacity, role_check, 0)
    }

    /// Build an empty ring whose counters both start at `start`.
    pub(crate) fn starting_at(capacity: usize, role_check: bool, start: usize) -> Self {
        assert!(capacity > 0, "SpscRing capacity must be non-zero");
        assert!(
            capacity <= usize::MAX / 2,
            "SpscRing capacity {capacity} is too large"
        );
        let wrap = capacity * 2;
        debug_assert!(start < wrap, "BUG: counter start {start} outside 0..{wrap}");

        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        trace::ring_created(capacity, C::NAME, C::SOUND);

        Self {
            head: CachePadded::new(C::new(start)),
            tail: CachePadded::new(C::new(start)),
            slots,
            wrap,
            roles: RoleCheck::new(role_check),
        }
    }

    /// Maximum number of elements the ring can hold.
    /// 环形缓冲区可容纳的最大元素数量。
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Name of the counter strategy (`"ordered"`, `"volatile"` or `"plain"`).
    #[inline]
    pub fn counters(&self) -> &'static str {
        C::NAME
    }

    /// Number of elements currently enqueued.
    ///
    /// A snapshot: the peer may change it before you act on it.
    ///
    /// 当前已入队的元素数量。
    /// 这是一个快照：对端可能在你使用它之前改变它。
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load_shared();
        let tail = self.tail.load_shared();
        // Head first; the clamp covers progress the producer made in between.
        self.distance(head, tail).min(self.capacity())
    }

    /// Snapshot: `len() == 0`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot: `len() == capacity()`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Whether the counters are published with a happens-before edge.
    /// See [`Counter::SOUND`].
    #[inline]
    pub fn is_sound(&self) -> bool {
        C::SOUND
    }

    #[inline(always)]
    fn slot(&self, counter: usize) -> &Slot<T> {
        let capacity = self.slots.len();
        let index = if counter >= capacity {
            counter - capacity
        } else {
            counter
        };
        &self.slots[index]
    }

    #[inline(always)]
    fn advance(&self, counter: usize) -> usize {
        let next = counter + 1;
        if next == self.wrap { 0 } else { next }
    }

    /// Elements between `head` and `tail`, both in `0..wrap`.
    #[inline(always)]
    fn distance(&self, head: usize, tail: usize) -> usize {
        if tail >= head {
            tail - head
        } else {
            self.wrap - head + tail
        }
    }

    /// Move `value` into the ring, or hand it back in [`Full`] if there is no room.
    ///
    /// # Safety
    /// Only one thread may ever call `enqueue` on a given ring, and never
    /// concurrently with a [`Producer`] obtained from it. Debug builds check
    /// the calling thread and panic on a mismatch; release builds do not check.
    ///
    /// 将 `value` 移入环形缓冲区；如果没有空间，则通过 [`Full`] 返还。
    ///
    /// # Safety
    /// 对于一个给定的环，只能有一个线程调用 `enqueue`。调试构建会检查调用线程并在不匹配时 panic；
    /// release 构建不做检查。
    #[inline]
    #[track_caller]
    pub unsafe fn enqueue(&self, value: T) -> Result<(), Full<T>> {
        self.roles.enter(Side::Producer);
        // SAFETY: forwarded to the caller.
        unsafe { self.enqueue_inner(value) }
    }

    /// Move the oldest element out of the ring, or report [`Empty`].
    ///
    /// # Safety
    /// Only one thread may ever call `dequeue` on a given ring, and never
    /// concurrently with a [`Consumer`] obtained from it. Debug builds check
    /// the calling thread and panic on a mismatch; release builds do not check.
    ///
    /// 将最早的元素移出环形缓冲区，或报告 [`Empty`]。
    ///
    /// # Safety
    /// 对于一个给定的环，只能有一个线程调用 `dequeue`。调试构建会检查调用线程并在不匹配时 panic；
    /// release 构建不做检查。
    #[inline]
    #[track_caller]
    pub unsafe fn dequeue(&self) -> Result<T, Empty> {
        self.roles.enter(Side::Consumer);
        // SAFETY: forwarded to the caller.
        unsafe { self.dequeue_inner() }
    }

    /// # Safety
    /// The caller is the only producer.
    #[inline]
    pub(crate) unsafe fn enqueue_inner(&self, value: T) -> Result<(), Full<T>> {
        let tail = self.tail.load_owned();
        let head = self.head.load_shared();

        let len = self.distance(head, tail);
        if len == self.capacity() {
            return Err(Full(value));
        }

        debug_assert!(len < self.capacity(), "BUG: tail - head exceeds capacity");

        // SAFETY: fewer than `capacity` elements are pending, so the consumer
        // has released this slot (observed via `load_shared` on head) and will
        // not read it until the advanced tail is published below.
        self.slot(tail).with_mut(|slot| unsafe {
            (*slot).write(value);
        });

        // Publishing the new tail is what hands the slot to the consumer.
        self.tail.publish(self.advance(tail));
        Ok(())
    }

    /// # Safety
    /// The caller is the only consumer.
    #[inline]
    pub(crate) unsafe fn dequeue_inner(&self) -> Result<T, Empty> {
        let head = self.head.load_owned();
        let tail = self.tail.load_shared();

        if tail == head {
            return Err(Empty);
        }

        // SAFETY: `head != tail`, so the producer published this slot
        // (observed via `load_shared` on tail) and will not overwrite it until
        // the advanced head is published below.
        let value = self
            .slot(head)
            .with(|slot| unsafe { (*slot).assume_init_read() });

        // Publishing the new head hands the slot back to the producer.
        self.head.publish(self.advance(head));
        Ok(value)
    }

    /// Split the ring into its two ends.
    ///
    /// 将环形缓冲区拆分为两端。
    pub fn split(self) -> (Producer<T, C>, Consumer<T, C>) {
        let ring = Arc::new(self);
        (Producer::new(Arc::clone(&ring)), Consumer::new(ring))
    }
}

impl<T, C: Counter> Drop for SpscRing<T, C> {
    /// Drop the elements that were enqueued but never dequeued.
    /// drop 已入队但从未出队的元素。
    fn drop(&mut self) {
        let mut head = self.head.load_owned();
        let tail = self.tail.load_owned();

        while head != tail {
            self.slot(head).with_mut(|slot| unsafe {
                // SAFETY: every slot in [head, tail) holds an initialized value,
                // and `&mut self` rules out any concurrent access.
                (*slot).assume_init_drop();
            });
            head = self.advance(head);
        }
    }
}

impl<T, C: Counter> fmt::Debug for SpscRing<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscRing")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("counters", &C::NAME)
            .field("sound", &C::SOUND)
            .finish()
    }
}

/// Builder for configuring an [`SpscRing`].
///
/// - `capacity`: number of slots (default `16`)
/// - `role_check`: in debug builds, record the thread that owns each side of
///   the shared `unsafe` API and panic when another thread calls it
///   (default `true`; ignored in release builds)
///
/// # Example
/// ```
/// use spsc_mark::SpscRing;
///
/// let ring = SpscRing::<u32>::builder()
///     .capacity(8)
///     .role_check(false)
///     .build();
/// assert_eq!(ring.capacity(), 8);
/// ```
///
/// 用于配置 [`SpscRing`] 的构建器。
pub struct SpscRingBuilder<T> {
    capacity: usize,
    role_check: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SpscRingBuilder<T> {
    /// Create a new builder with default settings.
    /// 创建一个带有默认设置的新构建器。
    #[inline]
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            role_check: true,
            _marker: PhantomData,
        }
    }

    /// Set the number of slots. Must be non-zero.
    ///
    /// Default: `16`
    ///
    /// 设置槽位数量。必须非零。
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enable or disable debug-build thread-identity checks on the shared `unsafe` API.
    ///
    /// Default: `true`
    ///
    /// 启用或禁用调试构建中共享 `unsafe` API 上的线程身份检查。
    #[inline]
    pub fn role_check(mut self, enabled: bool) -> Self {
        self.role_check = enabled;
        self
    }

    /// Build a ring with the default [`Ordered`] counters.
    ///
    /// # Panics
    /// If the configured capacity is zero.
    #[inline]
    pub fn build(self) -> SpscRing<T, Ordered> {
        SpscRing::from_parts(self.capacity, self.role_check)
    }

    /// Build a ring and split it into its two ends.
    #[inline]
    pub fn build_split(self) -> (Producer<T, Ordered>, Consumer<T, Ordered>) {
        self.build().split()
    }

    /// Build a ring with an explicit counter strategy.
    ///
    /// # Safety
    /// Same contract as [`SpscRing::with_counters`].
    #[inline]
    pub unsafe fn build_with<C: Counter>(self) -> SpscRing<T, C> {
        SpscRing::from_parts(self.capacity, self.role_check)
    }
}

impl<T> Default for SpscRingBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SpscRingBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscRingBuilder")
            .field("capacity", &self.capacity)
            .field("role_check", &self.role_check)
            .finish()
    }
}
