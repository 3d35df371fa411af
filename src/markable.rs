use crate::ordering::MemOrder;
use crate::sync::AtomicPtr;
use crate::verify::contract_assert;
use std::fmt;
use std::ptr;

/// Bit 0 of the word carries the mark.
/// 字的第 0 位存放标记。
pub const MARK_BIT: usize = 0b01;

/// Bit 1 is reserved and always zero.
/// 第 1 位保留，始终为零。
pub const RESERVED_BIT: usize = 0b10;

/// Mask that recovers the address from a packed word.
/// 从打包的字中取回地址的掩码。
pub const ADDRESS_MASK: usize = !(MARK_BIT | RESERVED_BIT);

/// Minimum alignment of any address stored in a [`MarkableRef`].
pub const MIN_ALIGN: usize = 4;

#[inline(always)]
fn pack<T>(address: *mut T, mark: bool) -> *mut T {
    address.map_addr(|addr| addr | mark as usize)
}

#[inline(always)]
fn unpack<T>(word: *mut T) -> (*mut T, bool) {
    (
        word.map_addr(|addr| addr & ADDRESS_MASK),
        word.addr() & MARK_BIT != 0,
    )
}

/// An aligned pointer and a boolean mark that are read and updated as one atomic word.
///
/// This is the systems-level counterpart of Java's `AtomicMarkableReference`:
/// the mark lives in the least-significant bit of the address, so a thread can
/// mark a node (for example "logically deleted") and check that its successor
/// has not changed in a single compare-and-swap. No reader can ever see an
/// address from one update paired with the mark from another.
///
/// `MarkableRef` owns no memory. The referenced `T` belongs to the caller and
/// is never dropped here.
///
/// **Alignment Contract**: every address passed in must be at least 4-byte
/// aligned (two low bits clear). Violations are programming errors and fail an
/// unconditional assertion.
///
/// **Typical Usage**:
/// ```
/// use spsc_mark::{MarkableRef, MemOrder};
///
/// let mut node = Box::new(7u64);
/// let p: *mut u64 = &mut *node;
///
/// let next = MarkableRef::new(p, false);
/// assert!(next.attempt_mark(p, true));
/// assert_eq!(next.get(), (p, true));
///
/// // Unmark it again, but only if nobody swung the pointer in between.
/// assert!(next.compare_and_swap_with(p, true, p, false, MemOrder::Acquire));
/// ```
///
/// 一个对齐指针和一个布尔标记，作为单个原子字被读取和更新。
///
/// 这是 Java `AtomicMarkableReference` 的系统级对应物：
/// 标记存放在地址的最低位，因此线程可以在一次 CAS 中标记一个节点（例如“逻辑删除”）
/// 并同时确认它的后继没有改变。没有读者会看到来自一次更新的地址与来自另一次更新的标记的组合。
///
/// `MarkableRef` 不拥有任何内存。被引用的 `T` 属于调用者，这里永远不会 drop 它。
///
/// **对齐契约**：传入的每个地址必须至少 4 字节对齐（低两位为零）。
/// 违反属于编程错误，会触发无条件断言失败。
pub struct MarkableRef<T> {
    word: AtomicPtr<T>,
}

impl<T> MarkableRef<T> {
    /// Create a reference holding `(address, mark)`.
    /// 创建一个持有 `(address, mark)` 的引用。
    #[inline]
    pub fn new(address: *mut T, mark: bool) -> Self {
        Self::assert_aligned(address);
        Self {
            word: AtomicPtr::new(pack(address, mark)),
        }
    }

    /// Create a reference holding `(null, false)`.
    /// 创建一个持有 `(null, false)` 的引用。
    #[inline]
    pub fn null() -> Self {
        Self {
            word: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Returns `true` if `address` can be stored, i.e. its two low bits are clear.
    /// 如果 `address` 可以被存储（即低两位为零），返回 `true`。
    #[inline]
    pub fn is_aligned(address: *const T) -> bool {
        address.addr() & !ADDRESS_MASK == 0
    }

    #[inline(always)]
    #[track_caller]
    fn assert_aligned(address: *mut T) {
        contract_assert!(
            Self::is_aligned(address),
            "MarkableRef address {:p} is not {}-byte aligned",
            address,
            MIN_ALIGN
        );
    }

    /// Sequentially consistent [`compare_and_swap_with`](Self::compare_and_swap_with).
    #[inline]
    #[track_caller]
    pub fn compare_and_swap(
        &self,
        expected: *mut T,
        expected_mark: bool,
        new: *mut T,
        new_mark: bool,
    ) -> bool {
        self.compare_and_swap_with(expected, expected_mark, new, new_mark, MemOrder::SeqCst)
    }

    /// Atomically replace `(expected, expected_mark)` with `(new, new_mark)`.
    ///
    /// Succeeds only if both the address *and* the mark currently match.
    /// Returns whether the replacement happened; on failure the word is untouched.
    ///
    /// # Panics
    /// If `expected` or `new` is not 4-byte aligned.
    ///
    /// 原子地将 `(expected, expected_mark)` 替换为 `(new, new_mark)`。
    ///
    /// 只有当地址*和*标记都匹配时才会成功。
    /// 返回是否发生了替换；失败时字保持不变。
    #[inline]
    #[track_caller]
    pub fn compare_and_swap_with(
        &self,
        expected: *mut T,
        expected_mark: bool,
        new: *mut T,
        new_mark: bool,
        order: MemOrder,
    ) -> bool {
        Self::assert_aligned(expected);
        Self::assert_aligned(new);

        let current = pack(expected, expected_mark);
        let replacement = pack(new, new_mark);

        self.word
            .compare_exchange(current, replacement, order.rmw(), order.failure())
            .is_ok()
    }

    /// Sequentially consistent [`attempt_mark_with`](Self::attempt_mark_with).
    #[inline]
    #[track_caller]
    pub fn attempt_mark(&self, expected: *mut T, new_mark: bool) -> bool {
        self.attempt_mark_with(expected, new_mark, MemOrder::SeqCst)
    }

    /// Set the mark to `new_mark` if the address is still `expected`.
    ///
    /// The current word is read once; if its address differs from `expected`
    /// this returns `false` immediately. Otherwise a single CAS swaps the
    /// observed word for `(expected, new_mark)`. There is no retry: if another
    /// thread changes the word between the read and the CAS, the attempt fails
    /// and the word keeps whatever that thread wrote. Callers that need the
    /// mark to stick must loop.
    ///
    /// # Panics
    /// If `expected` is not 4-byte aligned.
    ///
    /// 如果地址仍然是 `expected`，将标记设置为 `new_mark`。
    ///
    /// 当前字只读取一次；如果其地址与 `expected` 不同，立即返回 `false`。
    /// 否则执行一次 CAS，把观察到的字换成 `(expected, new_mark)`。
    /// 不会重试：如果另一个线程在读取和 CAS 之间修改了字，尝试失败，
    /// 字保留那个线程写入的值。需要标记必定生效的调用者必须自行循环。
    #[inline]
    #[track_caller]
    pub fn attempt_mark_with(&self, expected: *mut T, new_mark: bool, order: MemOrder) -> bool {
        Self::assert_aligned(expected);

        let observed = self.word.load(order.load());
        if unpack(observed).0 != expected {
            return false;
        }

        self.word
            .compare_exchange(
                observed,
                pack(expected, new_mark),
                order.rmw(),
                order.failure(),
            )
            .is_ok()
    }

    /// Sequentially consistent [`set_with`](Self::set_with).
    #[inline]
    #[track_caller]
    pub fn set(&self, address: *mut T, mark: bool) {
        self.set_with(address, mark, MemOrder::SeqCst)
    }

    /// Unconditionally store `(address, mark)`.
    ///
    /// # Panics
    /// If `address` is not 4-byte aligned.
    ///
    /// 无条件地存储 `(address, mark)`。
    #[inline]
    #[track_caller]
    pub fn set_with(&self, address: *mut T, mark: bool, order: MemOrder) {
        Self::assert_aligned(address);
        self.word.store(pack(address, mark), order.store());
    }

    /// Sequentially consistent [`get_with`](Self::get_with).
    #[inline]
    pub fn get(&self) -> (*mut T, bool) {
        self.get_with(MemOrder::SeqCst)
    }

    /// Atomically read the address and the mark together.
    /// 原子地同时读取地址和标记。
    #[inline]
    pub fn get_with(&self, order: MemOrder) -> (*mut T, bool) {
        unpack(self.word.load(order.load()))
    }

    /// Sequentially consistent [`get_pointer_with`](Self::get_pointer_with).
    #[inline]
    pub fn get_pointer(&self) -> *mut T {
        self.get_pointer_with(MemOrder::SeqCst)
    }

    /// The address half of [`get_with`](Self::get_with).
    #[inline]
    pub fn get_pointer_with(&self, order: MemOrder) -> *mut T {
        self.get_with(order).0
    }

    /// Sequentially consistent [`get_mark_with`](Self::get_mark_with).
    #[inline]
    pub fn get_mark(&self) -> bool {
        self.get_mark_with(MemOrder::SeqCst)
    }

    /// The mark half of [`get_with`](Self::get_with).
    #[inline]
    pub fn get_mark_with(&self, order: MemOrder) -> bool {
        self.get_with(order).1
    }

    /// Consume the reference and return its final `(address, mark)`.
    /// 消费该引用并返回其最终的 `(address, mark)`。
    #[inline]
    pub fn into_inner(self) -> (*mut T, bool) {
        // No other thread can hold `&self` once we own `self`.
        unpack(self.word.load(crate::sync::Ordering::Relaxed))
    }
}

impl<T> Default for MarkableRef<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for MarkableRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (address, mark) = self.get_with(MemOrder::Relaxed);
        f.debug_struct("MarkableRef")
            .field("address", &address)
            .field("mark", &mark)
            .finish()
    }
}
