use crate::sync::Ordering;

/// Memory-ordering strength for [`MarkableRef`](crate::MarkableRef) operations.
///
/// Every operation is implemented once against a `MemOrder`; the default forms
/// (`get`, `set`, `compare_and_swap`, ...) call through with [`MemOrder::SeqCst`].
/// Pick the weakest strength that still gives your algorithm the happens-before
/// edges it needs.
///
/// Orderings that have no meaning for one half of an access are weakened the
/// same way `crossbeam` picks a failure ordering: a `Release` load and an
/// `Acquire` store are both `Relaxed`.
///
/// [`MarkableRef`](crate::MarkableRef) 操作的内存序强度。
///
/// 每个操作只针对 `MemOrder` 实现一次；默认形式（`get`、`set`、`compare_and_swap` 等）
/// 以 [`MemOrder::SeqCst`] 调用。
/// 选择仍能为你的算法提供所需 happens-before 关系的最弱强度。
///
/// 对访问的某一半没有意义的内存序按照 `crossbeam` 选择失败内存序的方式降级：
/// `Release` 读取和 `Acquire` 写入都等同于 `Relaxed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemOrder {
    /// Sequentially consistent. Always correct.
    /// 顺序一致。总是正确的。
    #[default]
    SeqCst,
    /// Acquire on loads and on the read half of a CAS.
    /// 读取以及 CAS 的读取部分使用 Acquire。
    Acquire,
    /// Release on stores and on the write half of a CAS.
    /// 写入以及 CAS 的写入部分使用 Release。
    Release,
    /// No ordering, only atomicity.
    /// 无顺序保证，仅保证原子性。
    Relaxed,
}

impl MemOrder {
    /// All four strengths, strongest first.
    pub const ALL: [MemOrder; 4] = [
        MemOrder::SeqCst,
        MemOrder::Acquire,
        MemOrder::Release,
        MemOrder::Relaxed,
    ];

    /// Ordering for a plain atomic load.
    /// 普通原子读取所使用的内存序。
    #[inline]
    pub const fn load(self) -> Ordering {
        match self {
            MemOrder::SeqCst => Ordering::SeqCst,
            MemOrder::Acquire => Ordering::Acquire,
            MemOrder::Release | MemOrder::Relaxed => Ordering::Relaxed,
        }
    }

    /// Ordering for a plain atomic store.
    /// 普通原子写入所使用的内存序。
    #[inline]
    pub const fn store(self) -> Ordering {
        match self {
            MemOrder::SeqCst => Ordering::SeqCst,
            MemOrder::Release => Ordering::Release,
            MemOrder::Acquire | MemOrder::Relaxed => Ordering::Relaxed,
        }
    }

    /// Success ordering of a compare-exchange.
    /// compare-exchange 成功时的内存序。
    #[inline]
    pub const fn rmw(self) -> Ordering {
        match self {
            MemOrder::SeqCst => Ordering::SeqCst,
            MemOrder::Acquire => Ordering::Acquire,
            MemOrder::Release => Ordering::Release,
            MemOrder::Relaxed => Ordering::Relaxed,
        }
    }

    /// Failure ordering of a compare-exchange. A failed CAS is only a load.
    /// compare-exchange 失败时的内存序。失败的 CAS 只是一次读取。
    #[inline]
    pub const fn failure(self) -> Ordering {
        self.load()
    }
}
