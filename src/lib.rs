//! Lock-free building blocks for producer/consumer pipelines and linked structures.
//!
//! - [`MarkableRef`]: an aligned pointer and a one-bit mark packed into one atomic
//!   word, with compare-and-swap, mark-only and plain read/write operations at
//!   every [`MemOrder`] strength.
//! - [`SpscRing`]: a bounded single-producer single-consumer ring buffer that
//!   hands elements from one thread to another without locks or CAS.
//!
//! The two are independent; client code composes them.
//!
//! # Example
//! ```
//! use spsc_mark::SpscRing;
//! use std::sync::atomic::AtomicBool;
//! use std::thread;
//!
//! // A closed loop: chunks travel producer -> consumer on `used`
//! // and come back on `free`, so the hot path never allocates.
//! let (mut free_tx, mut free_rx) = SpscRing::<Box<[u8; 4]>>::new(16).split();
//! let (mut used_tx, mut used_rx) = SpscRing::<Box<[u8; 4]>>::new(16).split();
//! for _ in 0..16 {
//!     free_tx.try_enqueue(Box::new([0; 4])).unwrap();
//! }
//!
//! let stop = AtomicBool::new(false);
//! thread::scope(|s| {
//!     s.spawn(|| {
//!         for i in 0..1000u32 {
//!             let mut chunk = free_rx.dequeue_spin(&stop).unwrap();
//!             *chunk = i.to_le_bytes();
//!             used_tx.enqueue_spin(chunk, &stop).unwrap();
//!         }
//!     });
//!     s.spawn(|| {
//!         for i in 0..1000u32 {
//!             let chunk = used_rx.dequeue_spin(&stop).unwrap();
//!             assert_eq!(u32::from_le_bytes(*chunk), i);
//!             free_tx.enqueue_spin(chunk, &stop).unwrap();
//!         }
//!     });
//! });
//! ```
//!
//! 用于生产者/消费者流水线和链式结构的无锁构建块。
//!
//! - [`MarkableRef`]：将对齐指针和一位标记打包进一个原子字，
//!   在每种 [`MemOrder`] 强度下提供 CAS、仅标记以及普通读写操作。
//! - [`SpscRing`]：有界的单生产者单消费者环形缓冲区，
//!   无需锁或 CAS 即可将元素从一个线程交给另一个线程。
//!
//! 二者相互独立，由客户端代码组合使用。

pub mod counter;
mod handle;
mod markable;
mod ordering;
mod ring;
mod role;
mod sync;
mod trace;
mod verify;

pub use counter::{Counter, Ordered};
#[cfg(all(feature = "racy-counters", not(feature = "loom")))]
pub use counter::{Plain, Volatile};
pub use handle::{Cancelled, Consumer, Producer};
pub use markable::{ADDRESS_MASK, MARK_BIT, MIN_ALIGN, MarkableRef, RESERVED_BIT};
pub use ordering::MemOrder;
pub use ring::{Empty, Full, SpscRing, SpscRingBuilder};

#[cfg(all(test, not(feature = "loom")))]
mod tests;
