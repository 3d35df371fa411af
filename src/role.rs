//! Debug-build detection of SPSC contract violations on the shared `unsafe` API.
//!
//! The first thread that enqueues becomes the producer, the first thread that
//! dequeues becomes the consumer. Any later call from a different thread is a
//! caller bug and panics. Release builds and loom builds compile this to nothing.
//!
//! 在调试构建中检测共享 `unsafe` API 上违反 SPSC 契约的行为。
//!
//! 第一个入队的线程成为生产者，第一个出队的线程成为消费者。
//! 之后来自不同线程的任何调用都是调用者的 bug，会 panic。
//! Release 构建和 loom 构建中此检查被编译为空。

use crate::trace::Side;

#[cfg(all(debug_assertions, not(feature = "loom")))]
mod imp {
    use super::Side;
    use crate::sync::Mutex;
    use crate::trace;
    use std::thread::{self, ThreadId};

    #[derive(Debug)]
    pub(crate) struct RoleCheck {
        enabled: bool,
        producer: Mutex<Option<ThreadId>>,
        consumer: Mutex<Option<ThreadId>>,
    }

    impl RoleCheck {
        pub(crate) fn new(enabled: bool) -> Self {
            Self {
                enabled,
                producer: Mutex::new(None),
                consumer: Mutex::new(None),
            }
        }

        #[track_caller]
        pub(crate) fn enter(&self, side: Side) {
            if !self.enabled {
                return;
            }

            let owner = match side {
                Side::Producer => &self.producer,
                Side::Consumer => &self.consumer,
            };

            let caller = thread::current().id();
            let mut owner = owner.lock();
            match *owner {
                None => *owner = Some(caller),
                Some(id) if id == caller => {}
                Some(id) => {
                    trace::role_violation(side, &format!("{id:?}"), &format!("{caller:?}"));
                    panic!(
                        "BUG: SpscRing {side:?} used from {caller:?}, but it belongs to {id:?}. \
                         Only one thread may enqueue and only one thread may dequeue."
                    );
                }
            }
        }
    }
}

#[cfg(not(all(debug_assertions, not(feature = "loom"))))]
mod imp {
    use super::Side;

    #[derive(Debug)]
    pub(crate) struct RoleCheck;

    impl RoleCheck {
        #[inline(always)]
        pub(crate) fn new(_enabled: bool) -> Self {
            RoleCheck
        }

        #[inline(always)]
        pub(crate) fn enter(&self, _side: Side) {}
    }
}

pub(crate) use imp::RoleCheck;
