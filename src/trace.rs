//! Structured events for cold paths.
//!
//! When the `tracing` feature is enabled these functions emit `tracing` events;
//! otherwise they compile to nothing. Hot-path outcomes (`Full` / `Empty`) are
//! never reported here: they are backpressure, not faults.
//!
//! 冷路径上的结构化事件。
//!
//! 启用 `tracing` 特性时这些函数会发出 `tracing` 事件；否则编译为空。
//! 热路径结果（`Full` / `Empty`）永远不会在这里报告：它们是背压信号，而不是故障。

/// Which end of a ring an event concerns.
/// 事件所涉及的环形缓冲区一端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Producer,
    Consumer,
}

#[cfg(feature = "tracing")]
mod internal {
    use super::Side;

    pub(crate) fn ring_created(capacity: usize, counters: &'static str, sound: bool) {
        if sound {
            tracing::debug!(capacity, counters, "spsc_ring_created");
        } else {
            tracing::warn!(capacity, counters, "spsc_ring_created_with_unsound_counters");
        }
    }

    pub(crate) fn spin_cancelled(side: Side) {
        tracing::debug!(side = ?side, "spsc_spin_cancelled");
    }

    #[allow(dead_code)]
    pub(crate) fn role_violation(side: Side, owner: &str, caller: &str) {
        tracing::error!(side = ?side, owner, caller, "spsc_role_violation");
    }
}

#[cfg(not(feature = "tracing"))]
mod internal {
    use super::Side;

    #[inline(always)]
    pub(crate) fn ring_created(_capacity: usize, _counters: &'static str, _sound: bool) {}

    #[inline(always)]
    pub(crate) fn spin_cancelled(_side: Side) {}

    #[inline(always)]
    #[allow(dead_code)]
    pub(crate) fn role_violation(_side: Side, _owner: &str, _caller: &str) {}
}

pub(crate) use internal::*;
