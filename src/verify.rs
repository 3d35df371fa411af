//! Contract assertions with an optional model-checker hook.
//!
//! Built normally, [`contract_assert!`] is an unconditional `assert!`.
//! Built with `RUSTFLAGS="--cfg spsc_mark_verify"`, it forwards the condition to the
//! external `__VERIFIER_assert` entry point supplied by the model checker instead.
//!
//! 带可选模型检查器钩子的契约断言。
//!
//! 正常构建时，[`contract_assert!`] 就是无条件的 `assert!`。
//! 以 `RUSTFLAGS="--cfg spsc_mark_verify"` 构建时，条件会被转发给模型检查器提供的
//! 外部 `__VERIFIER_assert` 入口点。

#[cfg(spsc_mark_verify)]
unsafe extern "C" {
    fn __VERIFIER_assert(cond: core::ffi::c_int);
}

#[cfg(spsc_mark_verify)]
#[doc(hidden)]
#[inline(always)]
pub(crate) fn verifier_assert(cond: bool) {
    // SAFETY: the symbol is provided by the verifier harness that enabled this cfg.
    unsafe { __VERIFIER_assert(cond as core::ffi::c_int) }
}

#[cfg(spsc_mark_verify)]
macro_rules! contract_assert {
    ($cond:expr, $($msg:tt)+) => {
        $crate::verify::verifier_assert($cond)
    };
}

#[cfg(not(spsc_mark_verify))]
macro_rules! contract_assert {
    ($cond:expr, $($msg:tt)+) => {
        assert!($cond, $($msg)+)
    };
}

pub(crate) use contract_assert;
