//! Stack growth for the recursive evaluator.
//!
//! Every sequence level costs several native frames, so a deep program can
//! exhaust a small thread stack long before `Config::max_depth` trips.
//! Segments are added on demand instead.

/// Run `f`, first moving to a fresh stack segment if less than the red zone
/// remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 128 * 1024;
    const SEGMENT: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
