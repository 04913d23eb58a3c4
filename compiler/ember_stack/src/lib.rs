//! Stack growth for the recursive phases.
//!
//! The parser, type inference and code generation all recurse once per
//! nesting level of the source. Each recursive entry point wraps its body in
//! [`ensure_sufficient_stack`] so pathological nesting (`((((...))))`,
//! long `else if` chains) grows the stack instead of overflowing it.
//!
//! On `wasm32` the call is a passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const GROWTH: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
