// Design-by-contract checks.  They are compiled in for unit tests and when the
// `contracts` feature is on; otherwise the conditions are never evaluated.

#[cfg_attr(not(any(test, feature = "contracts")), allow(dead_code))]
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violated(kind: &str, msg: &str) -> ! {
    log::error!("{kind} violation: {msg}");
    panic!("{kind} violation: {msg}");
}

#[cfg(any(test, feature = "contracts"))]
macro_rules! require {
    ( $cond:expr, $msg:expr ) => {{
        if !$cond {
            $crate::contract::violated("pre-condition", $msg);
        }
    }};
}

#[cfg(any(test, feature = "contracts"))]
macro_rules! ensure {
    ( $cond:expr, $msg:expr ) => {{
        if !$cond {
            $crate::contract::violated("post-condition", $msg);
        }
    }};
}

#[cfg(any(test, feature = "contracts"))]
macro_rules! invariant {
    ( $cond:expr, $msg:expr ) => {{
        if !$cond {
            $crate::contract::violated("invariant", $msg);
        }
    }};
}

#[cfg(not(any(test, feature = "contracts")))]
macro_rules! require {
    ( $cond:expr, $msg:expr ) => {{}};
}

#[cfg(not(any(test, feature = "contracts")))]
macro_rules! ensure {
    ( $cond:expr, $msg:expr ) => {{}};
}

#[cfg(not(any(test, feature = "contracts")))]
macro_rules! invariant {
    ( $cond:expr, $msg:expr ) => {{}};
}
