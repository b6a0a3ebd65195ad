//! Logging macros forwarding to `defmt` when the `defmt` feature is enabled.
//!
//! Without the feature the arguments are only borrowed, so call sites stay
//! warning-free and cost nothing.

#![macro_use]
#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            {
                $( let _ = & $x; )*
            }
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            {
                $( let _ = & $x; )*
            }
        }
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::info!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            {
                $( let _ = & $x; )*
            }
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            {
                $( let _ = & $x; )*
            }
        }
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::error!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            {
                $( let _ = & $x; )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_accept_any_argument_count() {
        let axis = 3usize;
        let elapsed = 3_001u64;
        trace!("idle");
        debug!("registered axis {=usize}", axis);
        info!("axis {=usize} at {=u64}", axis, elapsed);
        warn!("stale for {=u64} ms", elapsed,);
        error!("axis {=usize} failed", axis + 1);
    }
}
