//! Logging-Makros
//!
//! Leiten an `defmt` weiter, wenn das Feature aktiv ist; sonst werden die
//! Argumente nur ausgewertet (Host-Tests, keine Warnungen für ungenutzte Werte).
//!
//! `warn` heißt intern `warn_`, der Name kollidiert sonst mit dem
//! eingebauten `#[warn]`-Attribut.

macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! warn_ {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::warn!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::debug!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

pub(crate) use {debug, info, warn_ as warn};
