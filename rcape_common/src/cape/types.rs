//! Domain enumerations mirrored from the native library.
//!
//! Every enum here is exchanged with callers and with the driver as a plain
//! integer code. `TryFrom<i64>` recovers the typed value from a code and
//! `code()` goes the other way.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Declares a `#[repr(i32)]` code enum with `code()` and `TryFrom<i64>`.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $code:expr ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            /// All variants in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Native integer code.
            #[inline]
            pub const fn code(self) -> i32 {
                self as i32
            }
        }

        impl TryFrom<i64> for $name {
            type Error = String;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $( c if c == $code => Ok(Self::$variant), )+
                    other => Err(format!(
                        concat!("unknown ", stringify!($name), " code: {}"),
                        other
                    )),
                }
            }
        }
    };
}

// ─── Robot state ────────────────────────────────────────────────────

code_enum! {
    /// High-level program state owned by the native library.
    RobotState {
        /// Nothing has claimed the state yet.
        Uninitialized = 0,
        /// Normal operation.
        Running = 1,
        /// Paused by the user (pause button or caller).
        Paused = 2,
        /// Program is shutting down.
        Exiting = 3,
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

// ─── LEDs and buttons ───────────────────────────────────────────────

code_enum! {
    /// On-board status LED.
    Led {
        Green = 0,
        Red = 1,
    }
}

impl Led {
    /// GPIO line backing this LED.
    pub const fn gpio(self) -> i32 {
        match self {
            Self::Green => crate::consts::GREEN_LED_GPIO,
            Self::Red => crate::consts::RED_LED_GPIO,
        }
    }
}

code_enum! {
    /// On-board push button.
    Button {
        Pause = 0,
        Mode = 1,
    }
}

code_enum! {
    /// Debounced button level.
    ButtonState {
        Released = 0,
        Pressed = 1,
    }
}

// ─── CPU / board ────────────────────────────────────────────────────

code_enum! {
    /// CPU frequency governor setting.
    CpuFreq {
        Auto = 0,
        Mhz300 = 1,
        Mhz600 = 2,
        Mhz800 = 3,
        Mhz1000 = 4,
    }
}

code_enum! {
    /// BeagleBone board variant reported by the native library.
    BoardModel {
        Unknown = 0,
        Black = 1,
        Green = 2,
        Blue = 3,
    }
}

impl Default for BoardModel {
    fn default() -> Self {
        Self::Blue
    }
}

// ─── Barometer ──────────────────────────────────────────────────────

code_enum! {
    /// BMP280 oversampling register code (multiples of 4).
    BmpOversample {
        X1 = 4,
        X2 = 8,
        X4 = 12,
        X8 = 16,
        X16 = 20,
    }
}

impl BmpOversample {
    /// Number of samples averaged per reading.
    pub const fn samples(self) -> u32 {
        1 << (self.code() / 4 - 1)
    }
}

code_enum! {
    /// BMP280 IIR filter register code (multiples of 4).
    BmpFilter {
        Off = 0,
        X2 = 4,
        X4 = 8,
        X8 = 12,
        X16 = 16,
    }
}

// ─── Gateway lifecycle ──────────────────────────────────────────────

/// Process-wide lifecycle of the hardware library as seen by the gateway.
///
/// `Uninitialized -> Initialized -> ShutDown`; `ShutDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    ShutDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::ShutDown => write!(f, "shut down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_state_codes_round_trip() {
        for state in RobotState::ALL {
            assert_eq!(RobotState::try_from(state.code() as i64), Ok(*state));
        }
        assert!(RobotState::try_from(4).is_err());
        assert!(RobotState::try_from(-1).is_err());
    }

    #[test]
    fn led_maps_to_gpio_line() {
        assert_eq!(Led::Green.gpio(), crate::consts::GREEN_LED_GPIO);
        assert_eq!(Led::Red.gpio(), crate::consts::RED_LED_GPIO);
    }

    #[test]
    fn barometer_codes_are_multiples_of_four() {
        for o in BmpOversample::ALL {
            assert_eq!(o.code() % 4, 0);
        }
        for f in BmpFilter::ALL {
            assert_eq!(f.code() % 4, 0);
        }
    }

    #[test]
    fn oversample_sample_counts() {
        assert_eq!(BmpOversample::X1.samples(), 1);
        assert_eq!(BmpOversample::X4.samples(), 4);
        assert_eq!(BmpOversample::X16.samples(), 16);
    }

    #[test]
    fn unknown_code_error_names_the_type() {
        let err = CpuFreq::try_from(9).unwrap_err();
        assert!(err.contains("CpuFreq"));
        assert!(err.contains('9'));
    }

    #[test]
    fn lifecycle_display() {
        assert_eq!(LifecycleState::default(), LifecycleState::Uninitialized);
        assert_eq!(LifecycleState::ShutDown.to_string(), "shut down");
    }
}
