//! Board-wide constants for the Robotics Cape / BeagleBone Blue.
//!
//! Single source of truth for every channel range and electrical limit the
//! gateway validates against. Imported by all crates, no duplication.

use static_assertions::const_assert;

/// Canonical service name (used for logging and the default config).
pub const SERVICE_NAME: &str = "rcape";

/// Prefix carried by every native library symbol.
pub const NATIVE_PREFIX: &str = "rc_";

// ─── Motors ─────────────────────────────────────────────────────────

/// Number of H-bridge motor channels.
pub const MOTOR_COUNT: usize = 8;
/// First motor channel (1-based).
pub const MOTOR_MIN: i64 = 1;
/// Last motor channel.
pub const MOTOR_MAX: i64 = MOTOR_COUNT as i64;
/// Full reverse duty cycle.
pub const DUTY_MIN: f64 = -1.0;
/// Full forward duty cycle.
pub const DUTY_MAX: f64 = 1.0;

// ─── Encoders ───────────────────────────────────────────────────────

/// Number of quadrature encoder channels.
pub const ENCODER_COUNT: usize = 4;
/// First encoder channel (1-based).
pub const ENCODER_MIN: i64 = 1;
/// Last encoder channel.
pub const ENCODER_MAX: i64 = ENCODER_COUNT as i64;

// ─── ADC ────────────────────────────────────────────────────────────

/// Number of user-accessible ADC channels.
pub const ADC_COUNT: usize = 7;
/// First ADC channel (0-based).
pub const ADC_MIN: i64 = 0;
/// Last ADC channel.
pub const ADC_MAX: i64 = ADC_COUNT as i64 - 1;
/// Full-scale ADC count (12 bit).
pub const ADC_FULL_SCALE: i32 = 4095;
/// ADC reference voltage.
pub const ADC_REFERENCE_V: f32 = 1.8;

// ─── Servo / ESC ────────────────────────────────────────────────────

/// Number of servo/ESC pulse channels.
pub const SERVO_COUNT: usize = 8;
/// First servo channel (1-based).
pub const SERVO_MIN: i64 = 1;
/// Last servo channel.
pub const SERVO_MAX: i64 = SERVO_COUNT as i64;
/// Lower bound of the normalized servo input.
pub const SERVO_NORMALIZED_MIN: f64 = -1.5;
/// Upper bound of the normalized servo input.
pub const SERVO_NORMALIZED_MAX: f64 = 1.5;
/// Lower bound of the normalized ESC/oneshot input (arming margin below zero).
pub const ESC_NORMALIZED_MIN: f64 = -0.1;
/// Upper bound of the normalized ESC/oneshot input.
pub const ESC_NORMALIZED_MAX: f64 = 1.0;

// ─── DSM radio ──────────────────────────────────────────────────────

/// Maximum number of DSM channels decoded by the receiver service.
pub const DSM_MAX_CHANNELS: usize = 9;
/// First DSM channel (1-based).
pub const DSM_MIN: i64 = 1;
/// Last DSM channel.
pub const DSM_MAX: i64 = DSM_MAX_CHANNELS as i64;

// ─── Barometer ──────────────────────────────────────────────────────

/// Oversample and filter register codes are multiples of this step.
pub const BMP_CODE_STEP: i64 = 4;
/// Lowest oversample code (x1).
pub const BMP_OVERSAMPLE_MIN: i64 = 4;
/// Highest oversample code (x16).
pub const BMP_OVERSAMPLE_MAX: i64 = 20;
/// Lowest filter code (off).
pub const BMP_FILTER_MIN: i64 = 0;
/// Highest filter code (x16).
pub const BMP_FILTER_MAX: i64 = 16;
/// Lowest accepted sea-level reference pressure in Pa.
pub const SEA_LEVEL_PA_MIN: f64 = 80_000.0;
/// Highest accepted sea-level reference pressure in Pa.
pub const SEA_LEVEL_PA_MAX: f64 = 120_000.0;
/// Standard atmosphere at sea level in Pa.
pub const STANDARD_SEA_LEVEL_PA: f64 = 101_325.0;

// ─── I2C ────────────────────────────────────────────────────────────

/// Number of I2C buses exposed on the board.
pub const I2C_BUS_COUNT: usize = 2;
/// First I2C bus.
pub const I2C_BUS_MIN: i64 = 1;
/// Last I2C bus.
pub const I2C_BUS_MAX: i64 = I2C_BUS_COUNT as i64;
/// Lowest non-reserved 7-bit device address.
pub const I2C_DEVICE_MIN: i64 = 0x03;
/// Highest non-reserved 7-bit device address.
pub const I2C_DEVICE_MAX: i64 = 0x77;
/// Lowest register address.
pub const I2C_REGISTER_MIN: i64 = 0x00;
/// Highest register address.
pub const I2C_REGISTER_MAX: i64 = 0xFF;
/// Highest bit number addressable by the bit accessors.
pub const I2C_BIT_MAX: i64 = 15;
/// Largest single transfer, in bytes.
pub const I2C_MAX_BYTES: usize = 128;
/// Largest single transfer, in 16-bit words.
pub const I2C_MAX_WORDS: usize = I2C_MAX_BYTES / 2;

// ─── Status LEDs ────────────────────────────────────────────────────

/// GPIO line driving the green status LED.
pub const GREEN_LED_GPIO: i32 = 67;
/// GPIO line driving the red status LED.
pub const RED_LED_GPIO: i32 = 66;

// ─── System ─────────────────────────────────────────────────────────

/// Highest robot state code.
pub const STATE_MAX: i64 = 3;
/// Highest CPU frequency code.
pub const CPU_FREQ_MAX: i64 = 4;

const_assert!(MOTOR_MAX == SERVO_MAX);
const_assert!(I2C_MAX_WORDS * 2 == I2C_MAX_BYTES);
const_assert!(BMP_OVERSAMPLE_MIN % BMP_CODE_STEP == 0);
const_assert!(BMP_FILTER_MAX % BMP_CODE_STEP == 0);
