//! Native driver trait.
//!
//! This module defines:
//! - `CapeDriver` trait - one method per native library entry point
//! - `DriverFactory` type alias - factory function type
//! - `NOT_IMPLEMENTED` - status reported by drivers lacking an entry point
//!
//! The trait mirrors the native signatures: mutating calls return an `i32`
//! status (0 = success, anything else = failure), pure reads return the
//! requested value, and I2C reads fill a caller buffer and return a status.
//! Channel numbers arrive already validated by the gateway.

use crate::cape::config::GatewayConfig;

/// Status a driver returns for an entry point it does not provide.
pub const NOT_IMPLEMENTED: i32 = -libc::ENOSYS;

/// Status code for success.
pub const STATUS_OK: i32 = 0;

/// Factory function type for creating driver instances.
pub type DriverFactory = fn(&GatewayConfig) -> Box<dyn CapeDriver>;

/// Interface to the native hardware library.
///
/// Implementations own whatever synchronization the hardware needs; the
/// gateway never serializes calls and every method takes `&self`.
///
/// # Lifecycle
///
/// 1. `initialize()` - once, before any hardware call
/// 2. hardware calls - any order, any thread
/// 3. `cleanup()` - once, releases the hardware
pub trait CapeDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Bring up the board (PRU, PWM subsystems, GPIO, ...).
    fn initialize(&self) -> i32;

    /// Release all hardware and stop background services.
    fn cleanup(&self) -> i32;

    // ─── Program state ──────────────────────────────────────────────

    /// Current high-level state code (0-3).
    fn get_state(&self) -> i32;

    /// Set the high-level state.
    fn set_state(&self, state: i32) -> i32;

    // ─── LEDs, buttons, GPIO ────────────────────────────────────────

    /// Drive an LED on (1) or off (0).
    fn set_led(&self, led: i32, state: i32) -> i32;

    /// Blink an LED at `hz` for `period` seconds. Blocks for the period.
    fn blink_led(&self, led: i32, hz: f32, period: f32) -> i32;

    /// Read a GPIO line through the memory-mapped register block.
    ///
    /// Returns 0/1, or a negative value on failure.
    fn gpio_read_mmap(&self, pin: i32) -> i32;

    /// Pause button level (0 released, 1 pressed, negative on failure).
    fn get_pause_button(&self) -> i32;

    /// Mode button level (0 released, 1 pressed, negative on failure).
    fn get_mode_button(&self) -> i32;

    // ─── Motors ─────────────────────────────────────────────────────

    /// Take the H-bridges out of standby.
    fn enable_motors(&self) -> i32;
    /// Put the H-bridges into standby.
    fn disable_motors(&self) -> i32;
    /// Drive one motor with a signed duty cycle.
    fn set_motor(&self, motor: i32, duty: f32) -> i32;
    /// Drive all motors with the same duty cycle.
    fn set_motor_all(&self, duty: f32) -> i32;
    /// Let one motor coast.
    fn set_motor_free_spin(&self, motor: i32) -> i32;
    /// Let all motors coast.
    fn set_motor_free_spin_all(&self) -> i32;
    /// Short one motor's windings.
    fn set_motor_brake(&self, motor: i32) -> i32;
    /// Short all motors' windings.
    fn set_motor_brake_all(&self) -> i32;

    // ─── Encoders ───────────────────────────────────────────────────

    /// Current encoder count.
    fn get_encoder_pos(&self, channel: i32) -> i32;
    /// Overwrite an encoder count.
    fn set_encoder_pos(&self, channel: i32, value: i32) -> i32;

    // ─── Analog ─────────────────────────────────────────────────────

    /// 2-cell LiPo voltage.
    fn battery_voltage(&self) -> f32;
    /// DC barrel jack voltage.
    fn dc_jack_voltage(&self) -> f32;
    /// Raw 12-bit ADC count (negative on failure).
    fn adc_raw(&self, channel: i32) -> i32;
    /// ADC reading in volts.
    fn adc_volt(&self, channel: i32) -> f32;

    // ─── Servo / ESC ────────────────────────────────────────────────

    /// Switch the 6V servo rail on.
    fn enable_servo_power_rail(&self) -> i32;
    /// Switch the 6V servo rail off.
    fn disable_servo_power_rail(&self) -> i32;
    /// Emit one pulse of `us` microseconds.
    fn send_servo_pulse_us(&self, channel: i32, us: i32) -> i32;
    /// Emit one pulse of `us` microseconds on every channel.
    fn send_servo_pulse_us_all(&self, us: i32) -> i32;
    /// Emit one normalized servo pulse.
    fn send_servo_pulse_normalized(&self, channel: i32, input: f32) -> i32;
    /// Emit one normalized servo pulse on every channel.
    fn send_servo_pulse_normalized_all(&self, input: f32) -> i32;
    /// Emit one normalized ESC pulse.
    fn send_esc_pulse_normalized(&self, channel: i32, input: f32) -> i32;
    /// Emit one normalized ESC pulse on every channel.
    fn send_esc_pulse_normalized_all(&self, input: f32) -> i32;
    /// Emit one normalized oneshot125 pulse.
    fn send_oneshot_pulse_normalized(&self, channel: i32, input: f32) -> i32;
    /// Emit one normalized oneshot125 pulse on every channel.
    fn send_oneshot_pulse_normalized_all(&self, input: f32) -> i32;

    // ─── DSM radio ──────────────────────────────────────────────────

    /// Start the background DSM decoding service. Returns immediately.
    fn initialize_dsm(&self) -> i32;
    /// Stop the DSM service.
    fn stop_dsm_service(&self) -> i32;
    /// Raw pulse width of a channel in microseconds (0 if no data).
    fn get_dsm_ch_raw(&self, channel: i32) -> i32;
    /// Channel value scaled to roughly [-1, 1].
    fn get_dsm_ch_normalized(&self, channel: i32) -> f32;
    /// 1 if a packet arrived since the last read.
    fn is_new_dsm_data(&self) -> i32;
    /// 1 if packets are arriving.
    fn is_dsm_active(&self) -> i32;
    /// Milliseconds since the last packet.
    fn ms_since_last_dsm_packet(&self) -> i32;
    /// Nanoseconds since the last packet.
    fn nanos_since_last_dsm_packet(&self) -> u64;
    /// Number of channels the transmitter sends.
    fn get_num_dsm_channels(&self) -> i32;
    /// Put the receiver into bind mode.
    fn bind_dsm(&self) -> i32;
    /// Run the interactive calibration routine.
    fn calibrate_dsm_routine(&self) -> i32;

    // ─── Barometer ──────────────────────────────────────────────────

    /// Configure and power up the BMP280.
    fn initialize_barometer(&self, oversample: i32, filter: i32) -> i32;
    /// Put the BMP280 to sleep.
    fn power_off_barometer(&self) -> i32;
    /// Sample the sensor and update the cached readings.
    fn read_barometer(&self) -> i32;
    /// Last temperature in degrees Celsius.
    fn bmp_get_temperature(&self) -> f32;
    /// Last pressure in Pa.
    fn bmp_get_pressure_pa(&self) -> f32;
    /// Altitude in meters relative to the sea-level reference.
    fn bmp_get_altitude_m(&self) -> f32;
    /// Set the sea-level reference pressure in Pa.
    fn set_sea_level_pressure_pa(&self, pa: f32) -> i32;

    // ─── I2C ────────────────────────────────────────────────────────

    /// Open a bus and select a device.
    fn i2c_init(&self, bus: i32, device: u8) -> i32;
    /// Close a bus.
    fn i2c_close(&self, bus: i32) -> i32;
    /// Select another device on an open bus.
    fn i2c_set_device_address(&self, bus: i32, device: u8) -> i32;
    /// Mark a bus as in use.
    fn i2c_claim_bus(&self, bus: i32) -> i32;
    /// Release a claimed bus.
    fn i2c_release_bus(&self, bus: i32) -> i32;
    /// 1 if the bus is claimed.
    fn i2c_get_in_use_state(&self, bus: i32) -> i32;
    /// Read one register byte.
    fn i2c_read_byte(&self, bus: i32, register: u8, data: &mut u8) -> i32;
    /// Read `data.len()` consecutive register bytes.
    fn i2c_read_bytes(&self, bus: i32, register: u8, data: &mut [u8]) -> i32;
    /// Read one big-endian 16-bit register.
    fn i2c_read_word(&self, bus: i32, register: u8, data: &mut u16) -> i32;
    /// Read a single bit of a register.
    fn i2c_read_bit(&self, bus: i32, register: u8, bit: u8, data: &mut u8) -> i32;
    /// Write one raw byte without a register address.
    fn i2c_send_byte(&self, bus: i32, data: u8) -> i32;
    /// Write raw bytes without a register address.
    fn i2c_send_bytes(&self, bus: i32, data: &[u8]) -> i32;

    /// Read `data.len()` consecutive big-endian 16-bit registers.
    fn i2c_read_words(&self, _bus: i32, _register: u8, _data: &mut [u16]) -> i32 {
        NOT_IMPLEMENTED
    }

    /// Write one register byte.
    fn i2c_write_byte(&self, _bus: i32, _register: u8, _data: u8) -> i32 {
        NOT_IMPLEMENTED
    }

    /// Write consecutive register bytes.
    fn i2c_write_bytes(&self, _bus: i32, _register: u8, _data: &[u8]) -> i32 {
        NOT_IMPLEMENTED
    }

    /// Write one big-endian 16-bit register.
    fn i2c_write_word(&self, _bus: i32, _register: u8, _data: u16) -> i32 {
        NOT_IMPLEMENTED
    }

    /// Write consecutive big-endian 16-bit registers.
    fn i2c_write_words(&self, _bus: i32, _register: u8, _data: &[u16]) -> i32 {
        NOT_IMPLEMENTED
    }

    /// Set or clear a single bit of a register.
    fn i2c_write_bit(&self, _bus: i32, _register: u8, _bit: u8, _data: u8) -> i32 {
        NOT_IMPLEMENTED
    }

    // ─── CPU / board ────────────────────────────────────────────────

    /// Set the CPU frequency governor.
    fn set_cpu_freq(&self, freq: i32) -> i32;
    /// Current CPU frequency code.
    fn get_cpu_freq(&self) -> i32;
    /// Board model code.
    fn get_bb_model(&self) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_implemented_is_negative_enosys() {
        assert!(NOT_IMPLEMENTED < 0);
        assert_eq!(NOT_IMPLEMENTED, -libc::ENOSYS);
        assert_ne!(NOT_IMPLEMENTED, STATUS_OK);
    }
}
