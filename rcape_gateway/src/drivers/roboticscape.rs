//! Native driver: `libroboticscape` over FFI.
//!
//! Enabled with the `native` feature. Each trait method forwards to the
//! `rc_*` symbol of the same name. The library keeps its own global state,
//! so the driver itself is a unit struct.

use libc::{c_float, c_int};
use rcape_common::cape::config::GatewayConfig;
use rcape_common::cape::driver::{CapeDriver, STATUS_OK};

#[link(name = "roboticscape")]
unsafe extern "C" {
    fn rc_initialize() -> c_int;
    fn rc_cleanup() -> c_int;
    fn rc_get_state() -> c_int;
    fn rc_set_state(state: c_int) -> c_int;

    fn rc_set_led(led: c_int, state: c_int) -> c_int;
    fn rc_blink_led(led: c_int, hz: c_float, period: c_float) -> c_int;
    fn rc_gpio_get_value_mmap(pin: c_int) -> c_int;
    fn rc_get_pause_button() -> c_int;
    fn rc_get_mode_button() -> c_int;

    fn rc_enable_motors() -> c_int;
    fn rc_disable_motors() -> c_int;
    fn rc_set_motor(motor: c_int, duty: c_float) -> c_int;
    fn rc_set_motor_all(duty: c_float) -> c_int;
    fn rc_set_motor_free_spin(motor: c_int) -> c_int;
    fn rc_set_motor_free_spin_all() -> c_int;
    fn rc_set_motor_brake(motor: c_int) -> c_int;
    fn rc_set_motor_brake_all() -> c_int;

    fn rc_get_encoder_pos(ch: c_int) -> c_int;
    fn rc_set_encoder_pos(ch: c_int, value: c_int) -> c_int;

    fn rc_battery_voltage() -> c_float;
    fn rc_dc_jack_voltage() -> c_float;
    fn rc_adc_raw(ch: c_int) -> c_int;
    fn rc_adc_volt(ch: c_int) -> c_float;

    fn rc_enable_servo_power_rail() -> c_int;
    fn rc_disable_servo_power_rail() -> c_int;
    fn rc_send_servo_pulse_us(ch: c_int, us: c_int) -> c_int;
    fn rc_send_servo_pulse_us_all(us: c_int) -> c_int;
    fn rc_send_servo_pulse_normalized(ch: c_int, input: c_float) -> c_int;
    fn rc_send_servo_pulse_normalized_all(input: c_float) -> c_int;
    fn rc_send_esc_pulse_normalized(ch: c_int, input: c_float) -> c_int;
    fn rc_send_esc_pulse_normalized_all(input: c_float) -> c_int;
    fn rc_send_oneshot_pulse_normalized(ch: c_int, input: c_float) -> c_int;
    fn rc_send_oneshot_pulse_normalized_all(input: c_float) -> c_int;

    fn rc_initialize_dsm() -> c_int;
    fn rc_stop_dsm_service() -> c_int;
    fn rc_get_dsm_ch_raw(ch: c_int) -> c_int;
    fn rc_get_dsm_ch_normalized(ch: c_int) -> c_float;
    fn rc_is_new_dsm_data() -> c_int;
    fn rc_is_dsm_active() -> c_int;
    fn rc_ms_since_last_dsm_packet() -> c_int;
    fn rc_nanos_since_last_dsm_packet() -> u64;
    fn rc_get_num_dsm_channels() -> c_int;
    fn rc_bind_dsm() -> c_int;
    fn rc_calibrate_dsm_routine() -> c_int;

    fn rc_initialize_barometer(oversample: c_int, filter: c_int) -> c_int;
    fn rc_power_off_barometer() -> c_int;
    fn rc_read_barometer() -> c_int;
    fn rc_bmp_get_temperature() -> c_float;
    fn rc_bmp_get_pressure_pa() -> c_float;
    fn rc_bmp_get_altitude_m() -> c_float;
    fn rc_set_sea_level_pressure_pa(pa: c_float) -> c_int;

    fn rc_i2c_init(bus: c_int, dev_addr: u8) -> c_int;
    fn rc_i2c_close(bus: c_int) -> c_int;
    fn rc_i2c_set_device_address(bus: c_int, dev_addr: u8) -> c_int;
    fn rc_i2c_claim_bus(bus: c_int) -> c_int;
    fn rc_i2c_release_bus(bus: c_int) -> c_int;
    fn rc_i2c_get_in_use_state(bus: c_int) -> c_int;
    fn rc_i2c_read_byte(bus: c_int, reg_addr: u8, data: *mut u8) -> c_int;
    fn rc_i2c_read_bytes(bus: c_int, reg_addr: u8, length: u8, data: *mut u8) -> c_int;
    fn rc_i2c_read_word(bus: c_int, reg_addr: u8, data: *mut u16) -> c_int;
    fn rc_i2c_read_words(bus: c_int, reg_addr: u8, length: u8, data: *mut u16) -> c_int;
    fn rc_i2c_read_bit(bus: c_int, reg_addr: u8, bit_num: u8, data: *mut u8) -> c_int;
    fn rc_i2c_write_byte(bus: c_int, reg_addr: u8, data: u8) -> c_int;
    fn rc_i2c_write_bytes(bus: c_int, reg_addr: u8, length: u8, data: *mut u8) -> c_int;
    fn rc_i2c_write_word(bus: c_int, reg_addr: u8, data: u16) -> c_int;
    fn rc_i2c_write_words(bus: c_int, reg_addr: u8, length: u8, data: *mut u16) -> c_int;
    fn rc_i2c_write_bit(bus: c_int, reg_addr: u8, bit_num: u8, data: u8) -> c_int;
    fn rc_i2c_send_byte(bus: c_int, data: u8) -> c_int;
    fn rc_i2c_send_bytes(bus: c_int, length: u8, data: *mut u8) -> c_int;

    fn rc_set_cpu_freq(freq: c_int) -> c_int;
    fn rc_get_cpu_freq() -> c_int;
    fn rc_get_bb_model() -> c_int;
}

/// Multi-element I2C reads return the number of elements read; turn that
/// into a status.
fn count_status(expected: usize, got: c_int) -> i32 {
    match usize::try_from(got) {
        Ok(n) if n == expected => STATUS_OK,
        Ok(_) => -1,
        Err(_) => got,
    }
}

/// The library hands back the register byte masked to the requested bit,
/// not shifted down.
fn bit_value(masked: u8) -> u8 {
    u8::from(masked != 0)
}

/// Buffer lengths are validated to at most 128 elements before they get here.
fn length(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}

/// Driver backed by the installed `libroboticscape`.
#[derive(Debug, Default)]
pub struct RoboticsCapeDriver;

/// Factory function to create a native driver instance.
pub fn create_driver(_config: &GatewayConfig) -> Box<dyn CapeDriver> {
    Box::new(RoboticsCapeDriver)
}

// SAFETY (all methods): the rc_* functions take plain values or pointers
// into buffers that outlive the call and are sized for `length`.
impl CapeDriver for RoboticsCapeDriver {
    fn name(&self) -> &'static str {
        "roboticscape"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> i32 {
        unsafe { rc_initialize() }
    }

    fn cleanup(&self) -> i32 {
        unsafe { rc_cleanup() }
    }

    fn get_state(&self) -> i32 {
        unsafe { rc_get_state() }
    }

    fn set_state(&self, state: i32) -> i32 {
        unsafe { rc_set_state(state) }
    }

    fn set_led(&self, led: i32, state: i32) -> i32 {
        unsafe { rc_set_led(led, state) }
    }

    fn blink_led(&self, led: i32, hz: f32, period: f32) -> i32 {
        unsafe { rc_blink_led(led, hz, period) }
    }

    fn gpio_read_mmap(&self, pin: i32) -> i32 {
        unsafe { rc_gpio_get_value_mmap(pin) }
    }

    fn get_pause_button(&self) -> i32 {
        unsafe { rc_get_pause_button() }
    }

    fn get_mode_button(&self) -> i32 {
        unsafe { rc_get_mode_button() }
    }

    fn enable_motors(&self) -> i32 {
        unsafe { rc_enable_motors() }
    }

    fn disable_motors(&self) -> i32 {
        unsafe { rc_disable_motors() }
    }

    fn set_motor(&self, motor: i32, duty: f32) -> i32 {
        unsafe { rc_set_motor(motor, duty) }
    }

    fn set_motor_all(&self, duty: f32) -> i32 {
        unsafe { rc_set_motor_all(duty) }
    }

    fn set_motor_free_spin(&self, motor: i32) -> i32 {
        unsafe { rc_set_motor_free_spin(motor) }
    }

    fn set_motor_free_spin_all(&self) -> i32 {
        unsafe { rc_set_motor_free_spin_all() }
    }

    fn set_motor_brake(&self, motor: i32) -> i32 {
        unsafe { rc_set_motor_brake(motor) }
    }

    fn set_motor_brake_all(&self) -> i32 {
        unsafe { rc_set_motor_brake_all() }
    }

    fn get_encoder_pos(&self, channel: i32) -> i32 {
        unsafe { rc_get_encoder_pos(channel) }
    }

    fn set_encoder_pos(&self, channel: i32, value: i32) -> i32 {
        unsafe { rc_set_encoder_pos(channel, value) }
    }

    fn battery_voltage(&self) -> f32 {
        unsafe { rc_battery_voltage() }
    }

    fn dc_jack_voltage(&self) -> f32 {
        unsafe { rc_dc_jack_voltage() }
    }

    fn adc_raw(&self, channel: i32) -> i32 {
        unsafe { rc_adc_raw(channel) }
    }

    fn adc_volt(&self, channel: i32) -> f32 {
        unsafe { rc_adc_volt(channel) }
    }

    fn enable_servo_power_rail(&self) -> i32 {
        unsafe { rc_enable_servo_power_rail() }
    }

    fn disable_servo_power_rail(&self) -> i32 {
        unsafe { rc_disable_servo_power_rail() }
    }

    fn send_servo_pulse_us(&self, channel: i32, us: i32) -> i32 {
        unsafe { rc_send_servo_pulse_us(channel, us) }
    }

    fn send_servo_pulse_us_all(&self, us: i32) -> i32 {
        unsafe { rc_send_servo_pulse_us_all(us) }
    }

    fn send_servo_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        unsafe { rc_send_servo_pulse_normalized(channel, input) }
    }

    fn send_servo_pulse_normalized_all(&self, input: f32) -> i32 {
        unsafe { rc_send_servo_pulse_normalized_all(input) }
    }

    fn send_esc_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        unsafe { rc_send_esc_pulse_normalized(channel, input) }
    }

    fn send_esc_pulse_normalized_all(&self, input: f32) -> i32 {
        unsafe { rc_send_esc_pulse_normalized_all(input) }
    }

    fn send_oneshot_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        unsafe { rc_send_oneshot_pulse_normalized(channel, input) }
    }

    fn send_oneshot_pulse_normalized_all(&self, input: f32) -> i32 {
        unsafe { rc_send_oneshot_pulse_normalized_all(input) }
    }

    fn initialize_dsm(&self) -> i32 {
        unsafe { rc_initialize_dsm() }
    }

    fn stop_dsm_service(&self) -> i32 {
        unsafe { rc_stop_dsm_service() }
    }

    fn get_dsm_ch_raw(&self, channel: i32) -> i32 {
        unsafe { rc_get_dsm_ch_raw(channel) }
    }

    fn get_dsm_ch_normalized(&self, channel: i32) -> f32 {
        unsafe { rc_get_dsm_ch_normalized(channel) }
    }

    fn is_new_dsm_data(&self) -> i32 {
        unsafe { rc_is_new_dsm_data() }
    }

    fn is_dsm_active(&self) -> i32 {
        unsafe { rc_is_dsm_active() }
    }

    fn ms_since_last_dsm_packet(&self) -> i32 {
        unsafe { rc_ms_since_last_dsm_packet() }
    }

    fn nanos_since_last_dsm_packet(&self) -> u64 {
        unsafe { rc_nanos_since_last_dsm_packet() }
    }

    fn get_num_dsm_channels(&self) -> i32 {
        unsafe { rc_get_num_dsm_channels() }
    }

    fn bind_dsm(&self) -> i32 {
        unsafe { rc_bind_dsm() }
    }

    fn calibrate_dsm_routine(&self) -> i32 {
        unsafe { rc_calibrate_dsm_routine() }
    }

    fn initialize_barometer(&self, oversample: i32, filter: i32) -> i32 {
        unsafe { rc_initialize_barometer(oversample, filter) }
    }

    fn power_off_barometer(&self) -> i32 {
        unsafe { rc_power_off_barometer() }
    }

    fn read_barometer(&self) -> i32 {
        unsafe { rc_read_barometer() }
    }

    fn bmp_get_temperature(&self) -> f32 {
        unsafe { rc_bmp_get_temperature() }
    }

    fn bmp_get_pressure_pa(&self) -> f32 {
        unsafe { rc_bmp_get_pressure_pa() }
    }

    fn bmp_get_altitude_m(&self) -> f32 {
        unsafe { rc_bmp_get_altitude_m() }
    }

    fn set_sea_level_pressure_pa(&self, pa: f32) -> i32 {
        unsafe { rc_set_sea_level_pressure_pa(pa) }
    }

    fn i2c_init(&self, bus: i32, device: u8) -> i32 {
        unsafe { rc_i2c_init(bus, device) }
    }

    fn i2c_close(&self, bus: i32) -> i32 {
        unsafe { rc_i2c_close(bus) }
    }

    fn i2c_set_device_address(&self, bus: i32, device: u8) -> i32 {
        unsafe { rc_i2c_set_device_address(bus, device) }
    }

    fn i2c_claim_bus(&self, bus: i32) -> i32 {
        unsafe { rc_i2c_claim_bus(bus) }
    }

    fn i2c_release_bus(&self, bus: i32) -> i32 {
        unsafe { rc_i2c_release_bus(bus) }
    }

    fn i2c_get_in_use_state(&self, bus: i32) -> i32 {
        unsafe { rc_i2c_get_in_use_state(bus) }
    }

    fn i2c_read_byte(&self, bus: i32, register: u8, data: &mut u8) -> i32 {
        count_status(1, unsafe { rc_i2c_read_byte(bus, register, data) })
    }

    fn i2c_read_bytes(&self, bus: i32, register: u8, data: &mut [u8]) -> i32 {
        let got =
            unsafe { rc_i2c_read_bytes(bus, register, length(data.len()), data.as_mut_ptr()) };
        count_status(data.len(), got)
    }

    fn i2c_read_word(&self, bus: i32, register: u8, data: &mut u16) -> i32 {
        count_status(1, unsafe { rc_i2c_read_word(bus, register, data) })
    }

    fn i2c_read_bit(&self, bus: i32, register: u8, bit: u8, data: &mut u8) -> i32 {
        let status = count_status(1, unsafe { rc_i2c_read_bit(bus, register, bit, data) });
        if status == STATUS_OK {
            *data = bit_value(*data);
        }
        status
    }

    fn i2c_send_byte(&self, bus: i32, data: u8) -> i32 {
        unsafe { rc_i2c_send_byte(bus, data) }
    }

    fn i2c_send_bytes(&self, bus: i32, data: &[u8]) -> i32 {
        // The C signature takes a mutable pointer; hand it a private copy.
        let mut buf = data.to_vec();
        unsafe { rc_i2c_send_bytes(bus, length(buf.len()), buf.as_mut_ptr()) }
    }

    fn i2c_read_words(&self, bus: i32, register: u8, data: &mut [u16]) -> i32 {
        let got =
            unsafe { rc_i2c_read_words(bus, register, length(data.len()), data.as_mut_ptr()) };
        count_status(data.len(), got)
    }

    fn i2c_write_byte(&self, bus: i32, register: u8, data: u8) -> i32 {
        unsafe { rc_i2c_write_byte(bus, register, data) }
    }

    fn i2c_write_bytes(&self, bus: i32, register: u8, data: &[u8]) -> i32 {
        let mut buf = data.to_vec();
        unsafe { rc_i2c_write_bytes(bus, register, length(buf.len()), buf.as_mut_ptr()) }
    }

    fn i2c_write_word(&self, bus: i32, register: u8, data: u16) -> i32 {
        unsafe { rc_i2c_write_word(bus, register, data) }
    }

    fn i2c_write_words(&self, bus: i32, register: u8, data: &[u16]) -> i32 {
        let mut buf = data.to_vec();
        unsafe { rc_i2c_write_words(bus, register, length(buf.len()), buf.as_mut_ptr()) }
    }

    fn i2c_write_bit(&self, bus: i32, register: u8, bit: u8, data: u8) -> i32 {
        unsafe { rc_i2c_write_bit(bus, register, bit, data) }
    }

    fn set_cpu_freq(&self, freq: i32) -> i32 {
        unsafe { rc_set_cpu_freq(freq) }
    }

    fn get_cpu_freq(&self) -> i32 {
        unsafe { rc_get_cpu_freq() }
    }

    fn get_bb_model(&self) -> i32 {
        unsafe { rc_get_bb_model() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reads_are_failures() {
        assert_eq!(count_status(4, 4), STATUS_OK);
        assert_eq!(count_status(4, 2), -1);
        assert_eq!(count_status(4, -5), -5);
    }

    #[test]
    fn single_reads_count_one_element() {
        assert_eq!(count_status(1, 1), STATUS_OK);
        assert_eq!(count_status(1, 0), -1);
        assert_eq!(count_status(1, -5), -5);
    }

    #[test]
    fn masked_bits_read_as_zero_or_one() {
        assert_eq!(bit_value(0), 0);
        assert_eq!(bit_value(0b0000_0001), 1);
        assert_eq!(bit_value(0b1000_0000), 1);
    }

    #[test]
    fn lengths_fit_the_c_argument() {
        assert_eq!(length(128), 128);
        assert_eq!(length(1000), u8::MAX);
    }
}
