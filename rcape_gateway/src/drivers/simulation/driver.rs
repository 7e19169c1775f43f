//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `CapeDriver` trait on top of an
//! in-memory `SimState`, so the gateway and its callers can be exercised
//! without a BeagleBone. Every native entry point is recorded and logged at
//! `trace`, and any status-returning entry point can be made to fail once
//! with `inject_fault`.

use super::state::{FAILURE, MotorOutput, Pulse, SimState, index};
use parking_lot::Mutex;
use rcape_common::cape::config::SimulationConfig;
use rcape_common::cape::driver::{CapeDriver, STATUS_OK};
use rcape_common::cape::types::{BmpFilter, BmpOversample, Button, CpuFreq, Led, RobotState};
use rcape_common::consts::{
    ADC_COUNT, ENCODER_COUNT, GREEN_LED_GPIO, I2C_BUS_COUNT, MOTOR_COUNT, RED_LED_GPIO,
    SERVO_COUNT,
};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::trace;

/// Most recent native calls kept for inspection.
pub const CALL_LOG_CAPACITY: usize = 1024;

/// Per-symbol call counters plus a bounded window of recent calls.
#[derive(Default)]
struct CallLog {
    recent: VecDeque<&'static str>,
    counts: HashMap<&'static str, usize>,
    total: usize,
}

impl CallLog {
    fn record(&mut self, native: &'static str) {
        if self.recent.len() == CALL_LOG_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(native);
        *self.counts.entry(native).or_default() += 1;
        self.total += 1;
    }
}

struct Inner {
    state: SimState,
    calls: CallLog,
    faults: HashMap<&'static str, i32>,
}

/// Simulation driver implementing the CapeDriver trait.
///
/// Clones share the same simulated board, which lets a test keep a handle
/// for inspection after boxing the driver into a gateway.
#[derive(Clone)]
pub struct SimulationDriver {
    inner: Arc<Mutex<Inner>>,
}

impl SimulationDriver {
    /// Create a simulated board with the given initial readings.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: SimState::new(config),
                calls: CallLog::default(),
                faults: HashMap::new(),
            })),
        }
    }

    /// Status-returning native call: recorded, fault-injectable, logged.
    fn call(&self, native: &'static str, f: impl FnOnce(&mut SimState) -> i32) -> i32 {
        let mut inner = self.inner.lock();
        inner.calls.record(native);
        if let Some(code) = inner.faults.remove(native) {
            trace!(native, code, "injected fault");
            return code;
        }
        let code = f(&mut inner.state);
        trace!(native, code, "native call");
        code
    }

    /// Pure read: recorded and logged, never mutates the board.
    fn read<T: Debug>(&self, native: &'static str, f: impl FnOnce(&SimState) -> T) -> T {
        let mut inner = self.inner.lock();
        inner.calls.record(native);
        let value = f(&inner.state);
        trace!(native, ?value, "native read");
        value
    }

    // ─── Test and bench helpers ─────────────────────────────────────

    /// Make the next call to `native` return `code` without touching state.
    pub fn inject_fault(&self, native: &'static str, code: i32) {
        self.inner.lock().faults.insert(native, code);
    }

    /// Native entry points called so far, in order.
    ///
    /// Only the last [`CALL_LOG_CAPACITY`] calls are kept.
    pub fn native_calls(&self) -> Vec<&'static str> {
        self.inner.lock().calls.recent.iter().copied().collect()
    }

    /// Native calls made since creation or the last `clear_calls`.
    pub fn total_calls(&self) -> usize {
        self.inner.lock().calls.total
    }

    /// Number of calls made to one native entry point.
    pub fn call_count(&self, native: &str) -> usize {
        self.inner.lock().calls.counts.get(native).copied().unwrap_or(0)
    }

    /// Forget every recorded call. Board state and pending faults stay.
    pub fn clear_calls(&self) {
        self.inner.lock().calls = CallLog::default();
    }

    /// Copy of the simulated board.
    pub fn snapshot(&self) -> SimState {
        self.inner.lock().state.clone()
    }

    /// Hold a button down or let it go.
    pub fn press_button(&self, button: Button, pressed: bool) {
        self.inner.lock().state.buttons[button.code() as usize] = pressed as i32;
    }

    /// Deliver one DSM frame. Ignored unless the service runs.
    pub fn push_dsm_frame(&self, raw: &[i32]) -> bool {
        let mut inner = self.inner.lock();
        if !inner.state.dsm.running {
            return false;
        }
        inner.state.dsm.push_frame(raw);
        true
    }

    /// Change what the barometer measures on its next read.
    pub fn set_ambient(&self, temperature_c: f32, pressure_pa: f32) {
        let mut inner = self.inner.lock();
        let baro = &mut inner.state.barometer;
        baro.ambient_temperature_c = temperature_c;
        baro.ambient_pressure_pa = pressure_pa;
    }

    /// Preload a device's register file, whether or not the bus is open.
    pub fn load_registers(&self, bus: i32, device: u8, start: u8, data: &[u8]) -> bool {
        let mut inner = self.inner.lock();
        let Some(i) = index(bus, I2C_BUS_COUNT) else {
            return false;
        };
        let bus = &mut inner.state.i2c[i];
        let selected = bus.device;
        bus.device = device;
        let ok = bus.write(start, data);
        bus.device = selected;
        ok
    }

    /// Raw bytes sent on a bus without a register address.
    pub fn sent_bytes(&self, bus: i32) -> Vec<u8> {
        index(bus, I2C_BUS_COUNT)
            .map(|i| self.inner.lock().state.i2c[i].sent.clone())
            .unwrap_or_default()
    }
}

/// Apply `f` to one channel of `slots`, or fail if the channel is out of range.
fn with_channel<T>(slots: &mut [T], channel: i32, f: impl FnOnce(&mut T)) -> i32 {
    match index(channel, slots.len()) {
        Some(i) => {
            f(&mut slots[i]);
            STATUS_OK
        }
        None => FAILURE,
    }
}

fn pulse_all(state: &mut SimState, pulse: Pulse) -> i32 {
    state.pulses = [Some(pulse); SERVO_COUNT];
    STATUS_OK
}

fn adc_index(channel: i32) -> Option<usize> {
    usize::try_from(channel).ok().filter(|c| *c < ADC_COUNT)
}

impl CapeDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&self) -> i32 {
        self.call("rc_initialize", |s| {
            s.initialized = true;
            STATUS_OK
        })
    }

    fn cleanup(&self) -> i32 {
        self.call("rc_cleanup", |s| {
            s.release_hardware();
            STATUS_OK
        })
    }

    fn get_state(&self) -> i32 {
        self.call("rc_get_state", |s| s.robot_state)
    }

    fn set_state(&self, state: i32) -> i32 {
        self.call("rc_set_state", |s| match RobotState::try_from(state as i64) {
            Ok(new) => {
                s.robot_state = new.code();
                STATUS_OK
            }
            Err(_) => FAILURE,
        })
    }

    fn set_led(&self, led: i32, state: i32) -> i32 {
        self.call("rc_set_led", |s| match Led::try_from(led as i64) {
            Ok(led) => {
                s.leds[led.code() as usize] = (state != 0) as i32;
                STATUS_OK
            }
            Err(_) => FAILURE,
        })
    }

    /// Returns at once and leaves the LED off, where the native call would
    /// block for `period` seconds first.
    fn blink_led(&self, led: i32, hz: f32, period: f32) -> i32 {
        self.call("rc_blink_led", |s| match Led::try_from(led as i64) {
            Ok(led) if hz > 0.0 && period > 0.0 => {
                s.leds[led.code() as usize] = 0;
                STATUS_OK
            }
            _ => FAILURE,
        })
    }

    fn gpio_read_mmap(&self, pin: i32) -> i32 {
        self.call("rc_gpio_get_value_mmap", |s| match pin {
            GREEN_LED_GPIO => s.leds[Led::Green.code() as usize],
            RED_LED_GPIO => s.leds[Led::Red.code() as usize],
            _ => FAILURE,
        })
    }

    fn get_pause_button(&self) -> i32 {
        self.call("rc_get_pause_button", |s| s.buttons[Button::Pause.code() as usize])
    }

    fn get_mode_button(&self) -> i32 {
        self.call("rc_get_mode_button", |s| s.buttons[Button::Mode.code() as usize])
    }

    fn enable_motors(&self) -> i32 {
        self.call("rc_enable_motors", |s| {
            s.motors_enabled = true;
            STATUS_OK
        })
    }

    fn disable_motors(&self) -> i32 {
        self.call("rc_disable_motors", |s| {
            s.motors_enabled = false;
            STATUS_OK
        })
    }

    fn set_motor(&self, motor: i32, duty: f32) -> i32 {
        self.call("rc_set_motor", |s| {
            with_channel(&mut s.motors, motor, |m| *m = MotorOutput::Duty(duty))
        })
    }

    fn set_motor_all(&self, duty: f32) -> i32 {
        self.call("rc_set_motor_all", |s| {
            s.motors = [MotorOutput::Duty(duty); MOTOR_COUNT];
            STATUS_OK
        })
    }

    fn set_motor_free_spin(&self, motor: i32) -> i32 {
        self.call("rc_set_motor_free_spin", |s| {
            with_channel(&mut s.motors, motor, |m| *m = MotorOutput::FreeSpin)
        })
    }

    fn set_motor_free_spin_all(&self) -> i32 {
        self.call("rc_set_motor_free_spin_all", |s| {
            s.motors = [MotorOutput::FreeSpin; MOTOR_COUNT];
            STATUS_OK
        })
    }

    fn set_motor_brake(&self, motor: i32) -> i32 {
        self.call("rc_set_motor_brake", |s| {
            with_channel(&mut s.motors, motor, |m| *m = MotorOutput::Brake)
        })
    }

    fn set_motor_brake_all(&self) -> i32 {
        self.call("rc_set_motor_brake_all", |s| {
            s.motors = [MotorOutput::Brake; MOTOR_COUNT];
            STATUS_OK
        })
    }

    fn get_encoder_pos(&self, channel: i32) -> i32 {
        self.read("rc_get_encoder_pos", |s| {
            index(channel, ENCODER_COUNT).map_or(0, |i| s.encoders[i])
        })
    }

    fn set_encoder_pos(&self, channel: i32, value: i32) -> i32 {
        self.call("rc_set_encoder_pos", |s| {
            with_channel(&mut s.encoders, channel, |e| *e = value)
        })
    }

    fn battery_voltage(&self) -> f32 {
        self.read("rc_battery_voltage", |s| s.battery_voltage)
    }

    fn dc_jack_voltage(&self) -> f32 {
        self.read("rc_dc_jack_voltage", |s| s.dc_jack_voltage)
    }

    fn adc_raw(&self, channel: i32) -> i32 {
        self.call("rc_adc_raw", |s| adc_index(channel).map_or(FAILURE, |i| s.adc_raw[i]))
    }

    fn adc_volt(&self, channel: i32) -> f32 {
        self.read("rc_adc_volt", |s| adc_index(channel).map_or(-1.0, |i| s.adc_volt(i)))
    }

    fn enable_servo_power_rail(&self) -> i32 {
        self.call("rc_enable_servo_power_rail", |s| {
            s.servo_rail = true;
            STATUS_OK
        })
    }

    fn disable_servo_power_rail(&self) -> i32 {
        self.call("rc_disable_servo_power_rail", |s| {
            s.servo_rail = false;
            STATUS_OK
        })
    }

    fn send_servo_pulse_us(&self, channel: i32, us: i32) -> i32 {
        self.call("rc_send_servo_pulse_us", |s| {
            with_channel(&mut s.pulses, channel, |p| *p = Some(Pulse::Microseconds(us)))
        })
    }

    fn send_servo_pulse_us_all(&self, us: i32) -> i32 {
        self.call("rc_send_servo_pulse_us_all", |s| pulse_all(s, Pulse::Microseconds(us)))
    }

    fn send_servo_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        self.call("rc_send_servo_pulse_normalized", |s| {
            with_channel(&mut s.pulses, channel, |p| *p = Some(Pulse::Servo(input)))
        })
    }

    fn send_servo_pulse_normalized_all(&self, input: f32) -> i32 {
        self.call("rc_send_servo_pulse_normalized_all", |s| {
            pulse_all(s, Pulse::Servo(input))
        })
    }

    fn send_esc_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        self.call("rc_send_esc_pulse_normalized", |s| {
            with_channel(&mut s.pulses, channel, |p| *p = Some(Pulse::Esc(input)))
        })
    }

    fn send_esc_pulse_normalized_all(&self, input: f32) -> i32 {
        self.call("rc_send_esc_pulse_normalized_all", |s| pulse_all(s, Pulse::Esc(input)))
    }

    fn send_oneshot_pulse_normalized(&self, channel: i32, input: f32) -> i32 {
        self.call("rc_send_oneshot_pulse_normalized", |s| {
            with_channel(&mut s.pulses, channel, |p| *p = Some(Pulse::Oneshot(input)))
        })
    }

    fn send_oneshot_pulse_normalized_all(&self, input: f32) -> i32 {
        self.call("rc_send_oneshot_pulse_normalized_all", |s| {
            pulse_all(s, Pulse::Oneshot(input))
        })
    }

    fn initialize_dsm(&self) -> i32 {
        self.call("rc_initialize_dsm", |s| {
            s.dsm.running = true;
            STATUS_OK
        })
    }

    fn stop_dsm_service(&self) -> i32 {
        self.call("rc_stop_dsm_service", |s| {
            s.dsm.running = false;
            STATUS_OK
        })
    }

    /// Like the native service, reading a channel consumes the new-data flag.
    fn get_dsm_ch_raw(&self, channel: i32) -> i32 {
        self.call("rc_get_dsm_ch_raw", |s| {
            s.dsm.new_data = false;
            s.dsm.raw(channel.max(0) as usize)
        })
    }

    fn get_dsm_ch_normalized(&self, channel: i32) -> f32 {
        let mut inner = self.inner.lock();
        inner.calls.record("rc_get_dsm_ch_normalized");
        inner.state.dsm.new_data = false;
        let value = inner.state.dsm.normalized(channel.max(0) as usize);
        trace!(native = "rc_get_dsm_ch_normalized", value, "native read");
        value
    }

    fn is_new_dsm_data(&self) -> i32 {
        self.call("rc_is_new_dsm_data", |s| s.dsm.new_data as i32)
    }

    fn is_dsm_active(&self) -> i32 {
        self.call("rc_is_dsm_active", |s| s.dsm.is_active() as i32)
    }

    fn ms_since_last_dsm_packet(&self) -> i32 {
        self.call("rc_ms_since_last_dsm_packet", |s| {
            s.dsm
                .age()
                .map_or(-1, |age| i32::try_from(age.as_millis()).unwrap_or(i32::MAX))
        })
    }

    fn nanos_since_last_dsm_packet(&self) -> u64 {
        self.read("rc_nanos_since_last_dsm_packet", |s| {
            s.dsm
                .age()
                .map_or(u64::MAX, |age| u64::try_from(age.as_nanos()).unwrap_or(u64::MAX - 1))
        })
    }

    fn get_num_dsm_channels(&self) -> i32 {
        self.call("rc_get_num_dsm_channels", |s| s.dsm.channels as i32)
    }

    fn bind_dsm(&self) -> i32 {
        self.call("rc_bind_dsm", |s| {
            s.dsm.bind_requests += 1;
            STATUS_OK
        })
    }

    fn calibrate_dsm_routine(&self) -> i32 {
        self.call("rc_calibrate_dsm_routine", |s| {
            s.dsm.calibrations += 1;
            STATUS_OK
        })
    }

    fn initialize_barometer(&self, oversample: i32, filter: i32) -> i32 {
        self.call("rc_initialize_barometer", |s| {
            let valid = BmpOversample::try_from(oversample as i64).is_ok()
                && BmpFilter::try_from(filter as i64).is_ok();
            if !valid {
                return FAILURE;
            }
            s.barometer.powered = true;
            s.barometer.oversample = oversample;
            s.barometer.filter = filter;
            STATUS_OK
        })
    }

    fn power_off_barometer(&self) -> i32 {
        self.call("rc_power_off_barometer", |s| {
            s.barometer.powered = false;
            STATUS_OK
        })
    }

    fn read_barometer(&self) -> i32 {
        self.call("rc_read_barometer", |s| {
            let baro = &mut s.barometer;
            if !baro.powered {
                return FAILURE;
            }
            baro.temperature_c = baro.ambient_temperature_c;
            baro.pressure_pa = baro.ambient_pressure_pa;
            STATUS_OK
        })
    }

    fn bmp_get_temperature(&self) -> f32 {
        self.read("rc_bmp_get_temperature", |s| s.barometer.temperature_c)
    }

    fn bmp_get_pressure_pa(&self) -> f32 {
        self.read("rc_bmp_get_pressure_pa", |s| s.barometer.pressure_pa)
    }

    fn bmp_get_altitude_m(&self) -> f32 {
        self.read("rc_bmp_get_altitude_m", |s| s.barometer.altitude_m())
    }

    fn set_sea_level_pressure_pa(&self, pa: f32) -> i32 {
        self.call("rc_set_sea_level_pressure_pa", |s| {
            if pa.is_nan() || pa <= 0.0 {
                return FAILURE;
            }
            s.barometer.sea_level_pa = pa;
            STATUS_OK
        })
    }

    fn i2c_init(&self, bus: i32, device: u8) -> i32 {
        self.call("rc_i2c_init", |s| {
            with_channel(&mut s.i2c, bus, |b| {
                b.open = true;
                b.device = device;
            })
        })
    }

    fn i2c_close(&self, bus: i32) -> i32 {
        self.call("rc_i2c_close", |s| {
            with_channel(&mut s.i2c, bus, |b| {
                b.open = false;
                b.claimed = false;
            })
        })
    }

    fn i2c_set_device_address(&self, bus: i32, device: u8) -> i32 {
        self.call("rc_i2c_set_device_address", |s| match s.open_bus_mut(bus) {
            Some(b) => {
                b.device = device;
                STATUS_OK
            }
            None => FAILURE,
        })
    }

    fn i2c_claim_bus(&self, bus: i32) -> i32 {
        self.call("rc_i2c_claim_bus", |s| with_channel(&mut s.i2c, bus, |b| b.claimed = true))
    }

    fn i2c_release_bus(&self, bus: i32) -> i32 {
        self.call("rc_i2c_release_bus", |s| {
            with_channel(&mut s.i2c, bus, |b| b.claimed = false)
        })
    }

    fn i2c_get_in_use_state(&self, bus: i32) -> i32 {
        self.call("rc_i2c_get_in_use_state", |s| {
            index(bus, I2C_BUS_COUNT).map_or(FAILURE, |i| s.i2c[i].claimed as i32)
        })
    }

    fn i2c_read_byte(&self, bus: i32, register: u8, data: &mut u8) -> i32 {
        self.call("rc_i2c_read_byte", |s| {
            match s.open_bus(bus).and_then(|b| b.read(register, 1)) {
                Some(bytes) => {
                    *data = bytes[0];
                    STATUS_OK
                }
                None => FAILURE,
            }
        })
    }

    fn i2c_read_bytes(&self, bus: i32, register: u8, data: &mut [u8]) -> i32 {
        self.call("rc_i2c_read_bytes", |s| {
            match s.open_bus(bus).and_then(|b| b.read(register, data.len())) {
                Some(bytes) => {
                    data.copy_from_slice(&bytes);
                    STATUS_OK
                }
                None => FAILURE,
            }
        })
    }

    fn i2c_read_word(&self, bus: i32, register: u8, data: &mut u16) -> i32 {
        self.call("rc_i2c_read_word", |s| {
            match s.open_bus(bus).and_then(|b| b.read(register, 2)) {
                Some(bytes) => {
                    *data = u16::from_be_bytes([bytes[0], bytes[1]]);
                    STATUS_OK
                }
                None => FAILURE,
            }
        })
    }

    fn i2c_read_bit(&self, bus: i32, register: u8, bit: u8, data: &mut u8) -> i32 {
        self.call("rc_i2c_read_bit", |s| {
            if bit > 7 {
                return FAILURE;
            }
            match s.open_bus(bus).and_then(|b| b.read(register, 1)) {
                Some(bytes) => {
                    *data = (bytes[0] >> bit) & 1;
                    STATUS_OK
                }
                None => FAILURE,
            }
        })
    }

    fn i2c_send_byte(&self, bus: i32, data: u8) -> i32 {
        self.call("rc_i2c_send_byte", |s| match s.open_bus_mut(bus) {
            Some(b) => {
                b.sent.push(data);
                STATUS_OK
            }
            None => FAILURE,
        })
    }

    fn i2c_send_bytes(&self, bus: i32, data: &[u8]) -> i32 {
        self.call("rc_i2c_send_bytes", |s| match s.open_bus_mut(bus) {
            Some(b) => {
                b.sent.extend_from_slice(data);
                STATUS_OK
            }
            None => FAILURE,
        })
    }

    fn i2c_read_words(&self, bus: i32, register: u8, data: &mut [u16]) -> i32 {
        self.call("rc_i2c_read_words", |s| {
            match s.open_bus(bus).and_then(|b| b.read(register, data.len() * 2)) {
                Some(bytes) => {
                    for (word, pair) in data.iter_mut().zip(bytes.chunks_exact(2)) {
                        *word = u16::from_be_bytes([pair[0], pair[1]]);
                    }
                    STATUS_OK
                }
                None => FAILURE,
            }
        })
    }

    fn i2c_write_byte(&self, bus: i32, register: u8, data: u8) -> i32 {
        self.call("rc_i2c_write_byte", |s| {
            match s.open_bus_mut(bus).map(|b| b.write(register, &[data])) {
                Some(true) => STATUS_OK,
                _ => FAILURE,
            }
        })
    }

    fn i2c_write_bytes(&self, bus: i32, register: u8, data: &[u8]) -> i32 {
        self.call("rc_i2c_write_bytes", |s| {
            match s.open_bus_mut(bus).map(|b| b.write(register, data)) {
                Some(true) => STATUS_OK,
                _ => FAILURE,
            }
        })
    }

    fn i2c_write_word(&self, bus: i32, register: u8, data: u16) -> i32 {
        self.call("rc_i2c_write_word", |s| {
            match s.open_bus_mut(bus).map(|b| b.write(register, &data.to_be_bytes())) {
                Some(true) => STATUS_OK,
                _ => FAILURE,
            }
        })
    }

    fn i2c_write_words(&self, bus: i32, register: u8, data: &[u16]) -> i32 {
        let bytes: Vec<u8> = data.iter().flat_map(|w| w.to_be_bytes()).collect();
        self.call("rc_i2c_write_words", |s| {
            match s.open_bus_mut(bus).map(|b| b.write(register, &bytes)) {
                Some(true) => STATUS_OK,
                _ => FAILURE,
            }
        })
    }

    fn i2c_write_bit(&self, bus: i32, register: u8, bit: u8, data: u8) -> i32 {
        self.call("rc_i2c_write_bit", |s| {
            if bit > 7 {
                return FAILURE;
            }
            let Some(b) = s.open_bus_mut(bus) else {
                return FAILURE;
            };
            let file = b.file_mut();
            let mask = 1u8 << bit;
            let reg = &mut file[register as usize];
            *reg = if data != 0 { *reg | mask } else { *reg & !mask };
            STATUS_OK
        })
    }

    fn set_cpu_freq(&self, freq: i32) -> i32 {
        self.call("rc_set_cpu_freq", |s| match CpuFreq::try_from(freq as i64) {
            Ok(freq) => {
                s.cpu_freq = freq.code();
                STATUS_OK
            }
            Err(_) => FAILURE,
        })
    }

    fn get_cpu_freq(&self) -> i32 {
        self.call("rc_get_cpu_freq", |s| s.cpu_freq)
    }

    fn get_bb_model(&self) -> i32 {
        self.call("rc_get_bb_model", |s| s.board_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcape_common::cape::driver::NOT_IMPLEMENTED;

    fn driver() -> SimulationDriver {
        SimulationDriver::new(&SimulationConfig::default())
    }

    #[test]
    fn clones_share_the_board() {
        let a = driver();
        let b = a.clone();
        assert_eq!(a.set_motor(2, 0.25), STATUS_OK);
        assert_eq!(b.snapshot().motors[1], MotorOutput::Duty(0.25));
        assert_eq!(b.call_count("rc_set_motor"), 1);
    }

    #[test]
    fn call_log_stays_bounded() {
        let d = driver();
        let n = CALL_LOG_CAPACITY * 3 + 7;
        for _ in 0..n {
            d.get_encoder_pos(1);
        }
        d.battery_voltage();

        let recent = d.native_calls();
        assert_eq!(recent.len(), CALL_LOG_CAPACITY);
        assert_eq!(recent.last(), Some(&"rc_battery_voltage"));
        assert_eq!(d.call_count("rc_get_encoder_pos"), n);
        assert_eq!(d.total_calls(), n + 1);

        d.clear_calls();
        assert!(d.native_calls().is_empty());
        assert_eq!(d.call_count("rc_get_encoder_pos"), 0);
        assert_eq!(d.total_calls(), 0);
    }

    #[test]
    fn injected_fault_fires_once() {
        let d = driver();
        d.inject_fault("rc_set_motor", -5);
        assert_eq!(d.set_motor(1, 0.5), -5);
        assert_eq!(d.snapshot().motors[0], MotorOutput::FreeSpin);
        assert_eq!(d.set_motor(1, 0.5), STATUS_OK);
    }

    #[test]
    fn led_state_reads_back_through_gpio() {
        let d = driver();
        d.set_led(Led::Red.code(), 1);
        assert_eq!(d.gpio_read_mmap(RED_LED_GPIO), 1);
        assert_eq!(d.gpio_read_mmap(GREEN_LED_GPIO), 0);
        assert_eq!(d.gpio_read_mmap(12), FAILURE);
    }

    #[test]
    fn i2c_needs_an_open_bus() {
        let d = driver();
        let mut byte = 0;
        assert_eq!(d.i2c_read_byte(1, 0x00, &mut byte), FAILURE);
        assert_eq!(d.i2c_send_byte(1, 0xAB), FAILURE);

        assert_eq!(d.i2c_init(1, 0x68), STATUS_OK);
        assert!(d.load_registers(1, 0x68, 0x75, &[0x71]));
        assert_eq!(d.i2c_read_byte(1, 0x75, &mut byte), STATUS_OK);
        assert_eq!(byte, 0x71);
    }

    #[test]
    fn words_are_big_endian() {
        let d = driver();
        d.i2c_init(2, 0x40);
        assert_eq!(d.i2c_write_words(2, 0x10, &[0x1234, 0xABCD]), STATUS_OK);
        let mut bytes = [0u8; 4];
        assert_eq!(d.i2c_read_bytes(2, 0x10, &mut bytes), STATUS_OK);
        assert_eq!(bytes, [0x12, 0x34, 0xAB, 0xCD]);

        let mut word = 0;
        assert_eq!(d.i2c_read_word(2, 0x12, &mut word), STATUS_OK);
        assert_eq!(word, 0xABCD);
    }

    #[test]
    fn bit_access_is_limited_to_one_byte() {
        let d = driver();
        d.i2c_init(1, 0x20);
        assert_eq!(d.i2c_write_bit(1, 0x01, 3, 1), STATUS_OK);
        let mut bit = 0;
        assert_eq!(d.i2c_read_bit(1, 0x01, 3, &mut bit), STATUS_OK);
        assert_eq!(bit, 1);
        assert_eq!(d.i2c_read_bit(1, 0x01, 9, &mut bit), FAILURE);
    }

    #[test]
    fn barometer_samples_only_when_powered() {
        let d = driver();
        assert_eq!(d.read_barometer(), FAILURE);
        assert_eq!(d.initialize_barometer(16, 4), STATUS_OK);
        d.set_ambient(25.0, 95_000.0);
        assert_eq!(d.read_barometer(), STATUS_OK);
        assert_eq!(d.bmp_get_temperature(), 25.0);
        assert_eq!(d.bmp_get_pressure_pa(), 95_000.0);
        assert!(d.bmp_get_altitude_m() > 500.0);
        assert_eq!(d.initialize_barometer(6, 4), FAILURE);
    }

    #[test]
    fn dsm_frames_need_a_running_service() {
        let d = driver();
        assert!(!d.push_dsm_frame(&[1500; 6]));
        assert_eq!(d.ms_since_last_dsm_packet(), -1);
        assert_eq!(d.nanos_since_last_dsm_packet(), u64::MAX);

        d.initialize_dsm();
        assert!(d.push_dsm_frame(&[1500, 1800, 1200, 1500, 1500, 1500]));
        assert_eq!(d.is_new_dsm_data(), 1);
        assert_eq!(d.is_dsm_active(), 1);
        assert_eq!(d.get_num_dsm_channels(), 6);
        assert_eq!(d.get_dsm_ch_raw(2), 1800);
        assert_eq!(d.is_new_dsm_data(), 0);
        assert!((d.get_dsm_ch_normalized(3) + 0.5).abs() < 1e-6);
        assert!(d.ms_since_last_dsm_packet() >= 0);
    }

    #[test]
    fn cleanup_releases_outputs() {
        let d = driver();
        d.initialize();
        d.enable_motors();
        d.enable_servo_power_rail();
        d.i2c_init(1, 0x68);
        d.cleanup();
        let s = d.snapshot();
        assert!(!s.initialized && !s.motors_enabled && !s.servo_rail && !s.i2c[0].open);
    }

    #[test]
    fn every_entry_point_is_provided() {
        let d = driver();
        d.i2c_init(1, 0x68);
        let mut words = [0u16; 2];
        assert_ne!(d.i2c_read_words(1, 0, &mut words), NOT_IMPLEMENTED);
        assert_ne!(d.i2c_write_byte(1, 0, 1), NOT_IMPLEMENTED);
        assert_ne!(d.i2c_write_word(1, 0, 1), NOT_IMPLEMENTED);
    }
}
