//! Simulated board state.
//!
//! Plain data plus the arithmetic the board would do (ADC scaling,
//! barometric altitude, register-file addressing). Everything here is
//! synchronous and lock-free; `SimulationDriver` owns the locking.

use rcape_common::cape::config::SimulationConfig;
use rcape_common::cape::types::RobotState;
use rcape_common::consts::{
    ADC_COUNT, ADC_FULL_SCALE, ADC_REFERENCE_V, DSM_MAX_CHANNELS, ENCODER_COUNT, I2C_BUS_COUNT,
    MOTOR_COUNT, SERVO_COUNT, STANDARD_SEA_LEVEL_PA,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A DSM service counts as active while packets are younger than this.
pub const DSM_ACTIVE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pulse width a centered DSM stick reports.
pub const DSM_CENTER_US: i32 = 1500;

/// Pulse width deviation mapped to a normalized value of 1.0.
pub const DSM_HALF_RANGE_US: f32 = 600.0;

/// Size of one simulated I2C register file.
pub const REGISTER_FILE_SIZE: usize = 256;

/// Status the simulated library returns on failure.
pub const FAILURE: i32 = -1;

/// What a motor channel is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MotorOutput {
    /// Driven with a signed duty cycle.
    Duty(f32),
    /// Coasting.
    #[default]
    FreeSpin,
    /// Windings shorted.
    Brake,
}

/// Last pulse emitted on a servo/ESC channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pulse {
    Microseconds(i32),
    Servo(f32),
    Esc(f32),
    Oneshot(f32),
}

/// Simulated DSM receiver service.
#[derive(Debug, Clone, PartialEq)]
pub struct DsmState {
    pub running: bool,
    /// Channels the simulated transmitter sends.
    pub transmitter_channels: usize,
    /// Channels seen in the last frame (0 before the first frame).
    pub channels: usize,
    pub raw: [i32; DSM_MAX_CHANNELS],
    pub new_data: bool,
    pub last_packet: Option<Instant>,
    pub bind_requests: u32,
    pub calibrations: u32,
}

impl DsmState {
    fn new(transmitter_channels: usize) -> Self {
        Self {
            running: false,
            transmitter_channels,
            channels: 0,
            raw: [0; DSM_MAX_CHANNELS],
            new_data: false,
            last_packet: None,
            bind_requests: 0,
            calibrations: 0,
        }
    }

    /// Raw pulse width of a 1-based channel, 0 if the channel was not sent.
    pub fn raw(&self, channel: usize) -> i32 {
        if channel == 0 || channel > self.channels {
            return 0;
        }
        self.raw[channel - 1]
    }

    /// Channel value scaled around the stick center.
    pub fn normalized(&self, channel: usize) -> f32 {
        match self.raw(channel) {
            0 => 0.0,
            raw => (raw - DSM_CENTER_US) as f32 / DSM_HALF_RANGE_US,
        }
    }

    /// Time since the last packet, if any arrived.
    pub fn age(&self) -> Option<Duration> {
        self.last_packet.map(|at| at.elapsed())
    }

    pub fn is_active(&self) -> bool {
        self.running && self.age().is_some_and(|age| age < DSM_ACTIVE_TIMEOUT)
    }

    /// Store one decoded frame. Values past the transmitter's channel count
    /// are dropped.
    pub fn push_frame(&mut self, raw: &[i32]) {
        let n = raw.len().min(self.transmitter_channels);
        self.raw = [0; DSM_MAX_CHANNELS];
        self.raw[..n].copy_from_slice(&raw[..n]);
        self.channels = n;
        self.new_data = true;
        self.last_packet = Some(Instant::now());
    }
}

/// Simulated BMP280.
#[derive(Debug, Clone, PartialEq)]
pub struct BarometerState {
    pub powered: bool,
    pub oversample: i32,
    pub filter: i32,
    /// Conditions the sensor will measure on the next read.
    pub ambient_temperature_c: f32,
    pub ambient_pressure_pa: f32,
    /// Last sampled values.
    pub temperature_c: f32,
    pub pressure_pa: f32,
    pub sea_level_pa: f32,
}

impl BarometerState {
    fn new(temperature_c: f32, pressure_pa: f32) -> Self {
        Self {
            powered: false,
            oversample: 0,
            filter: 0,
            ambient_temperature_c: temperature_c,
            ambient_pressure_pa: pressure_pa,
            temperature_c: 0.0,
            pressure_pa: 0.0,
            sea_level_pa: STANDARD_SEA_LEVEL_PA as f32,
        }
    }

    /// Altitude from the last sampled pressure (international barometric
    /// formula).
    pub fn altitude_m(&self) -> f32 {
        if self.pressure_pa <= 0.0 {
            return 0.0;
        }
        44330.0 * (1.0 - (self.pressure_pa / self.sea_level_pa).powf(1.0 / 5.255))
    }
}

/// Simulated I2C bus with one register file per device address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct I2cBusState {
    pub open: bool,
    pub device: u8,
    pub claimed: bool,
    pub registers: HashMap<u8, Vec<u8>>,
    /// Raw bytes sent without a register address.
    pub sent: Vec<u8>,
}

impl I2cBusState {
    /// Register file of the selected device, created zeroed on first use.
    pub fn file_mut(&mut self) -> &mut Vec<u8> {
        self.registers
            .entry(self.device)
            .or_insert_with(|| vec![0; REGISTER_FILE_SIZE])
    }

    /// `len` registers starting at `start` of the selected device, or
    /// `None` if the range runs past the register file.
    pub fn read(&self, start: u8, len: usize) -> Option<Vec<u8>> {
        let start = start as usize;
        if start + len > REGISTER_FILE_SIZE {
            return None;
        }
        Some(match self.registers.get(&self.device) {
            Some(file) => file[start..start + len].to_vec(),
            None => vec![0; len],
        })
    }

    /// Write `data` starting at `start`. Fails if it runs past the file.
    pub fn write(&mut self, start: u8, data: &[u8]) -> bool {
        let start = start as usize;
        if start + data.len() > REGISTER_FILE_SIZE {
            return false;
        }
        self.file_mut()[start..start + data.len()].copy_from_slice(data);
        true
    }
}

/// Complete simulated board.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub initialized: bool,
    pub robot_state: i32,
    pub leds: [i32; 2],
    pub buttons: [i32; 2],
    pub motors_enabled: bool,
    pub motors: [MotorOutput; MOTOR_COUNT],
    pub encoders: [i32; ENCODER_COUNT],
    pub battery_voltage: f32,
    pub dc_jack_voltage: f32,
    pub adc_raw: [i32; ADC_COUNT],
    pub servo_rail: bool,
    pub pulses: [Option<Pulse>; SERVO_COUNT],
    pub dsm: DsmState,
    pub barometer: BarometerState,
    pub i2c: [I2cBusState; I2C_BUS_COUNT],
    pub cpu_freq: i32,
    pub board_model: i32,
}

impl SimState {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            initialized: false,
            robot_state: RobotState::default().code(),
            leds: [0; 2],
            buttons: [0; 2],
            motors_enabled: false,
            motors: [MotorOutput::default(); MOTOR_COUNT],
            encoders: [0; ENCODER_COUNT],
            battery_voltage: config.battery_voltage,
            dc_jack_voltage: config.dc_jack_voltage,
            adc_raw: config.adc_raw,
            servo_rail: false,
            pulses: [None; SERVO_COUNT],
            dsm: DsmState::new(config.dsm_channels.max(0) as usize),
            barometer: BarometerState::new(config.temperature_c, config.pressure_pa),
            i2c: Default::default(),
            cpu_freq: 0,
            board_model: config.board_model,
        }
    }

    /// ADC count converted to volts.
    pub fn adc_volt(&self, channel: usize) -> f32 {
        self.adc_raw[channel] as f32 * ADC_REFERENCE_V / ADC_FULL_SCALE as f32
    }

    /// Bus by native number (1-based), only if open.
    pub fn open_bus(&self, bus: i32) -> Option<&I2cBusState> {
        let bus = &self.i2c[index(bus, I2C_BUS_COUNT)?];
        bus.open.then_some(bus)
    }

    /// Mutable bus by native number (1-based), only if open.
    pub fn open_bus_mut(&mut self, bus: i32) -> Option<&mut I2cBusState> {
        let bus = &mut self.i2c[index(bus, I2C_BUS_COUNT)?];
        bus.open.then_some(bus)
    }

    /// Return to the power-on state of everything `cleanup` releases.
    pub fn release_hardware(&mut self) {
        self.initialized = false;
        self.motors_enabled = false;
        self.motors = [MotorOutput::default(); MOTOR_COUNT];
        self.servo_rail = false;
        self.leds = [0; 2];
        self.dsm.running = false;
        self.barometer.powered = false;
        for bus in &mut self.i2c {
            bus.open = false;
            bus.claimed = false;
        }
    }
}

/// Zero-based index of a 1-based channel, if it is in `1..=count`.
pub fn index(channel: i32, count: usize) -> Option<usize> {
    usize::try_from(channel)
        .ok()
        .filter(|c| (1..=count).contains(c))
        .map(|c| c - 1)
}
