//! The operation table.
//!
//! One [`OperationSpec`] per native entry point, indexed by [`Op`]. Adding
//! an operation means adding a variant, a table row (in variant order) and
//! a dispatch arm.

use crate::operation::{OperationSpec, ParamSpec, ResultKind};
use rcape_common::consts::*;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Dispatch key, one per operation. Discriminants index [`OPERATIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Initialize,
    Cleanup,
    GetState,
    SetState,
    GetLed,
    SetLed,
    BlinkLed,
    GetButton,
    EnableMotors,
    DisableMotors,
    SetMotor,
    SetMotorAll,
    SetMotorFreeSpin,
    SetMotorFreeSpinAll,
    SetMotorBrake,
    SetMotorBrakeAll,
    GetEncoderPos,
    SetEncoderPos,
    BatteryVoltage,
    DcJackVoltage,
    AdcRaw,
    AdcVolt,
    EnableServoPowerRail,
    DisableServoPowerRail,
    SendServoPulseUs,
    SendServoPulseUsAll,
    SendServoPulseNormalized,
    SendServoPulseNormalizedAll,
    SendEscPulseNormalized,
    SendEscPulseNormalizedAll,
    SendOneshotPulseNormalized,
    SendOneshotPulseNormalizedAll,
    InitializeDsm,
    StopDsmService,
    GetDsmChRaw,
    GetDsmChNormalized,
    IsNewDsmData,
    IsDsmActive,
    MsSinceLastDsmPacket,
    NanosSinceLastDsmPacket,
    GetNumDsmChannels,
    BindDsm,
    CalibrateDsmRoutine,
    InitializeBarometer,
    PowerOffBarometer,
    ReadBarometer,
    BmpGetTemperature,
    BmpGetPressurePa,
    BmpGetAltitudeM,
    SetSeaLevelPressurePa,
    I2cInit,
    I2cClose,
    I2cSetDeviceAddress,
    I2cClaimBus,
    I2cReleaseBus,
    I2cGetInUseState,
    I2cReadByte,
    I2cReadBytes,
    I2cReadWord,
    I2cReadWords,
    I2cReadBit,
    I2cWriteByte,
    I2cWriteBytes,
    I2cWriteWord,
    I2cWriteWords,
    I2cWriteBit,
    I2cSendByte,
    I2cSendBytes,
    SetCpuFreq,
    GetCpuFreq,
    GetBbModel,
}

impl Op {
    /// Static descriptor for this operation.
    #[inline]
    pub fn spec(self) -> &'static OperationSpec {
        &OPERATIONS[self as usize]
    }

    /// Caller-facing name.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up an operation by name, with or without the native `rc_` prefix.
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix(NATIVE_PREFIX).unwrap_or(name);
        BY_NAME.get(bare).copied()
    }

    /// Iterate over all operations in table order.
    pub fn all() -> impl Iterator<Item = Op> {
        OPERATIONS.iter().map(|spec| spec.op)
    }
}

static BY_NAME: LazyLock<HashMap<&'static str, Op>> =
    LazyLock::new(|| OPERATIONS.iter().map(|spec| (spec.name, spec.op)).collect());

// ─── Parameter descriptors ──────────────────────────────────────────

const NONE: &[ParamSpec] = &[];

const STATE: ParamSpec = ParamSpec::int("state", 0, STATE_MAX);
const LED: ParamSpec = ParamSpec::one_of("led", &[0, 1]);
const LED_LEVEL: ParamSpec = ParamSpec::one_of("state", &[0, 1]);
const HZ: ParamSpec = ParamSpec::positive("hz");
const PERIOD: ParamSpec = ParamSpec::positive("period");
const BUTTON: ParamSpec = ParamSpec::one_of("button", &[0, 1]);

const MOTOR: ParamSpec = ParamSpec::int("motor", MOTOR_MIN, MOTOR_MAX);
const DUTY: ParamSpec = ParamSpec::float("duty", DUTY_MIN, DUTY_MAX);

const ENCODER: ParamSpec = ParamSpec::int("channel", ENCODER_MIN, ENCODER_MAX);
const POSITION: ParamSpec = ParamSpec::native_int("position");

const ADC: ParamSpec = ParamSpec::int("channel", ADC_MIN, ADC_MAX);

const SERVO: ParamSpec = ParamSpec::int("channel", SERVO_MIN, SERVO_MAX);
const PULSE_US: ParamSpec = ParamSpec::native_int("us");
const SERVO_INPUT: ParamSpec =
    ParamSpec::float("input", SERVO_NORMALIZED_MIN, SERVO_NORMALIZED_MAX);
const ESC_INPUT: ParamSpec = ParamSpec::float("input", ESC_NORMALIZED_MIN, ESC_NORMALIZED_MAX);

const DSM: ParamSpec = ParamSpec::int("channel", DSM_MIN, DSM_MAX);

const OVERSAMPLE: ParamSpec = ParamSpec::multiple_of(
    "oversample",
    BMP_CODE_STEP,
    BMP_OVERSAMPLE_MIN,
    BMP_OVERSAMPLE_MAX,
);
const FILTER: ParamSpec =
    ParamSpec::multiple_of("filter", BMP_CODE_STEP, BMP_FILTER_MIN, BMP_FILTER_MAX);
const SEA_LEVEL: ParamSpec = ParamSpec::float("pa", SEA_LEVEL_PA_MIN, SEA_LEVEL_PA_MAX);

const BUS: ParamSpec = ParamSpec::int("bus", I2C_BUS_MIN, I2C_BUS_MAX);
const DEVICE: ParamSpec = ParamSpec::int("device", I2C_DEVICE_MIN, I2C_DEVICE_MAX);
const REGISTER: ParamSpec = ParamSpec::int("register", I2C_REGISTER_MIN, I2C_REGISTER_MAX);
const BIT: ParamSpec = ParamSpec::int("bit", 0, I2C_BIT_MAX);
const BYTE_COUNT: ParamSpec = ParamSpec::int("length", 1, I2C_MAX_BYTES as i64);
const WORD_COUNT: ParamSpec = ParamSpec::int("length", 1, I2C_MAX_WORDS as i64);
const BYTE: ParamSpec = ParamSpec::int("data", 0, u8::MAX as i64);
const WORD: ParamSpec = ParamSpec::int("data", 0, u16::MAX as i64);
const BIT_VALUE: ParamSpec = ParamSpec::one_of("data", &[0, 1]);
const BYTES: ParamSpec = ParamSpec::bytes("data", I2C_MAX_BYTES);
const WORDS: ParamSpec = ParamSpec::words("data", I2C_MAX_WORDS);

const CPU_FREQ: ParamSpec = ParamSpec::int("freq", 0, CPU_FREQ_MAX);

/// Builds a table row.
macro_rules! row {
    ($op:ident, $name:literal, $native:literal, [$($param:expr),*], $result:ident, $summary:literal) => {
        OperationSpec {
            op: Op::$op,
            name: $name,
            native: $native,
            params: &[$($param),*],
            result: ResultKind::$result,
            summary: $summary,
        }
    };
}

/// Every operation, in [`Op`] discriminant order.
#[rustfmt::skip]
pub static OPERATIONS: &[OperationSpec] = &[
    // Lifecycle and program state
    row!(Initialize, "initialize", "rc_initialize", [], Status, "Initialize cape hardware and software."),
    row!(Cleanup, "cleanup", "rc_cleanup", [], Status, "Shut down the cape library and release hardware."),
    row!(GetState, "get_state", "rc_get_state", [], Int, "Get the high-level robot state (0-3)."),
    row!(SetState, "set_state", "rc_set_state", [STATE], Status, "Set the high-level robot state (0-3)."),
    // LEDs and buttons
    row!(GetLed, "get_led", "rc_gpio_get_value_mmap", [LED], Flag, "Get green (0) or red (1) LED level via memory-mapped GPIO."),
    row!(SetLed, "set_led", "rc_set_led", [LED, LED_LEVEL], Status, "Turn the green (0) or red (1) LED off (0) or on (1)."),
    row!(BlinkLed, "blink_led", "rc_blink_led", [LED, HZ, PERIOD], Status, "Blink an LED at hz for period seconds."),
    row!(GetButton, "get_button", "rc_get_pause_button|rc_get_mode_button", [BUTTON], Flag, "Get pause (0) or mode (1) button level (1 = pressed)."),
    // Motors
    row!(EnableMotors, "enable_motors", "rc_enable_motors", [], Status, "Enable the motor drivers."),
    row!(DisableMotors, "disable_motors", "rc_disable_motors", [], Status, "Disable the motor drivers."),
    row!(SetMotor, "set_motor", "rc_set_motor", [MOTOR, DUTY], Status, "Set direction and power of one motor."),
    row!(SetMotorAll, "set_motor_all", "rc_set_motor_all", [DUTY], Status, "Set direction and power of all motors."),
    row!(SetMotorFreeSpin, "set_motor_free_spin", "rc_set_motor_free_spin", [MOTOR], Status, "Let one motor spin freely."),
    row!(SetMotorFreeSpinAll, "set_motor_free_spin_all", "rc_set_motor_free_spin_all", [], Status, "Let all motors spin freely."),
    row!(SetMotorBrake, "set_motor_brake", "rc_set_motor_brake", [MOTOR], Status, "Brake one motor."),
    row!(SetMotorBrakeAll, "set_motor_brake_all", "rc_set_motor_brake_all", [], Status, "Brake all motors."),
    // Encoders
    row!(GetEncoderPos, "get_encoder_pos", "rc_get_encoder_pos", [ENCODER], Int, "Get quadrature encoder position (channel 1-4)."),
    row!(SetEncoderPos, "set_encoder_pos", "rc_set_encoder_pos", [ENCODER, POSITION], Status, "Set quadrature encoder position (channel 1-4)."),
    // Analog
    row!(BatteryVoltage, "battery_voltage", "rc_battery_voltage", [], Float, "Get LiPo battery voltage."),
    row!(DcJackVoltage, "dc_jack_voltage", "rc_dc_jack_voltage", [], Float, "Get DC jack voltage."),
    row!(AdcRaw, "adc_raw", "rc_adc_raw", [ADC], Int, "Get raw ADC count (channel 0-6)."),
    row!(AdcVolt, "adc_volt", "rc_adc_volt", [ADC], Float, "Get ADC voltage (channel 0-6)."),
    // Servo / ESC
    row!(EnableServoPowerRail, "enable_servo_power_rail", "rc_enable_servo_power_rail", [], Status, "Enable the 6V servo power rail."),
    row!(DisableServoPowerRail, "disable_servo_power_rail", "rc_disable_servo_power_rail", [], Status, "Disable the 6V servo power rail."),
    row!(SendServoPulseUs, "send_servo_pulse_us", "rc_send_servo_pulse_us", [SERVO, PULSE_US], Status, "Send one pulse of us microseconds to a servo channel."),
    row!(SendServoPulseUsAll, "send_servo_pulse_us_all", "rc_send_servo_pulse_us_all", [PULSE_US], Status, "Send one pulse of us microseconds to all servo channels."),
    row!(SendServoPulseNormalized, "send_servo_pulse_normalized", "rc_send_servo_pulse_normalized", [SERVO, SERVO_INPUT], Status, "Send a normalized pulse (-1.5 ~ 1.5) to a servo channel."),
    row!(SendServoPulseNormalizedAll, "send_servo_pulse_normalized_all", "rc_send_servo_pulse_normalized_all", [SERVO_INPUT], Status, "Send a normalized pulse (-1.5 ~ 1.5) to all servo channels."),
    row!(SendEscPulseNormalized, "send_esc_pulse_normalized", "rc_send_esc_pulse_normalized", [SERVO, ESC_INPUT], Status, "Send a normalized pulse (-0.1 ~ 1.0) to an ESC channel."),
    row!(SendEscPulseNormalizedAll, "send_esc_pulse_normalized_all", "rc_send_esc_pulse_normalized_all", [ESC_INPUT], Status, "Send a normalized pulse (-0.1 ~ 1.0) to all ESC channels."),
    row!(SendOneshotPulseNormalized, "send_oneshot_pulse_normalized", "rc_send_oneshot_pulse_normalized", [SERVO, ESC_INPUT], Status, "Send a normalized oneshot pulse (-0.1 ~ 1.0) to an ESC channel."),
    row!(SendOneshotPulseNormalizedAll, "send_oneshot_pulse_normalized_all", "rc_send_oneshot_pulse_normalized_all", [ESC_INPUT], Status, "Send a normalized oneshot pulse (-0.1 ~ 1.0) to all ESC channels."),
    // DSM radio
    row!(InitializeDsm, "initialize_dsm", "rc_initialize_dsm", [], Status, "Start the background DSM receiver service."),
    row!(StopDsmService, "stop_dsm_service", "rc_stop_dsm_service", [], Status, "Stop the DSM receiver service."),
    row!(GetDsmChRaw, "get_dsm_ch_raw", "rc_get_dsm_ch_raw", [DSM], Int, "Get raw pulse width of a DSM channel (1-9)."),
    row!(GetDsmChNormalized, "get_dsm_ch_normalized", "rc_get_dsm_ch_normalized", [DSM], Float, "Get normalized value of a DSM channel (1-9)."),
    row!(IsNewDsmData, "is_new_dsm_data", "rc_is_new_dsm_data", [], Flag, "Check whether new DSM data arrived."),
    row!(IsDsmActive, "is_dsm_active", "rc_is_dsm_active", [], Flag, "Check whether DSM packets are arriving."),
    row!(MsSinceLastDsmPacket, "ms_since_last_dsm_packet", "rc_ms_since_last_dsm_packet", [], Duration, "Milliseconds since the last DSM packet (-1 if none)."),
    row!(NanosSinceLastDsmPacket, "nanos_since_last_dsm_packet", "rc_nanos_since_last_dsm_packet", [], Duration, "Nanoseconds since the last DSM packet."),
    row!(GetNumDsmChannels, "get_num_dsm_channels", "rc_get_num_dsm_channels", [], Int, "Number of channels sent by the transmitter."),
    row!(BindDsm, "bind_dsm", "rc_bind_dsm", [], Status, "Put the DSM receiver into bind mode."),
    row!(CalibrateDsmRoutine, "calibrate_dsm_routine", "rc_calibrate_dsm_routine", [], Status, "Run the DSM calibration routine."),
    // Barometer
    row!(InitializeBarometer, "initialize_barometer", "rc_initialize_barometer", [OVERSAMPLE, FILTER], Status, "Power up the barometer (oversample 4-20, filter 0-16, multiples of 4)."),
    row!(PowerOffBarometer, "power_off_barometer", "rc_power_off_barometer", [], Status, "Put the barometer to sleep."),
    row!(ReadBarometer, "read_barometer", "rc_read_barometer", [], Status, "Sample temperature and pressure."),
    row!(BmpGetTemperature, "bmp_get_temperature", "rc_bmp_get_temperature", [], Float, "Last temperature reading in degrees C."),
    row!(BmpGetPressurePa, "bmp_get_pressure_pa", "rc_bmp_get_pressure_pa", [], Float, "Last pressure reading in Pa."),
    row!(BmpGetAltitudeM, "bmp_get_altitude_m", "rc_bmp_get_altitude_m", [], Float, "Altitude in m relative to the sea-level reference."),
    row!(SetSeaLevelPressurePa, "set_sea_level_pressure_pa", "rc_set_sea_level_pressure_pa", [SEA_LEVEL], Status, "Set sea-level reference pressure (80000-120000 Pa)."),
    // I2C
    row!(I2cInit, "i2c_init", "rc_i2c_init", [BUS, DEVICE], Status, "Open an I2C bus and select a device."),
    row!(I2cClose, "i2c_close", "rc_i2c_close", [BUS], Status, "Close an I2C bus."),
    row!(I2cSetDeviceAddress, "i2c_set_device_address", "rc_i2c_set_device_address", [BUS, DEVICE], Status, "Select another device on an open bus."),
    row!(I2cClaimBus, "i2c_claim_bus", "rc_i2c_claim_bus", [BUS], Status, "Claim an I2C bus."),
    row!(I2cReleaseBus, "i2c_release_bus", "rc_i2c_release_bus", [BUS], Status, "Release a claimed I2C bus."),
    row!(I2cGetInUseState, "i2c_get_in_use_state", "rc_i2c_get_in_use_state", [BUS], Flag, "Check whether an I2C bus is claimed."),
    row!(I2cReadByte, "i2c_read_byte", "rc_i2c_read_byte", [BUS, REGISTER], Int, "Read one register byte."),
    row!(I2cReadBytes, "i2c_read_bytes", "rc_i2c_read_bytes", [BUS, REGISTER, BYTE_COUNT], Bytes, "Read consecutive register bytes (1-128)."),
    row!(I2cReadWord, "i2c_read_word", "rc_i2c_read_word", [BUS, REGISTER], Int, "Read one 16-bit register."),
    row!(I2cReadWords, "i2c_read_words", "rc_i2c_read_words", [BUS, REGISTER, WORD_COUNT], Words, "Read consecutive 16-bit registers (1-64)."),
    row!(I2cReadBit, "i2c_read_bit", "rc_i2c_read_bit", [BUS, REGISTER, BIT], Int, "Read one bit (0-15) of a register."),
    row!(I2cWriteByte, "i2c_write_byte", "rc_i2c_write_byte", [BUS, REGISTER, BYTE], Status, "Write one register byte."),
    row!(I2cWriteBytes, "i2c_write_bytes", "rc_i2c_write_bytes", [BUS, REGISTER, BYTES], Status, "Write consecutive register bytes (1-128)."),
    row!(I2cWriteWord, "i2c_write_word", "rc_i2c_write_word", [BUS, REGISTER, WORD], Status, "Write one 16-bit register."),
    row!(I2cWriteWords, "i2c_write_words", "rc_i2c_write_words", [BUS, REGISTER, WORDS], Status, "Write consecutive 16-bit registers (1-64)."),
    row!(I2cWriteBit, "i2c_write_bit", "rc_i2c_write_bit", [BUS, REGISTER, BIT, BIT_VALUE], Status, "Set or clear one bit (0-15) of a register."),
    row!(I2cSendByte, "i2c_send_byte", "rc_i2c_send_byte", [BUS, BYTE], Status, "Send one raw byte."),
    row!(I2cSendBytes, "i2c_send_bytes", "rc_i2c_send_bytes", [BUS, BYTES], Status, "Send raw bytes (1-128)."),
    // CPU / board
    row!(SetCpuFreq, "set_cpu_freq", "rc_set_cpu_freq", [CPU_FREQ], Status, "Set CPU frequency (0 auto, 1-4 = 300/600/800/1000 MHz)."),
    row!(GetCpuFreq, "get_cpu_freq", "rc_get_cpu_freq", [], Int, "Get CPU frequency code."),
    row!(GetBbModel, "get_bb_model", "rc_get_bb_model", [], Int, "Get BeagleBone model code."),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_in_discriminant_order() {
        for (idx, spec) in OPERATIONS.iter().enumerate() {
            assert_eq!(spec.op as usize, idx, "row {} ({}) out of order", idx, spec.name);
        }
        assert_eq!(OPERATIONS.len(), Op::GetBbModel as usize + 1);
    }

    #[test]
    fn names_are_unique() {
        let mut names = HashSet::new();
        for spec in OPERATIONS {
            assert!(names.insert(spec.name), "duplicate name {}", spec.name);
        }
    }

    #[test]
    fn native_symbols_carry_prefix() {
        for spec in OPERATIONS {
            assert!(spec.native.starts_with(NATIVE_PREFIX), "{}", spec.name);
        }
    }

    #[test]
    fn lookup_accepts_native_prefix() {
        assert_eq!(Op::from_name("set_motor"), Some(Op::SetMotor));
        assert_eq!(Op::from_name("rc_set_motor"), Some(Op::SetMotor));
        assert_eq!(Op::from_name("rc_i2c_read_byte"), Some(Op::I2cReadByte));
        assert_eq!(Op::from_name("set_motors"), None);
        assert_eq!(Op::SetMotor.name(), "set_motor");
    }

    #[test]
    fn broadcast_variants_drop_the_channel() {
        for spec in OPERATIONS.iter().filter(|s| s.name.ends_with("_all")) {
            let single = spec.name.trim_end_matches("_all");
            let single = Op::from_name(single)
                .unwrap_or_else(|| panic!("{} has no single-channel form", spec.name))
                .spec();
            assert_eq!(spec.params.len() + 1, single.params.len(), "{}", spec.name);
            assert_eq!(spec.params, &single.params[1..], "{}", spec.name);
        }
    }

    #[test]
    fn all_iterates_every_operation() {
        assert_eq!(Op::all().count(), OPERATIONS.len());
    }
}
