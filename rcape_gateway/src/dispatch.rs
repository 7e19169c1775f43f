//! Native invocation and result translation.
//!
//! [`invoke`] turns validated [`Args`] into exactly one driver call and
//! captures what came back as a [`Native`] result. [`translate`] maps that
//! into a caller [`Value`] or a typed [`GatewayError`]. Neither step looks
//! at the lifecycle; the gateway handles that around them.

use crate::operation::{Args, OperationSpec};
use crate::table::Op;
use rcape_common::cape::driver::{CapeDriver, NOT_IMPLEMENTED, STATUS_OK};
use rcape_common::cape::error::{ArgumentError, GatewayError};
use rcape_common::cape::types::{Button, Led};
use rcape_common::cape::value::Value;

/// Raw outcome of one native call.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    /// Status code: 0 success, anything else failure.
    Status(i32),
    /// Reading that may take any value, negative included.
    Int(i64),
    /// Reading that is never negative on success.
    Count(i32),
    /// 0/1 flag; negative on failure.
    Flag(i32),
    /// Physical quantity.
    Float(f32),
    /// Elapsed time; -1 means "never".
    Duration(i64),
    /// Single-value I2C read: status plus the filled-in value.
    Read { status: i32, value: i64 },
    /// Multi-byte I2C read.
    Bytes { status: i32, data: Vec<u8> },
    /// Multi-word I2C read.
    Words { status: i32, data: Vec<u16> },
}

#[inline]
fn i32_arg(args: &Args<'_>, position: usize) -> Result<i32, ArgumentError> {
    // Ranges in the table keep every integer parameter within i32.
    Ok(args.int(position)? as i32)
}

#[inline]
fn u8_arg(args: &Args<'_>, position: usize) -> Result<u8, ArgumentError> {
    Ok(args.int(position)? as u8)
}

#[inline]
fn f32_arg(args: &Args<'_>, position: usize) -> Result<f32, ArgumentError> {
    Ok(args.float(position)? as f32)
}

#[inline]
fn len_arg(args: &Args<'_>, position: usize) -> Result<usize, ArgumentError> {
    Ok(args.int(position)? as usize)
}

/// Forward one validated call to the driver.
///
/// # Errors
/// Only if `args` does not match the descriptor of `op`, which the table
/// tests rule out.
pub fn invoke(driver: &dyn CapeDriver, op: Op, args: &Args<'_>) -> Result<Native, ArgumentError> {
    use Native::*;

    let native = match op {
        Op::Initialize => Status(driver.initialize()),
        Op::Cleanup => Status(driver.cleanup()),
        Op::GetState => Count(driver.get_state()),
        Op::SetState => Status(driver.set_state(i32_arg(args, 0)?)),

        Op::GetLed => {
            let led: Led = args.code(0)?;
            Flag(driver.gpio_read_mmap(led.gpio()))
        }
        Op::SetLed => Status(driver.set_led(i32_arg(args, 0)?, i32_arg(args, 1)?)),
        Op::BlinkLed => Status(driver.blink_led(
            i32_arg(args, 0)?,
            f32_arg(args, 1)?,
            f32_arg(args, 2)?,
        )),
        Op::GetButton => match args.code::<Button>(0)? {
            Button::Pause => Flag(driver.get_pause_button()),
            Button::Mode => Flag(driver.get_mode_button()),
        },

        Op::EnableMotors => Status(driver.enable_motors()),
        Op::DisableMotors => Status(driver.disable_motors()),
        Op::SetMotor => Status(driver.set_motor(i32_arg(args, 0)?, f32_arg(args, 1)?)),
        Op::SetMotorAll => Status(driver.set_motor_all(f32_arg(args, 0)?)),
        Op::SetMotorFreeSpin => Status(driver.set_motor_free_spin(i32_arg(args, 0)?)),
        Op::SetMotorFreeSpinAll => Status(driver.set_motor_free_spin_all()),
        Op::SetMotorBrake => Status(driver.set_motor_brake(i32_arg(args, 0)?)),
        Op::SetMotorBrakeAll => Status(driver.set_motor_brake_all()),

        Op::GetEncoderPos => Int(driver.get_encoder_pos(i32_arg(args, 0)?) as i64),
        Op::SetEncoderPos => {
            Status(driver.set_encoder_pos(i32_arg(args, 0)?, i32_arg(args, 1)?))
        }

        Op::BatteryVoltage => Float(driver.battery_voltage()),
        Op::DcJackVoltage => Float(driver.dc_jack_voltage()),
        Op::AdcRaw => Count(driver.adc_raw(i32_arg(args, 0)?)),
        Op::AdcVolt => Float(driver.adc_volt(i32_arg(args, 0)?)),

        Op::EnableServoPowerRail => Status(driver.enable_servo_power_rail()),
        Op::DisableServoPowerRail => Status(driver.disable_servo_power_rail()),
        Op::SendServoPulseUs => {
            Status(driver.send_servo_pulse_us(i32_arg(args, 0)?, i32_arg(args, 1)?))
        }
        Op::SendServoPulseUsAll => Status(driver.send_servo_pulse_us_all(i32_arg(args, 0)?)),
        Op::SendServoPulseNormalized => Status(
            driver.send_servo_pulse_normalized(i32_arg(args, 0)?, f32_arg(args, 1)?),
        ),
        Op::SendServoPulseNormalizedAll => {
            Status(driver.send_servo_pulse_normalized_all(f32_arg(args, 0)?))
        }
        Op::SendEscPulseNormalized => {
            Status(driver.send_esc_pulse_normalized(i32_arg(args, 0)?, f32_arg(args, 1)?))
        }
        Op::SendEscPulseNormalizedAll => {
            Status(driver.send_esc_pulse_normalized_all(f32_arg(args, 0)?))
        }
        Op::SendOneshotPulseNormalized => Status(
            driver.send_oneshot_pulse_normalized(i32_arg(args, 0)?, f32_arg(args, 1)?),
        ),
        Op::SendOneshotPulseNormalizedAll => {
            Status(driver.send_oneshot_pulse_normalized_all(f32_arg(args, 0)?))
        }

        Op::InitializeDsm => Status(driver.initialize_dsm()),
        Op::StopDsmService => Status(driver.stop_dsm_service()),
        Op::GetDsmChRaw => Count(driver.get_dsm_ch_raw(i32_arg(args, 0)?)),
        Op::GetDsmChNormalized => Float(driver.get_dsm_ch_normalized(i32_arg(args, 0)?)),
        Op::IsNewDsmData => Flag(driver.is_new_dsm_data()),
        Op::IsDsmActive => Flag(driver.is_dsm_active()),
        Op::MsSinceLastDsmPacket => Duration(driver.ms_since_last_dsm_packet() as i64),
        Op::NanosSinceLastDsmPacket => Duration(match driver.nanos_since_last_dsm_packet() {
            u64::MAX => -1,
            nanos => i64::try_from(nanos).unwrap_or(i64::MAX),
        }),
        Op::GetNumDsmChannels => Count(driver.get_num_dsm_channels()),
        Op::BindDsm => Status(driver.bind_dsm()),
        Op::CalibrateDsmRoutine => Status(driver.calibrate_dsm_routine()),

        Op::InitializeBarometer => {
            Status(driver.initialize_barometer(i32_arg(args, 0)?, i32_arg(args, 1)?))
        }
        Op::PowerOffBarometer => Status(driver.power_off_barometer()),
        Op::ReadBarometer => Status(driver.read_barometer()),
        Op::BmpGetTemperature => Float(driver.bmp_get_temperature()),
        Op::BmpGetPressurePa => Float(driver.bmp_get_pressure_pa()),
        Op::BmpGetAltitudeM => Float(driver.bmp_get_altitude_m()),
        Op::SetSeaLevelPressurePa => Status(driver.set_sea_level_pressure_pa(f32_arg(args, 0)?)),

        Op::I2cInit => Status(driver.i2c_init(i32_arg(args, 0)?, u8_arg(args, 1)?)),
        Op::I2cClose => Status(driver.i2c_close(i32_arg(args, 0)?)),
        Op::I2cSetDeviceAddress => {
            Status(driver.i2c_set_device_address(i32_arg(args, 0)?, u8_arg(args, 1)?))
        }
        Op::I2cClaimBus => Status(driver.i2c_claim_bus(i32_arg(args, 0)?)),
        Op::I2cReleaseBus => Status(driver.i2c_release_bus(i32_arg(args, 0)?)),
        Op::I2cGetInUseState => Flag(driver.i2c_get_in_use_state(i32_arg(args, 0)?)),
        Op::I2cReadByte => {
            let mut data = 0u8;
            let status = driver.i2c_read_byte(i32_arg(args, 0)?, u8_arg(args, 1)?, &mut data);
            Read { status, value: data as i64 }
        }
        Op::I2cReadBytes => {
            let mut data = vec![0u8; len_arg(args, 2)?];
            let status = driver.i2c_read_bytes(i32_arg(args, 0)?, u8_arg(args, 1)?, &mut data);
            Bytes { status, data }
        }
        Op::I2cReadWord => {
            let mut data = 0u16;
            let status = driver.i2c_read_word(i32_arg(args, 0)?, u8_arg(args, 1)?, &mut data);
            Read { status, value: data as i64 }
        }
        Op::I2cReadWords => {
            let mut data = vec![0u16; len_arg(args, 2)?];
            let status = driver.i2c_read_words(i32_arg(args, 0)?, u8_arg(args, 1)?, &mut data);
            Words { status, data }
        }
        Op::I2cReadBit => {
            let mut data = 0u8;
            let status = driver.i2c_read_bit(
                i32_arg(args, 0)?,
                u8_arg(args, 1)?,
                u8_arg(args, 2)?,
                &mut data,
            );
            Read { status, value: data as i64 }
        }
        Op::I2cWriteByte => Status(driver.i2c_write_byte(
            i32_arg(args, 0)?,
            u8_arg(args, 1)?,
            u8_arg(args, 2)?,
        )),
        Op::I2cWriteBytes => Status(driver.i2c_write_bytes(
            i32_arg(args, 0)?,
            u8_arg(args, 1)?,
            args.bytes(2)?,
        )),
        Op::I2cWriteWord => Status(driver.i2c_write_word(
            i32_arg(args, 0)?,
            u8_arg(args, 1)?,
            args.int(2)? as u16,
        )),
        Op::I2cWriteWords => Status(driver.i2c_write_words(
            i32_arg(args, 0)?,
            u8_arg(args, 1)?,
            args.words(2)?,
        )),
        Op::I2cWriteBit => Status(driver.i2c_write_bit(
            i32_arg(args, 0)?,
            u8_arg(args, 1)?,
            u8_arg(args, 2)?,
            u8_arg(args, 3)?,
        )),
        Op::I2cSendByte => Status(driver.i2c_send_byte(i32_arg(args, 0)?, u8_arg(args, 1)?)),
        Op::I2cSendBytes => Status(driver.i2c_send_bytes(i32_arg(args, 0)?, args.bytes(1)?)),

        Op::SetCpuFreq => Status(driver.set_cpu_freq(i32_arg(args, 0)?)),
        Op::GetCpuFreq => Count(driver.get_cpu_freq()),
        Op::GetBbModel => Count(driver.get_bb_model()),
    };

    Ok(native)
}

/// Map a non-zero status to its error.
fn failure(op: &'static str, code: i32) -> GatewayError {
    if code == NOT_IMPLEMENTED {
        GatewayError::NotImplemented { op }
    } else {
        GatewayError::Driver { op, code }
    }
}

fn check_status(op: &'static str, status: i32) -> Result<(), GatewayError> {
    match status {
        STATUS_OK => Ok(()),
        code => Err(failure(op, code)),
    }
}

/// Translate a native result into the caller's value.
///
/// # Errors
/// - `NotImplemented` if the driver reported `-ENOSYS`
/// - `Driver` for any other failure status or a negative count/flag
pub fn translate(spec: &OperationSpec, native: Native) -> Result<Value, GatewayError> {
    let op = spec.name;
    match native {
        Native::Status(status) => check_status(op, status).map(|()| Value::Int(0)),
        Native::Int(value) | Native::Duration(value) => Ok(Value::Int(value)),
        Native::Count(value) | Native::Flag(value) => {
            if value < 0 {
                Err(failure(op, value))
            } else {
                Ok(Value::Int(value as i64))
            }
        }
        Native::Float(value) => Ok(Value::Float(value as f64)),
        Native::Read { status, value } => check_status(op, status).map(|()| Value::Int(value)),
        Native::Bytes { status, data } => check_status(op, status).map(|()| Value::Bytes(data)),
        Native::Words { status, data } => check_status(op, status).map(|()| Value::Words(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_status_is_success() {
        let spec = Op::SetMotor.spec();
        assert_eq!(translate(spec, Native::Status(0)), Ok(Value::Int(0)));
    }

    #[test]
    fn enosys_maps_to_not_implemented() {
        let spec = Op::I2cWriteByte.spec();
        assert_eq!(
            translate(spec, Native::Status(NOT_IMPLEMENTED)),
            Err(GatewayError::NotImplemented { op: "i2c_write_byte" })
        );
    }

    #[test]
    fn failure_status_carries_code() {
        let spec = Op::SetMotor.spec();
        assert_eq!(
            translate(spec, Native::Status(-1)),
            Err(GatewayError::Driver { op: "set_motor", code: -1 })
        );
        // Any non-zero status is a failure, positive included.
        assert!(translate(spec, Native::Status(2)).is_err());
    }

    #[test]
    fn negative_encoder_positions_are_values() {
        let spec = Op::GetEncoderPos.spec();
        assert_eq!(translate(spec, Native::Int(-1200)), Ok(Value::Int(-1200)));
    }

    #[test]
    fn negative_counts_and_flags_are_failures() {
        assert!(translate(Op::AdcRaw.spec(), Native::Count(-1)).is_err());
        assert!(translate(Op::IsDsmActive.spec(), Native::Flag(-1)).is_err());
        assert_eq!(translate(Op::IsDsmActive.spec(), Native::Flag(1)), Ok(Value::Int(1)));
    }

    #[test]
    fn missing_dsm_packet_duration_passes_through() {
        let spec = Op::MsSinceLastDsmPacket.spec();
        assert_eq!(translate(spec, Native::Duration(-1)), Ok(Value::Int(-1)));
    }

    #[test]
    fn failed_i2c_reads_drop_their_buffer() {
        let spec = Op::I2cReadBytes.spec();
        let native = Native::Bytes { status: -1, data: vec![0xAA; 4] };
        assert!(matches!(translate(spec, native), Err(GatewayError::Driver { code: -1, .. })));

        let native = Native::Bytes { status: 0, data: vec![1, 2] };
        assert_eq!(translate(spec, native), Ok(Value::Bytes(vec![1, 2])));
    }
}
