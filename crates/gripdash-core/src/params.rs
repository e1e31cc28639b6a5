//! Device parameter registry.
//!
//! Every `/write_<name>` / `/read_<name>` route pair the backend exposes,
//! with the form field the write expects and the range the client enforces
//! before issuing any call. Out-of-range input is rejected locally and never
//! reaches the server.

use crate::error::{CoreError, CoreResult};

/// Value kind a parameter carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
}

/// A writable and/or readable device parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// Gripper slave id, 1-247.
    GripperId,
    /// Baud rate selector, 0-7 (index into the backend's rate map).
    BaudRate,
    /// Initialization pulse command; carries no value.
    GripperInit,
    /// Motor enable switch.
    MotorEnable,
    /// Calibration direction switch (0 = open, 1 = close).
    InitDirection,
    /// Power-on auto calibration switch.
    AutoInit,
    /// Rotation stall-stop enable switch.
    RotationStopEnable,
    /// Rotation stall-stop sensitivity, 0-100.
    RotationStopSensitivity,
    /// Multi-turn counter reset; write-only switch.
    ResetRotation,
    /// Persist parameters switch.
    SaveParams,
    /// Clamping position setpoint, 0-20 mm.
    ClampingPosition,
    /// Clamping speed setpoint, 1-100 mm/s.
    ClampingSpeed,
    /// Clamping current setpoint, 0.1-0.5 A.
    ClampingCurrent,
    /// Absolute rotation angle setpoint, +/- 3 600 000 deg.
    RotationAngle,
    /// Rotation speed setpoint, 1-1080 deg/s.
    RotationSpeed,
    /// Rotation current setpoint, 0.2-1.0 A.
    RotationCurrent,
}

/// All parameters, for table-driven validation and iteration.
pub const ALL_PARAMS: [Param; 16] = [
    Param::GripperId,
    Param::BaudRate,
    Param::GripperInit,
    Param::MotorEnable,
    Param::InitDirection,
    Param::AutoInit,
    Param::RotationStopEnable,
    Param::RotationStopSensitivity,
    Param::ResetRotation,
    Param::SaveParams,
    Param::ClampingPosition,
    Param::ClampingSpeed,
    Param::ClampingCurrent,
    Param::RotationAngle,
    Param::RotationSpeed,
    Param::RotationCurrent,
];

impl Param {
    /// Endpoint suffix shared by `/write_<name>` and `/read_<name>`.
    pub fn name(&self) -> &'static str {
        match self {
            Param::GripperId => "gripper_id",
            Param::BaudRate => "baud_rate",
            Param::GripperInit => "gripper_init",
            Param::MotorEnable => "motor_enable",
            Param::InitDirection => "init_direction",
            Param::AutoInit => "auto_init",
            Param::RotationStopEnable => "rotation_stop_enable",
            Param::RotationStopSensitivity => "rotation_stop_sensitivity",
            Param::ResetRotation => "reset_rotation",
            Param::SaveParams => "save_params",
            Param::ClampingPosition => "clamping_position",
            Param::ClampingSpeed => "clamping_speed",
            Param::ClampingCurrent => "clamping_current",
            Param::RotationAngle => "rotation_angle",
            Param::RotationSpeed => "rotation_speed",
            Param::RotationCurrent => "rotation_current",
        }
    }

    /// Form field carrying the value on write; `None` for pulse commands.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Param::GripperId => Some("gripper_id"),
            Param::BaudRate => Some("baud_rate"),
            Param::GripperInit => None,
            Param::MotorEnable | Param::RotationStopEnable => Some("enable"),
            Param::InitDirection => Some("direction"),
            Param::AutoInit => Some("auto_init"),
            Param::RotationStopSensitivity => Some("sensitivity"),
            Param::ResetRotation => Some("reset"),
            Param::SaveParams => Some("save"),
            Param::ClampingPosition => Some("position"),
            Param::ClampingSpeed | Param::RotationSpeed => Some("speed"),
            Param::ClampingCurrent | Param::RotationCurrent => Some("current"),
            Param::RotationAngle => Some("angle"),
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            Param::ClampingPosition
            | Param::ClampingSpeed
            | Param::ClampingCurrent
            | Param::RotationAngle
            | Param::RotationSpeed
            | Param::RotationCurrent => ParamKind::Float,
            _ => ParamKind::Int,
        }
    }

    /// Whether the backend exposes a matching `/read_<name>` route.
    ///
    /// `gripper_init` is a pulse (its status lives under
    /// `gripper_init_status` in the bulk snapshot) and `reset_rotation`
    /// is write-only.
    pub fn readable(&self) -> bool {
        !matches!(self, Param::GripperInit | Param::ResetRotation)
    }

    /// Inclusive range the client enforces, `None` for valueless commands.
    fn range(&self) -> Option<(f64, f64, &'static str)> {
        match self {
            Param::GripperId => Some((1.0, 247.0, "1-247")),
            Param::BaudRate => Some((0.0, 7.0, "0-7")),
            Param::GripperInit => None,
            Param::MotorEnable
            | Param::InitDirection
            | Param::AutoInit
            | Param::RotationStopEnable
            | Param::ResetRotation
            | Param::SaveParams => Some((0.0, 1.0, "0 or 1")),
            Param::RotationStopSensitivity => Some((0.0, 100.0, "0-100")),
            Param::ClampingPosition => Some((0.0, 20.0, "0-20 mm")),
            Param::ClampingSpeed => Some((1.0, 100.0, "1-100 mm/s")),
            Param::ClampingCurrent => Some((0.1, 0.5, "0.1-0.5 A")),
            Param::RotationAngle => Some((-3_600_000.0, 3_600_000.0, "+/-3600000 deg")),
            Param::RotationSpeed => Some((1.0, 1080.0, "1-1080 deg/s")),
            Param::RotationCurrent => Some((0.2, 1.0, "0.2-1.0 A")),
        }
    }

    /// Validate a value against this parameter's range, before any call.
    pub fn validate(&self, value: f64) -> CoreResult<()> {
        let Some((min, max, expected)) = self.range() else {
            return Err(CoreError::NoValue { param: self.name() });
        };

        if self.kind() == ParamKind::Int && value.fract() != 0.0 {
            return Err(CoreError::NotAnInteger {
                param: self.name(),
                value,
            });
        }

        if !value.is_finite() || value < min || value > max {
            return Err(CoreError::OutOfRange {
                param: self.name(),
                value,
                expected,
            });
        }

        Ok(())
    }
}

/// Validate a digital-output port number.
pub fn validate_output_port(output: u8) -> CoreResult<()> {
    if !(crate::types::OUTPUT_PORT_MIN..=crate::types::OUTPUT_PORT_MAX).contains(&output) {
        return Err(CoreError::InvalidOutputPort(output));
    }
    Ok(())
}

/// Validate a digital-output value.
pub fn validate_output_value(value: u8) -> CoreResult<()> {
    if value > 1 {
        return Err(CoreError::InvalidOutputValue(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_table() {
        let cases: &[(Param, f64, bool)] = &[
            (Param::GripperId, 1.0, true),
            (Param::GripperId, 247.0, true),
            (Param::GripperId, 0.0, false),
            (Param::GripperId, 248.0, false),
            (Param::BaudRate, 0.0, true),
            (Param::BaudRate, 7.0, true),
            (Param::BaudRate, 8.0, false),
            (Param::MotorEnable, 0.0, true),
            (Param::MotorEnable, 1.0, true),
            (Param::MotorEnable, 2.0, false),
            (Param::InitDirection, 1.0, true),
            (Param::AutoInit, 0.0, true),
            (Param::RotationStopEnable, 1.0, true),
            (Param::RotationStopSensitivity, 0.0, true),
            (Param::RotationStopSensitivity, 100.0, true),
            (Param::RotationStopSensitivity, 101.0, false),
            (Param::ResetRotation, 1.0, true),
            (Param::SaveParams, 1.0, true),
            (Param::ClampingPosition, 0.0, true),
            (Param::ClampingPosition, 20.0, true),
            (Param::ClampingPosition, 20.5, false),
            (Param::ClampingPosition, -0.1, false),
            (Param::ClampingSpeed, 1.0, true),
            (Param::ClampingSpeed, 0.5, false),
            (Param::ClampingSpeed, 100.5, false),
            (Param::ClampingCurrent, 0.1, true),
            (Param::ClampingCurrent, 0.5, true),
            (Param::ClampingCurrent, 0.05, false),
            (Param::ClampingCurrent, 0.6, false),
            (Param::RotationAngle, -3_600_000.0, true),
            (Param::RotationAngle, 3_600_000.0, true),
            (Param::RotationAngle, 3_600_001.0, false),
            (Param::RotationSpeed, 1080.0, true),
            (Param::RotationSpeed, 1081.0, false),
            (Param::RotationCurrent, 0.2, true),
            (Param::RotationCurrent, 1.0, true),
            (Param::RotationCurrent, 0.1, false),
        ];

        for (param, value, ok) in cases {
            assert_eq!(
                param.validate(*value).is_ok(),
                *ok,
                "{} value {value}",
                param.name()
            );
        }
    }

    #[test]
    fn int_params_reject_fractions() {
        assert!(matches!(
            Param::GripperId.validate(1.5),
            Err(CoreError::NotAnInteger { .. })
        ));
        // Float params accept fractions inside range.
        assert!(Param::ClampingPosition.validate(12.25).is_ok());
    }

    #[test]
    fn pulse_command_takes_no_value() {
        assert!(matches!(
            Param::GripperInit.validate(1.0),
            Err(CoreError::NoValue { .. })
        ));
        assert!(Param::GripperInit.field().is_none());
    }

    #[test]
    fn every_valued_param_has_a_field() {
        for param in ALL_PARAMS {
            if param != Param::GripperInit {
                assert!(param.field().is_some(), "{}", param.name());
            }
        }
    }

    #[test]
    fn output_port_bounds() {
        assert!(validate_output_port(1).is_ok());
        assert!(validate_output_port(16).is_ok());
        assert!(validate_output_port(0).is_err());
        assert!(validate_output_port(17).is_err());
        assert!(validate_output_value(0).is_ok());
        assert!(validate_output_value(1).is_ok());
        assert!(validate_output_value(2).is_err());
    }
}
