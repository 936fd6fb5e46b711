use crate::ast::Expression;
use crate::machine::{Bounds, Dimension, Function, WorkingRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When an operation runs, in seconds. A missing start means "now".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub duration: f64,
}

impl Timing {
    pub fn now(duration: f64) -> Self {
        Self {
            start: None,
            duration,
        }
    }

    pub fn at(start: f64, duration: f64) -> Self {
        Self {
            start: Some(start),
            duration,
        }
    }
}

/// Actuator invocation carried by a protocol node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    ContinuousFlow {
        path: Vec<String>,
        rate: Expression,
        #[serde(default)]
        timing: Timing,
    },
    StopFlow {
        path: Vec<String>,
    },
    MeasureOd {
        container: String,
        wavelength: f64,
        into: Option<String>,
        #[serde(default)]
        timing: Timing,
    },
    MeasureFluorescence {
        container: String,
        excitation: f64,
        emission: f64,
        into: Option<String>,
        #[serde(default)]
        timing: Timing,
    },
    MeasureTemperature {
        container: String,
        into: Option<String>,
        #[serde(default)]
        timing: Timing,
    },
    MeasureVolume {
        container: String,
        into: Option<String>,
        #[serde(default)]
        timing: Timing,
    },
    MeasureLuminiscence {
        container: String,
        into: Option<String>,
        #[serde(default)]
        timing: Timing,
    },
    ApplyTemperature {
        container: String,
        temperature: f64,
        #[serde(default)]
        timing: Timing,
    },
    Centrifugation {
        container: String,
        speed: f64,
        temperature: f64,
        #[serde(default)]
        timing: Timing,
    },
    Shake {
        container: String,
        speed: f64,
        #[serde(default)]
        timing: Timing,
    },
    Stir {
        container: String,
        speed: f64,
        #[serde(default)]
        timing: Timing,
    },
    ApplyLight {
        container: String,
        wavelength: f64,
        intensity: f64,
        #[serde(default)]
        timing: Timing,
    },
    Electrophoresis {
        container: String,
        field_strength: f64,
        #[serde(default)]
        timing: Timing,
    },
}

/// A function an operation exercises on one container.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionUse<'a> {
    pub container: &'a str,
    pub function: Function,
    pub range: WorkingRange,
}

fn use_of(container: &str, function: Function, range: WorkingRange) -> FunctionUse<'_> {
    FunctionUse {
        container,
        function,
        range,
    }
}

fn single(dimension: Dimension, value: f64) -> WorkingRange {
    WorkingRange::new().with(dimension, Bounds::point(value))
}

impl Operation {
    pub fn timing(&self) -> Option<&Timing> {
        match self {
            Operation::StopFlow { .. } => None,
            Operation::ContinuousFlow { timing, .. }
            | Operation::MeasureOd { timing, .. }
            | Operation::MeasureFluorescence { timing, .. }
            | Operation::MeasureTemperature { timing, .. }
            | Operation::MeasureVolume { timing, .. }
            | Operation::MeasureLuminiscence { timing, .. }
            | Operation::ApplyTemperature { timing, .. }
            | Operation::Centrifugation { timing, .. }
            | Operation::Shake { timing, .. }
            | Operation::Stir { timing, .. }
            | Operation::ApplyLight { timing, .. }
            | Operation::Electrophoresis { timing, .. } => Some(timing),
        }
    }

    /// Variable receiving the reading of a measurement.
    pub fn measurement_target(&self) -> Option<&str> {
        match self {
            Operation::MeasureOd { into, .. }
            | Operation::MeasureFluorescence { into, .. }
            | Operation::MeasureTemperature { into, .. }
            | Operation::MeasureVolume { into, .. }
            | Operation::MeasureLuminiscence { into, .. } => into.as_deref(),
            _ => None,
        }
    }

    /// Functions the operation needs from the containers it touches.
    pub fn function_uses(&self) -> Vec<FunctionUse<'_>> {
        match self {
            Operation::ContinuousFlow { .. } | Operation::StopFlow { .. } => Vec::new(),
            Operation::MeasureOd {
                container,
                wavelength,
                ..
            } => vec![use_of(
                container,
                Function::MeasureOd,
                single(Dimension::Wavelength, *wavelength),
            )],
            Operation::MeasureFluorescence {
                container,
                excitation,
                emission,
                ..
            } => vec![use_of(
                container,
                Function::MeasureFluorescence,
                single(Dimension::Excitation, *excitation)
                    .with(Dimension::Emission, Bounds::point(*emission)),
            )],
            Operation::MeasureTemperature { container, .. } => {
                vec![use_of(container, Function::MeasureTemperature, WorkingRange::new())]
            }
            Operation::MeasureVolume { container, .. } => {
                vec![use_of(container, Function::MeasureVolume, WorkingRange::new())]
            }
            Operation::MeasureLuminiscence { container, .. } => {
                vec![use_of(container, Function::MeasureLuminiscence, WorkingRange::new())]
            }
            Operation::ApplyTemperature {
                container,
                temperature,
                ..
            } => vec![use_of(
                container,
                Function::Heat,
                single(Dimension::Temperature, *temperature),
            )],
            // Spinning at a set temperature needs the chamber to heat as well.
            Operation::Centrifugation {
                container,
                speed,
                temperature,
                ..
            } => vec![
                use_of(
                    container,
                    Function::Centrifugation,
                    single(Dimension::Frequency, *speed),
                ),
                use_of(
                    container,
                    Function::Heat,
                    single(Dimension::Temperature, *temperature),
                ),
            ],
            Operation::Shake {
                container, speed, ..
            } => vec![use_of(
                container,
                Function::Shake,
                single(Dimension::Frequency, *speed),
            )],
            Operation::Stir {
                container, speed, ..
            } => vec![use_of(
                container,
                Function::Stir,
                single(Dimension::Frequency, *speed),
            )],
            Operation::ApplyLight {
                container,
                wavelength,
                intensity,
                ..
            } => vec![use_of(
                container,
                Function::ApplyLight,
                single(Dimension::Wavelength, *wavelength)
                    .with(Dimension::Intensity, Bounds::point(*intensity)),
            )],
            Operation::Electrophoresis {
                container,
                field_strength,
                ..
            } => vec![use_of(
                container,
                Function::Electrophoresis,
                single(Dimension::FieldStrength, *field_strength),
            )],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::ContinuousFlow { .. } => "continuous_flow",
            Operation::StopFlow { .. } => "stop_flow",
            Operation::MeasureOd { .. } => "measure_od",
            Operation::MeasureFluorescence { .. } => "measure_fluorescence",
            Operation::MeasureTemperature { .. } => "measure_temperature",
            Operation::MeasureVolume { .. } => "measure_volume",
            Operation::MeasureLuminiscence { .. } => "measure_luminiscence",
            Operation::ApplyTemperature { .. } => "apply_temperature",
            Operation::Centrifugation { .. } => "centrifugation",
            Operation::Shake { .. } => "shake",
            Operation::Stir { .. } => "stir",
            Operation::ApplyLight { .. } => "apply_light",
            Operation::Electrophoresis { .. } => "electrophoresis",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ContinuousFlow { path, rate, .. } => {
                write!(f, "{}([{}], {} ml/hr)", self.name(), path.join(","), rate)
            }
            Operation::StopFlow { path } => write!(f, "{}([{}])", self.name(), path.join(",")),
            _ => {
                let container = self.function_uses().first().map_or("", |u| u.container);
                write!(f, "{}({})", self.name(), container)
            }
        }
    }
}
