use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Functions a container can host. The discriminant is the bit position in a
/// [`FunctionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Route = 0,
    Pump = 1,
    Heat = 2,
    Stir = 3,
    MeasureOd = 4,
    MeasureTemperature = 5,
    Centrifugation = 6,
    Shake = 7,
    Electrophoresis = 8,
    MeasureLuminiscence = 9,
    MeasureVolume = 10,
    MeasureFluorescence = 11,
    ApplyLight = 12,
}

impl Function {
    pub const COUNT: usize = 13;

    pub const ALL: [Function; Function::COUNT] = [
        Function::Route,
        Function::Pump,
        Function::Heat,
        Function::Stir,
        Function::MeasureOd,
        Function::MeasureTemperature,
        Function::Centrifugation,
        Function::Shake,
        Function::Electrophoresis,
        Function::MeasureLuminiscence,
        Function::MeasureVolume,
        Function::MeasureFluorescence,
        Function::ApplyLight,
    ];

    pub fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Function::Route => "route",
            Function::Pump => "pump",
            Function::Heat => "heat",
            Function::Stir => "stir",
            Function::MeasureOd => "measure_od",
            Function::MeasureTemperature => "measure_temperature",
            Function::Centrifugation => "centrifugation",
            Function::Shake => "shake",
            Function::Electrophoresis => "electrophoresis",
            Function::MeasureLuminiscence => "measure_luminiscence",
            Function::MeasureVolume => "measure_volume",
            Function::MeasureFluorescence => "measure_fluorescence",
            Function::ApplyLight => "apply_light",
        };
        write!(f, "{}", name)
    }
}

/// Bitmask of [`Function`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FunctionSet(u16);

impl FunctionSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn insert(&mut self, function: Function) {
        self.0 |= function.bit();
    }

    pub fn contains(&self, function: Function) -> bool {
        self.0 & function.bit() != 0
    }

    pub fn is_superset(&self, other: &FunctionSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Function> + '_ {
        Function::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<Function> for FunctionSet {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        let mut set = FunctionSet::empty();
        for function in iter {
            set.insert(function);
        }
        set
    }
}

/// Most significant bit first, one digit per known function.
impl fmt::Display for FunctionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in Function::ALL.iter().rev() {
            write!(f, "{}", if self.contains(*function) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Physical magnitude a working range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Wavelength,
    Excitation,
    Emission,
    Temperature,
    Frequency,
    Intensity,
    FieldStrength,
}

impl Dimension {
    pub fn unit(&self) -> &'static str {
        match self {
            Dimension::Wavelength | Dimension::Excitation | Dimension::Emission => "nm",
            Dimension::Temperature => "C",
            Dimension::Frequency => "Hz",
            Dimension::Intensity => "cd",
            Dimension::FieldStrength => "V/cm",
        }
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn covers(&self, other: &Bounds) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    pub fn widen(&mut self, other: &Bounds) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Bounds per dimension for one function.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkingRange {
    bounds: BTreeMap<Dimension, Bounds>,
}

impl WorkingRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: Dimension, bounds: Bounds) -> Self {
        self.bounds.insert(dimension, bounds);
        self
    }

    pub fn get(&self, dimension: Dimension) -> Option<&Bounds> {
        self.bounds.get(&dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dimension, &Bounds)> {
        self.bounds.iter()
    }

    /// Union with `other`, dimension by dimension.
    pub fn widen(&mut self, other: &WorkingRange) {
        for (dimension, bounds) in &other.bounds {
            self.bounds
                .entry(*dimension)
                .and_modify(|b| b.widen(bounds))
                .or_insert(*bounds);
        }
    }

    /// True when every dimension `required` constrains is covered here. A
    /// dimension missing on this side is treated as unconstrained.
    pub fn covers(&self, required: &WorkingRange) -> bool {
        required.bounds.iter().all(|(dimension, needed)| {
            self.bounds
                .get(dimension)
                .is_none_or(|available| available.covers(needed))
        })
    }
}

impl fmt::Display for WorkingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dimension, b) in &self.bounds {
            write!(
                f,
                "{:?}:[{} {}, {} {}]",
                dimension,
                b.min,
                dimension.unit(),
                b.max,
                dimension.unit()
            )?;
        }
        Ok(())
    }
}

/// A function a physical container offers, with its operating envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub function: Function,
    #[serde(default)]
    pub range: WorkingRange,
}

impl Capability {
    pub fn new(function: Function) -> Self {
        Self {
            function,
            range: WorkingRange::new(),
        }
    }

    pub fn with_range(mut self, dimension: Dimension, min: f64, max: f64) -> Self {
        self.range = self.range.with(dimension, Bounds::new(min, max));
        self
    }
}
