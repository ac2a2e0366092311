use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{ConfigurationError, Result};




/**
 * The physical dimension of a unit. Conversions are only defined between
 * units sharing a dimension.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Length,
    Velocity,
    Density,
    Pressure,
    Time,
}




/**
 * A physical unit tag. Every array leaving the grid builders travels paired
 * with one of these.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Centimeter,
    Micrometer,
    Millimeter,
    Meter,
    CentimeterPerSecond,
    MicrometerPerNanosecond,
    KilometerPerSecond,
    MeterPerSecond,
    GramPerCc,
    KilogramPerCubicMeter,
    Barye,
    Pascal,
    Megabar,
    Second,
    Nanosecond,
}




// ============================================================================
impl Unit {

    const ALL: [Unit; 15] = [
        Unit::Centimeter,
        Unit::Micrometer,
        Unit::Millimeter,
        Unit::Meter,
        Unit::CentimeterPerSecond,
        Unit::MicrometerPerNanosecond,
        Unit::KilometerPerSecond,
        Unit::MeterPerSecond,
        Unit::GramPerCc,
        Unit::KilogramPerCubicMeter,
        Unit::Barye,
        Unit::Pascal,
        Unit::Megabar,
        Unit::Second,
        Unit::Nanosecond,
    ];

    /**
     * The tag string written next to datasets, e.g. `"g/cc"`.
     */
    pub fn symbol(&self) -> &'static str {
        use Unit::*;

        match self {
            Centimeter => "cm",
            Micrometer => "um",
            Millimeter => "mm",
            Meter => "m",
            CentimeterPerSecond => "cm/s",
            MicrometerPerNanosecond => "um/ns",
            KilometerPerSecond => "km/s",
            MeterPerSecond => "m/s",
            GramPerCc => "g/cc",
            KilogramPerCubicMeter => "kg/m^3",
            Barye => "barye",
            Pascal => "Pa",
            Megabar => "Mbar",
            Second => "s",
            Nanosecond => "ns",
        }
    }

    pub fn dimension(&self) -> Dimension {
        use Unit::*;

        match self {
            Centimeter | Micrometer | Millimeter | Meter => Dimension::Length,
            CentimeterPerSecond | MicrometerPerNanosecond | KilometerPerSecond | MeterPerSecond => {
                Dimension::Velocity
            }
            GramPerCc | KilogramPerCubicMeter => Dimension::Density,
            Barye | Pascal | Megabar => Dimension::Pressure,
            Second | Nanosecond => Dimension::Time,
        }
    }

    /**
     * Multiplier taking a value in this unit to the cgs base unit of its
     * dimension (cm, cm/s, g/cc, barye, s).
     */
    pub fn cgs_factor(&self) -> f64 {
        use Unit::*;

        match self {
            Centimeter => 1.0,
            Micrometer => 1e-4,
            Millimeter => 0.1,
            Meter => 100.0,
            CentimeterPerSecond => 1.0,
            MicrometerPerNanosecond => 1e5,
            KilometerPerSecond => 1e5,
            MeterPerSecond => 100.0,
            GramPerCc => 1.0,
            KilogramPerCubicMeter => 1e-3,
            Barye => 1.0,
            Pascal => 10.0,
            Megabar => 1e12,
            Second => 1.0,
            Nanosecond => 1e-9,
        }
    }

    /**
     * Return the factor which converts values in this unit to `target`.
     */
    pub fn factor_to(&self, target: Unit) -> Result<f64> {
        if self.dimension() != target.dimension() {
            return Err(ConfigurationError::IncompatibleUnits {
                from: self.symbol().to_string(),
                to: target.symbol().to_string(),
            }
            .into());
        }
        if *self == target {
            Ok(1.0)
        } else {
            Ok(self.cgs_factor() / target.cgs_factor())
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "cc" | "g/cm^3" => return Ok(Unit::GramPerCc),
            "Ba" => return Ok(Unit::Barye),
            _ => {}
        }
        Self::ALL
            .iter()
            .find(|u| u.symbol() == s)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownUnit(s.to_string()).into())
    }
}




/**
 * A scalar value with a unit attached.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}




// ============================================================================
impl Quantity {

    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /**
     * Return the magnitude of this quantity expressed in `unit`.
     */
    pub fn to(&self, unit: Unit) -> Result<f64> {
        Ok(self.value * self.unit.factor_to(unit)?)
    }
}




/**
 * A 2D array of values with a unit attached. Node coordinates, cell centers
 * and cell-centered fields are all stored this way.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub values: Array2<f64>,
    pub unit: Unit,
}




// ============================================================================
impl Field {

    pub fn new(values: Array2<f64>, unit: Unit) -> Self {
        Self { values, unit }
    }

    pub fn filled(shape: (usize, usize), value: f64, unit: Unit) -> Self {
        Self::new(Array2::from_elem(shape, value), unit)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /**
     * Return a copy of this field converted to `unit`.
     */
    pub fn to(&self, unit: Unit) -> Result<Field> {
        let factor = self.unit.factor_to(unit)?;
        Ok(Field::new(self.values.mapv(|v| v * factor), unit))
    }
}




/**
 * An immutable table of the units a set of quantities should be expressed in.
 * This is passed around explicitly; there is no process-wide registry.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSystem {
    pub length: Unit,
    pub velocity: Unit,
    pub density: Unit,
    pub pressure: Unit,
    pub time: Unit,
}




// ============================================================================
impl UnitSystem {

    /**
     * The canonical system of the grid containers: cm, cm/s, g/cc, barye, s.
     */
    pub fn cgs() -> Self {
        Self {
            length: Unit::Centimeter,
            velocity: Unit::CentimeterPerSecond,
            density: Unit::GramPerCc,
            pressure: Unit::Barye,
            time: Unit::Second,
        }
    }

    /**
     * Conventions typical in the ICF community: um, um/ns, g/cc, Mbar, ns.
     */
    pub fn icf() -> Self {
        Self {
            length: Unit::Micrometer,
            velocity: Unit::MicrometerPerNanosecond,
            density: Unit::GramPerCc,
            pressure: Unit::Megabar,
            time: Unit::Nanosecond,
        }
    }

    /**
     * Return the unit this system uses for the given dimension.
     */
    pub fn unit_for(&self, dimension: Dimension) -> Unit {
        match dimension {
            Dimension::Length => self.length,
            Dimension::Velocity => self.velocity,
            Dimension::Density => self.density,
            Dimension::Pressure => self.pressure,
            Dimension::Time => self.time,
        }
    }

    /**
     * Convert a field into this system, keeping its dimension.
     */
    pub fn convert(&self, field: &Field) -> Result<Field> {
        field.to(self.unit_for(field.unit.dimension()))
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::cgs()
    }
}

impl FromStr for UnitSystem {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cgs" => Ok(Self::cgs()),
            "icf" => Ok(Self::icf()),
            other => Err(ConfigurationError::UnsupportedUnitSystem(other.to_string()).into()),
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Field, Quantity, Unit, UnitSystem};
    use float_cmp::assert_approx_eq;

    #[test]
    fn unit_symbols_parse_back() {
        for unit in Unit::ALL.iter() {
            assert_eq!(unit.symbol().parse::<Unit>().unwrap(), *unit);
        }
        assert!("furlong".parse::<Unit>().is_err());
    }

    #[test]
    fn quantities_convert_within_a_dimension() {
        assert_approx_eq!(f64, Quantity::new(1.0, Unit::Megabar).to(Unit::Barye).unwrap(), 1e12);
        assert_approx_eq!(f64, Quantity::new(250.0, Unit::Micrometer).to(Unit::Centimeter).unwrap(), 0.025);
        assert_approx_eq!(f64, Quantity::new(3.0, Unit::KilometerPerSecond).to(Unit::CentimeterPerSecond).unwrap(), 3e5);
        assert_approx_eq!(f64, Quantity::new(1000.0, Unit::KilogramPerCubicMeter).to(Unit::GramPerCc).unwrap(), 1.0);
    }

    #[test]
    fn quantities_refuse_to_convert_across_dimensions() {
        assert!(Quantity::new(1.0, Unit::Centimeter).to(Unit::Barye).is_err());
    }

    #[test]
    fn fields_convert_elementwise() {
        let field = Field::filled((2, 3), 2.0, Unit::Centimeter);
        let um = field.to(Unit::Micrometer).unwrap();
        assert_eq!(um.unit, Unit::Micrometer);
        assert!(um.values.iter().all(|&v| (v - 2e4).abs() < 1e-9));
    }

    #[test]
    fn unit_systems_are_parsed_by_name() {
        assert_eq!("cgs".parse::<UnitSystem>().unwrap(), UnitSystem::cgs());
        assert_eq!("icf".parse::<UnitSystem>().unwrap().pressure, Unit::Megabar);
        assert!("si".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn unit_system_converts_by_dimension() {
        let field = Field::filled((1, 1), 1e12, Unit::Barye);
        let converted = UnitSystem::icf().convert(&field).unwrap();
        assert_eq!(converted.unit, Unit::Megabar);
        assert_approx_eq!(f64, converted.values[[0, 0]], 1.0);
    }
}
