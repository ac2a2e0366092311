//! The binary container handed to the simulation engine. A container is a
//! flat map from dataset paths (`/x`, `/density`, ...) to datasets, encoded
//! as CBOR and compressed with zstd. Arrays are stored transposed relative
//! to the in-memory `(i, j)` convention, with their unit tag alongside.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{FieldSet, InitialCondition, Mesh};
use crate::units::{Field, Quantity, Unit};

/// zstd level used for every container written.
const COMPRESSION_LEVEL: i32 = 9;

/// Fields looked up in a step file written by the engine.
pub const STEP_FIELDS: [&str; 7] = [
    "x",
    "y",
    "density",
    "x_velocity",
    "y_velocity",
    "pressure",
    "sound_speed",
];




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    Integer(i64),
    Scalar { value: f64, units: String },
    Array { shape: Vec<usize>, units: String, data: Vec<f64> },
}




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    datasets: BTreeMap<String, Dataset>,
}




// ============================================================================
impl Container {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    pub fn insert_integer(&mut self, name: &str, value: i64) {
        self.datasets.insert(name.to_string(), Dataset::Integer(value));
    }

    pub fn insert_scalar(&mut self, name: &str, value: Quantity) {
        self.datasets.insert(
            name.to_string(),
            Dataset::Scalar { value: value.value, units: value.unit.to_string() },
        );
    }

    /**
     * Store a 2D field, transposed: a field of shape `(m, n)` is stored with
     * shape `[n, m]` and its data in row-major order of the transpose.
     */
    pub fn insert_field(&mut self, name: &str, field: &Field) {
        let transposed = field.values.t();
        let dataset = Dataset::Array {
            shape: transposed.shape().to_vec(),
            units: field.unit.to_string(),
            data: transposed.iter().copied().collect(),
        };
        self.datasets.insert(name.to_string(), dataset);
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(Dataset::Integer(value)) => Ok(*value),
            Some(_) => Err(Error::Decode(format!("dataset {} is not an integer", name))),
            None => Err(Error::MissingDataset(name.to_string())),
        }
    }

    pub fn scalar(&self, name: &str) -> Result<Quantity> {
        match self.get(name) {
            Some(Dataset::Scalar { value, units }) => Ok(Quantity::new(*value, units.parse()?)),
            Some(_) => Err(Error::Decode(format!("dataset {} is not a scalar", name))),
            None => Err(Error::MissingDataset(name.to_string())),
        }
    }

    /**
     * Load a 2D field, undoing the transpose applied by `insert_field`.
     */
    pub fn field(&self, name: &str) -> Result<Field> {
        match self.get(name) {
            Some(Dataset::Array { shape, units, data }) => {
                if shape.len() != 2 {
                    return Err(Error::Dimensionality { shape: shape.clone() });
                }
                let stored = Array2::from_shape_vec((shape[0], shape[1]), data.clone())
                    .map_err(|e| Error::Decode(format!("dataset {}: {}", name, e)))?;
                let values = stored.reversed_axes().as_standard_layout().into_owned();
                Ok(Field::new(values, units.parse()?))
            }
            Some(_) => Err(Error::Decode(format!("dataset {} is not an array", name))),
            None => Err(Error::MissingDataset(name.to_string())),
        }
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(self, &mut encoded).map_err(|e| Error::Encode(e.to_string()))?;
        let compressed = zstd::encode_all(&encoded[..], COMPRESSION_LEVEL)?;
        debug!("container encoded to {} bytes ({} compressed)", encoded.len(), compressed.len());
        writer.write_all(&compressed)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let encoded = zstd::decode_all(reader).map_err(|e| Error::Decode(e.to_string()))?;
        ciborium::de::from_reader(&encoded[..]).map_err(|e| Error::Decode(e.to_string()))
    }

    /**
     * Write the container to `path`. The data go to a sibling `.partial`
     * file first, which is renamed over `path` only once it is complete;
     * a failed write removes it and leaves `path` untouched.
     */
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let partial = partial_path(path);

        match self.write_file(&partial) {
            Ok(()) => {
                fs::rename(&partial, path)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    fn write_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut buffer = BufWriter::new(file);
        self.to_writer(&mut buffer)?;
        buffer.flush()?;
        buffer.get_ref().sync_all()?;
        Ok(())
    }
}




fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}




/**
 * Return the output path for a caller-supplied base name: `.h5` is appended
 * unless the name already ends in `.h5` or `.hdf5`.
 */
pub fn output_path(filename: &str) -> PathBuf {
    if filename.ends_with(".h5") || filename.ends_with(".hdf5") {
        PathBuf::from(filename)
    } else {
        PathBuf::from(format!("{}.h5", filename))
    }
}




/**
 * Write an initial condition for the engine. Returns the path written.
 */
pub fn write_initial_conditions(filename: &str, ic: &InitialCondition) -> Result<PathBuf> {
    let path = output_path(filename);
    info!("writing to {}", path.display());

    let fields = &ic.fields;
    let mut container = Container::new();
    container.insert_integer("/n_ghost_layers", ic.n_ghost_layers() as i64);
    container.insert_field("/x", &ic.mesh.x.to(Unit::Centimeter)?);
    container.insert_field("/y", &ic.mesh.y.to(Unit::Centimeter)?);
    container.insert_field("/density", &fields.density.to(Unit::GramPerCc)?);
    container.insert_field("/x_velocity", &fields.x_velocity.to(Unit::CentimeterPerSecond)?);
    container.insert_field("/y_velocity", &fields.y_velocity.to(Unit::CentimeterPerSecond)?);
    container.insert_field("/pressure", &fields.pressure.to(Unit::Barye)?);
    container.write(&path)?;
    Ok(path)
}




/**
 * Read back a container written by `write_initial_conditions`.
 */
pub fn read_initial_conditions<P: AsRef<Path>>(path: P) -> Result<InitialCondition> {
    let container = Container::read(path)?;
    let stored_ghost_layers = container.integer("/n_ghost_layers")?;
    let n_ghost_layers = usize::try_from(stored_ghost_layers)
        .map_err(|_| Error::Decode(format!("negative ghost layer count {}", stored_ghost_layers)))?;
    let x = container.field("/x")?.to(Unit::Centimeter)?;
    let y = container.field("/y")?.to(Unit::Centimeter)?;

    if x.shape() != y.shape() || x.values.is_empty() {
        let (m, n) = x.shape();
        return Err(Error::Dimensionality { shape: vec![m, n] });
    }
    let mesh = Mesh::try_from_axes(&x.values.column(0).to_vec(), &y.values.row(0).to_vec(), n_ghost_layers)?;
    let fields = FieldSet {
        density: container.field("/density")?.to(Unit::GramPerCc)?,
        x_velocity: container.field("/x_velocity")?.to(Unit::CentimeterPerSecond)?,
        y_velocity: container.field("/y_velocity")?.to(Unit::CentimeterPerSecond)?,
        pressure: container.field("/pressure")?.to(Unit::Barye)?,
    };
    for field in [&fields.density, &fields.x_velocity, &fields.y_velocity, &fields.pressure].iter() {
        if field.shape() != mesh.cell_shape() {
            let (m, n) = field.shape();
            return Err(Error::Dimensionality { shape: vec![m, n] });
        }
    }
    Ok(InitialCondition { mesh, fields })
}




/**
 * Whether a cell-centered field describes a 1D or a 2D domain.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimensionality {
    One,
    Two,
}




// ============================================================================
impl Dimensionality {

    /**
     * Classify a cell array shape (ghost cells included): one interior cell
     * across is 1D, more is 2D. Anything else is an error.
     */
    pub fn of_cells(shape: &[usize], n_ghost_layers: usize) -> Result<Self> {
        let g = 2 * n_ghost_layers;
        match *shape {
            [ni, nj] if ni > g && nj == g + 1 => Ok(Dimensionality::One),
            [ni, nj] if ni > g && nj > g + 1 => Ok(Dimensionality::Two),
            _ => Err(Error::Dimensionality { shape: shape.to_vec() }),
        }
    }
}




/**
 * The contents of one output step of the engine.
 */
#[derive(Clone, Debug)]
pub struct StepData {
    pub time: Quantity,
    pub fields: BTreeMap<String, Field>,
}




/**
 * Read a step file. The time is required; each of `STEP_FIELDS` that cannot
 * be read is reported and skipped.
 */
pub fn read_step_file<P: AsRef<Path>>(path: P) -> Result<StepData> {
    let path = path.as_ref();
    let container = Container::read(path)?;
    let time = container.scalar("/time")?;
    let mut fields = BTreeMap::new();

    for name in STEP_FIELDS.iter() {
        match container.field(&format!("/{}", name)) {
            Ok(field) => {
                fields.insert(name.to_string(), field);
            }
            Err(e) => warn!("unable to read {} from {}: {}", name, path.display(), e),
        }
    }
    Ok(StepData { time, fields })
}
