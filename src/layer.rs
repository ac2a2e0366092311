use log::debug;

use crate::error::{ConfigurationError, Result};
use crate::grid::{FieldSet, Mesh};
use crate::index_space::{Axis, IndexSpace};
use crate::partition::Spacing;
use crate::units::{Quantity, Unit};




/**
 * The constant material state of one layer.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub density: Quantity,
    pub x_velocity: Quantity,
    pub y_velocity: Quantity,
    pub pressure: Quantity,
}




// ============================================================================
impl Material {

    pub fn new(density: Quantity, x_velocity: Quantity, y_velocity: Quantity, pressure: Quantity) -> Self {
        Self { density, x_velocity, y_velocity, pressure }
    }

    /**
     * A material at rest, given in cgs units.
     */
    pub fn at_rest_cgs(density: f64, pressure: f64) -> Self {
        Self::new(
            Quantity::new(density, Unit::GramPerCc),
            Quantity::new(0.0, Unit::CentimeterPerSecond),
            Quantity::new(0.0, Unit::CentimeterPerSecond),
            Quantity::new(pressure, Unit::Barye),
        )
    }

    /**
     * Return `[density, x velocity, y velocity, pressure]` in g/cc, cm/s,
     * cm/s and barye.
     */
    pub fn to_cgs(&self) -> Result<[f64; 4]> {
        Ok([
            self.density.to(Unit::GramPerCc)?,
            self.x_velocity.to(Unit::CentimeterPerSecond)?,
            self.y_velocity.to(Unit::CentimeterPerSecond)?,
            self.pressure.to(Unit::Barye)?,
        ])
    }
}




/**
 * A contiguous region of constant material along the layered axis.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    pub thickness: Quantity,
    pub spacing: Spacing,
    pub material: Material,
}




// ============================================================================
impl Layer {

    pub fn constant(thickness: Quantity, n_cells: usize, material: Material) -> Self {
        Self {
            thickness,
            spacing: Spacing::Constant { n_cells },
            material,
        }
    }

    /**
     * A layer whose cells grow by `scale`, starting from the last cell width
     * of the preceding layer.
     */
    pub fn geometric(thickness: Quantity, scale: f64, material: Material) -> Self {
        Self {
            thickness,
            spacing: Spacing::Geometric { initial_dx: None, scale },
            material,
        }
    }

    pub fn thickness_cm(&self) -> Result<f64> {
        self.thickness.to(Unit::Centimeter)
    }
}




/**
 * Convert layer thicknesses to cm.
 */
pub fn thicknesses_cm(layers: &[Layer]) -> Result<Vec<f64>> {
    layers.iter().map(Layer::thickness_cm).collect()
}




/**
 * Find the cells owned by each layer. Layer `k` owns the cells whose center
 * lies in `[lo, hi)`, where `lo` is the end of layer `k - 1` (or the start of
 * the padded domain for the first layer) and `hi` is the end of layer `k`
 * (or the end of the padded domain, inclusive, for the last layer). The
 * returned spaces span the full transverse range of the mesh.
 */
pub fn layer_cell_spaces(mesh: &Mesh, thicknesses: &[f64]) -> Result<Vec<IndexSpace>> {
    let centers = mesh.x_centers();
    let nodes = mesh.x_nodes();
    let cell_space = mesh.cell_space();
    let offset = cell_space.start().0;
    let domain = (nodes[0], nodes[nodes.len() - 1]);

    let mut spaces = Vec::with_capacity(thicknesses.len());
    let mut cumulative = 0.0;
    let last = thicknesses.len().saturating_sub(1);

    for (index, &thickness) in thicknesses.iter().enumerate() {
        let layer_start = cumulative;
        cumulative += thickness;

        let lo = if index == 0 { domain.0 } else { layer_start };
        let start = centers.partition_point(|&c| c < lo);
        let end = if index == last {
            centers.partition_point(|&c| c <= domain.1)
        } else {
            centers.partition_point(|&c| c < cumulative)
        };

        if start >= end {
            return Err(ConfigurationError::EmptyLayer {
                index,
                start: layer_start,
                end: cumulative,
            }
            .into());
        }
        debug!("layer {} owns cells {}..{}", index, start, end);

        let di = start as i64 + offset .. end as i64 + offset;
        spaces.push(cell_space.with_range(Axis::I, di));
    }
    Ok(spaces)
}




/**
 * Assign each layer's material to the cells it owns, then overwrite the
 * ghost cells at the low and high x ends with the material of the adjacent
 * boundary layer.
 */
pub fn paint_layers(mesh: &Mesh, fields: &mut FieldSet, layers: &[Layer]) -> Result<()> {
    let (first, last) = match (layers.first(), layers.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ConfigurationError::LayerMismatch("no layers given".to_string()).into()),
    };

    let cell_space = mesh.cell_space();
    let spaces = layer_cell_spaces(mesh, &thicknesses_cm(layers)?)?;

    for (space, layer) in spaces.iter().zip(layers) {
        fields.fill(&space.memory_region_in(&cell_space), layer.material.to_cgs()?);
    }

    let interior = mesh.interior();
    let low = cell_space.lower_slab(&interior, Axis::I);
    let high = cell_space.upper_slab(&interior, Axis::I);
    fields.fill(&low.memory_region_in(&cell_space), first.material.to_cgs()?);
    fields.fill(&high.memory_region_in(&cell_space), last.material.to_cgs()?);
    Ok(())
}
