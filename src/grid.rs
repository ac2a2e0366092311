use core::ops::Range;

use log::info;
use ndarray::{s, Array2};

use crate::error::{ConfigurationError, Error, Result};
use crate::index_space::IndexSpace;
use crate::layer::{paint_layers, thicknesses_cm, Layer};
use crate::partition::{pad_with_ghosts, padded_uniform_nodes, partition_layers, linspace, Spacing};
use crate::scheme::SchemeConfig;
use crate::units::{Field, Quantity, Unit};




/**
 * A structured rectilinear mesh, including its ghost cells. Node arrays have
 * shape `(nx, ny)` with `x[[i, j]] = x_i` and `y[[i, j]] = y_j`; the cell
 * center arrays have shape `(nx - 1, ny - 1)`.
 */
#[derive(Clone, Debug)]
pub struct Mesh {
    pub x: Field,
    pub y: Field,
    pub xc: Field,
    pub yc: Field,
    n_ghost_layers: usize,
}




// ============================================================================
impl Mesh {

    /**
     * Form the outer product mesh of two node axes (in cm) that already
     * carry `n_ghost_layers` ghost nodes on each end.
     */
    pub fn from_axes(x: &[f64], y: &[f64], n_ghost_layers: usize) -> Self {
        let (nx, ny) = (x.len(), y.len());

        assert!(
            nx > 2 * n_ghost_layers + 1 && ny > 2 * n_ghost_layers + 1,
            "mesh of {}x{} nodes cannot hold {} ghost layers",
            nx, ny, n_ghost_layers);

        let xm: Vec<_> = x.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        let ym: Vec<_> = y.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        Self {
            x: Field::new(Array2::from_shape_fn((nx, ny), |(i, _)| x[i]), Unit::Centimeter),
            y: Field::new(Array2::from_shape_fn((nx, ny), |(_, j)| y[j]), Unit::Centimeter),
            xc: Field::new(Array2::from_shape_fn((nx - 1, ny - 1), |(i, _)| xm[i]), Unit::Centimeter),
            yc: Field::new(Array2::from_shape_fn((nx - 1, ny - 1), |(_, j)| ym[j]), Unit::Centimeter),
            n_ghost_layers,
        }
    }

    /**
     * Like `from_axes`, for axes that come from outside the generator: an
     * unsupported ghost count or axes too short to hold it is an error.
     */
    pub fn try_from_axes(x: &[f64], y: &[f64], n_ghost_layers: usize) -> Result<Self> {
        if !(1..=3).contains(&n_ghost_layers) {
            return Err(ConfigurationError::UnsupportedGhostLayers(n_ghost_layers).into());
        }
        if x.len() <= 2 * n_ghost_layers + 1 || y.len() <= 2 * n_ghost_layers + 1 {
            return Err(Error::Dimensionality { shape: vec![x.len(), y.len()] });
        }
        Ok(Self::from_axes(x, y, n_ghost_layers))
    }

    pub fn n_ghost_layers(&self) -> usize {
        self.n_ghost_layers
    }

    pub fn node_shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    pub fn cell_shape(&self) -> (usize, usize) {
        self.xc.shape()
    }

    /**
     * The index space of the non-ghost cells; indexes start at zero.
     */
    pub fn interior(&self) -> IndexSpace {
        let (ni, nj) = self.cell_shape();
        let g = 2 * self.n_ghost_layers;
        IndexSpace::interior((ni - g, nj - g))
    }

    /**
     * The index space of all cells, ghost cells included.
     */
    pub fn cell_space(&self) -> IndexSpace {
        self.interior().with_ghosts(self.n_ghost_layers)
    }

    /**
     * The x node coordinates along the first axis.
     */
    pub fn x_nodes(&self) -> Vec<f64> {
        self.x.values.column(0).to_vec()
    }

    /**
     * The y node coordinates along the second axis.
     */
    pub fn y_nodes(&self) -> Vec<f64> {
        self.y.values.row(0).to_vec()
    }

    pub fn x_centers(&self) -> Vec<f64> {
        self.xc.values.column(0).to_vec()
    }

    pub fn y_centers(&self) -> Vec<f64> {
        self.yc.values.row(0).to_vec()
    }
}




/**
 * The four cell-centered fields of an initial condition, in g/cc, cm/s,
 * cm/s and barye.
 */
#[derive(Clone, Debug)]
pub struct FieldSet {
    pub density: Field,
    pub x_velocity: Field,
    pub y_velocity: Field,
    pub pressure: Field,
}




// ============================================================================
impl FieldSet {

    pub fn filled(shape: (usize, usize), value: f64) -> Self {
        Self {
            density: Field::filled(shape, value, Unit::GramPerCc),
            x_velocity: Field::filled(shape, value, Unit::CentimeterPerSecond),
            y_velocity: Field::filled(shape, value, Unit::CentimeterPerSecond),
            pressure: Field::filled(shape, value, Unit::Barye),
        }
    }

    /**
     * Assign `[density, x velocity, y velocity, pressure]` to every cell in
     * the given array region.
     */
    pub fn fill(&mut self, region: &(Range<usize>, Range<usize>), values: [f64; 4]) {
        let (ri, rj) = region;
        let mut fields = [
            &mut self.density,
            &mut self.x_velocity,
            &mut self.y_velocity,
            &mut self.pressure,
        ];
        for (field, value) in fields.iter_mut().zip(values.iter()) {
            field.values.slice_mut(s![ri.clone(), rj.clone()]).fill(*value);
        }
    }
}




/**
 * A mesh with its fields; the value handed to the container writer.
 */
#[derive(Clone, Debug)]
pub struct InitialCondition {
    pub mesh: Mesh,
    pub fields: FieldSet,
}




// ============================================================================
impl InitialCondition {

    pub fn n_ghost_layers(&self) -> usize {
        self.mesh.n_ghost_layers()
    }
}




/**
 * Extent of the uniform y axis of a layered 2D grid. Without `dy` the cell
 * size defaults to the smallest x spacing.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YExtent {
    pub thickness: Quantity,
    pub dy: Option<Quantity>,
}




/**
 * Generate a uniform 2D grid with `n_cells` interior cells over the given x
 * and y ranges (cm). All fields are set to one, for the caller to edit.
 */
pub fn make_uniform_grid(
    scheme: &SchemeConfig,
    n_cells: (usize, usize),
    xrange: (f64, f64),
    yrange: (f64, f64),
) -> Result<InitialCondition> {
    let g = scheme.n_ghost_layers();
    info!("generating uniform grid with {} ghost layers", g);

    let (x, _) = padded_uniform_nodes(xrange.0, xrange.1, n_cells.0, g)?;
    let (y, _) = padded_uniform_nodes(yrange.0, yrange.1, n_cells.1, g)?;
    let mesh = Mesh::from_axes(&x, &y, g);
    let fields = FieldSet::filled(mesh.cell_shape(), 1.0);
    Ok(InitialCondition { mesh, fields })
}




/**
 * Generate a uniform grid which is one dimensional in x: a single interior
 * cell of width `dx` in y, padded by ghost cells. All fields are set to one.
 */
pub fn make_1d_in_x_uniform_grid(scheme: &SchemeConfig, n_cells: usize, limits: (f64, f64)) -> Result<InitialCondition> {
    let g = scheme.n_ghost_layers();
    info!("generating 1d uniform grid with {} cells and {} ghost layers", n_cells, g);

    let (x, dx) = padded_uniform_nodes(limits.0, limits.1, n_cells, g)?;
    let y = transverse_nodes(dx, g);
    let mesh = Mesh::from_axes(&x, &y, g);
    let fields = FieldSet::filled(mesh.cell_shape(), 1.0);
    Ok(InitialCondition { mesh, fields })
}




/**
 * Generate a 2D layered grid: layers stacked in x, uniform in y. Fields are
 * painted from the layer materials.
 */
pub fn make_2d_layered_grid(scheme: &SchemeConfig, layers: &[Layer], y_extent: YExtent) -> Result<InitialCondition> {
    let g = scheme.n_ghost_layers();
    info!("building 2d layered grid of {} layers with {} ghost layers", layers.len(), g);

    let interior_x = layered_axis(layers)?;
    let y_thickness = y_extent.thickness.to(Unit::Centimeter)?;

    let dy = match y_extent.dy {
        Some(dy) => dy.to(Unit::Centimeter)?,
        None => interior_x
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min),
    };
    if !(dy > 0.0 && dy.is_finite() && y_thickness > 0.0) {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "cannot split y thickness {} into cells of {}",
            y_thickness, dy
        ))
        .into());
    }
    let n_y_cells = ((y_thickness / dy).round() as usize).max(1);
    let gy = g as f64;
    let y = linspace(-gy * dy, y_thickness + gy * dy, n_y_cells + 1 + 2 * g);
    let x = pad_with_ghosts(&interior_x, g)?;

    let mesh = Mesh::from_axes(&x, &y, g);
    let mut fields = FieldSet::filled(mesh.cell_shape(), 0.0);
    paint_layers(&mesh, &mut fields, layers)?;
    info!("layered grid has {:?} cells", mesh.cell_shape());
    Ok(InitialCondition { mesh, fields })
}




/**
 * Generate a 1D layered grid: layers stacked in x, a single interior cell in
 * y of the same width as the first x cell.
 */
pub fn make_1d_layered_grid(scheme: &SchemeConfig, layers: &[Layer]) -> Result<InitialCondition> {
    let g = scheme.n_ghost_layers();
    info!("building 1d layered grid of {} layers with {} ghost layers", layers.len(), g);

    let interior_x = layered_axis(layers)?;
    let ldx = interior_x[1] - interior_x[0];
    let x = pad_with_ghosts(&interior_x, g)?;
    let y = transverse_nodes(ldx, g);

    let mesh = Mesh::from_axes(&x, &y, g);
    let mut fields = FieldSet::filled(mesh.cell_shape(), 0.0);
    paint_layers(&mesh, &mut fields, layers)?;
    Ok(InitialCondition { mesh, fields })
}




fn layered_axis(layers: &[Layer]) -> Result<Vec<f64>> {
    let thicknesses = thicknesses_cm(layers)?;
    let spacings: Vec<Spacing> = layers.iter().map(|l| l.spacing).collect();
    partition_layers(&thicknesses, &spacings)
}




/**
 * y nodes of a grid that is one cell thick: `(-g .. g + 2) * dx - dx / 2`.
 */
fn transverse_nodes(dx: f64, n_ghost_layers: usize) -> Vec<f64> {
    let g = n_ghost_layers as i64;
    (-g..g + 2).map(|k| k as f64 * dx - 0.5 * dx).collect()
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::error::Error;
    use crate::layer::Material;
    use crate::scheme::Limiter;
    use float_cmp::assert_approx_eq;

    fn cm(v: f64) -> Quantity {
        Quantity::new(v, Unit::Centimeter)
    }

    #[test]
    fn shock_tube_grid_has_ghost_padding() {
        let scheme = SchemeConfig::new(Limiter::Tvd3);
        let ic = make_1d_in_x_uniform_grid(&scheme, 2000, (0.0, 1.0)).unwrap();
        assert_eq!(ic.n_ghost_layers(), 2);
        assert_eq!(ic.mesh.x_nodes().len(), 2005);
        assert_eq!(ic.mesh.node_shape(), (2005, 6));
        assert_eq!(ic.mesh.cell_shape(), (2004, 5));
        assert_eq!(ic.mesh.interior().dim(), (2000, 1));
        assert_eq!(ic.fields.density.shape(), ic.mesh.cell_shape());

        let y = ic.mesh.y_nodes();
        assert_approx_eq!(f64, y[0], -2.5 * 5e-4);
        assert_approx_eq!(f64, y[5], 2.5 * 5e-4);
    }

    #[test]
    fn uniform_grid_fields_default_to_one() {
        let scheme = SchemeConfig::new(Limiter::Mlp5);
        let ic = make_uniform_grid(&scheme, (20, 10), (-0.5, 0.5), (-0.5, 0.5)).unwrap();
        assert_eq!(ic.n_ghost_layers(), 3);
        assert_eq!(ic.mesh.node_shape(), (27, 17));
        assert_eq!(ic.mesh.cell_shape(), (26, 16));

        let f = &ic.fields;
        for field in [&f.density, &f.x_velocity, &f.y_velocity, &f.pressure].iter() {
            assert!(field.values.iter().all(|&v| v == 1.0));
        }
        assert_eq!(f.density.unit, Unit::GramPerCc);
        assert_eq!(f.pressure.unit, Unit::Barye);
    }

    #[test]
    fn cell_centers_are_node_midpoints() {
        let scheme = SchemeConfig::new(Limiter::Minmod);
        let ic = make_uniform_grid(&scheme, (4, 4), (0.0, 1.0), (0.0, 2.0)).unwrap();
        let (x, y) = (ic.mesh.x_nodes(), ic.mesh.y_nodes());
        let (xc, yc) = (ic.mesh.x_centers(), ic.mesh.y_centers());
        assert_eq!(xc.len(), x.len() - 1);
        assert_eq!(yc.len(), y.len() - 1);
        for i in 0..xc.len() {
            assert_approx_eq!(f64, xc[i], 0.5 * (x[i] + x[i + 1]));
        }
        assert_approx_eq!(f64, yc[2], 0.25);
        assert_approx_eq!(f64, ic.mesh.xc.values[[2, 3]], 0.125);
        assert_approx_eq!(f64, ic.mesh.yc.values[[2, 3]], 0.75);
    }

    #[test]
    fn two_layer_1d_grid_paints_each_layer() {
        let scheme = SchemeConfig::new(Limiter::Tvd3);
        let layers = [
            Layer::constant(cm(0.125), 250, Material::at_rest_cgs(3.857143, 10.3333)),
            Layer::constant(cm(0.875), 1750, Material::at_rest_cgs(1.0, 1.0)),
        ];
        let ic = make_1d_layered_grid(&scheme, &layers).unwrap();
        assert_eq!(ic.mesh.x_nodes().len(), 2001 + 4);
        assert_eq!(ic.mesh.cell_shape(), (2004, 5));

        let xc = ic.mesh.x_centers();
        let rho = &ic.fields.density.values;
        for (i, &c) in xc.iter().enumerate() {
            let expected = if c < 0.125 { 3.857143 } else { 1.0 };
            assert!(rho.row(i).iter().all(|&r| r == expected), "cell {} at {}", i, c);
        }
    }

    #[test]
    fn ghost_cells_take_boundary_layer_values() {
        let scheme = SchemeConfig::new(Limiter::Emlp5);
        let layers = [
            Layer::constant(cm(1.0), 10, Material::at_rest_cgs(2.0, 5.0)),
            Layer::constant(cm(1.0), 10, Material::at_rest_cgs(0.5, 1.0)),
            Layer::constant(cm(1.0), 10, Material::at_rest_cgs(7.0, 3.0)),
        ];
        let ic = make_1d_layered_grid(&scheme, &layers).unwrap();
        let (ni, _) = ic.mesh.cell_shape();
        let p = &ic.fields.pressure.values;
        for i in 0..3 {
            assert!(p.row(i).iter().all(|&v| v == 5.0));
            assert!(p.row(ni - 1 - i).iter().all(|&v| v == 3.0));
        }
        assert!(ic.fields.density.values.iter().all(|&v| v != 0.0));
    }

    #[test]
    fn layered_2d_grid_sizes_y_from_the_smallest_x_cell() {
        let scheme = SchemeConfig::new(Limiter::Tvd3);
        let layers = [
            Layer::constant(cm(0.1), 20, Material::at_rest_cgs(1.0, 1.0)),
            Layer::geometric(cm(0.9), 1.05, Material::at_rest_cgs(0.1, 1.0)),
        ];
        let y = YExtent { thickness: cm(0.05), dy: None };
        let ic = make_2d_layered_grid(&scheme, &layers, y).unwrap();

        let yn = ic.mesh.y_nodes();
        assert_eq!(yn.len(), 10 + 1 + 4);
        assert_approx_eq!(f64, yn[1] - yn[0], 0.005, epsilon = 1e-12);
        assert_eq!(ic.mesh.interior().dim().1, 10);

        let x = ic.mesh.x_nodes();
        assert!(x.windows(2).all(|w| w[0] < w[1]));
        assert_approx_eq!(f64, x[x.len() - 3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn layered_2d_grid_accepts_explicit_dy() {
        let scheme = SchemeConfig::new(Limiter::Superbee);
        let layers = [Layer::constant(cm(1.0), 50, Material::at_rest_cgs(1.0, 1.0))];
        let y = YExtent { thickness: cm(0.001), dy: Some(cm(0.5)) };
        let ic = make_2d_layered_grid(&scheme, &layers, y).unwrap();
        // rounds to zero cells, clamped to one
        assert_eq!(ic.mesh.interior().dim(), (50, 1));
    }

    #[test]
    fn geometric_first_layer_fails_grid_construction() {
        let scheme = SchemeConfig::new(Limiter::Tvd3);
        let layers = [Layer::geometric(cm(1.0), 1.05, Material::at_rest_cgs(1.0, 1.0))];
        assert!(matches!(
            make_1d_layered_grid(&scheme, &layers),
            Err(Error::Configuration(ConfigurationError::GeometricSpacingOnFirstLayer))
        ));
    }
}
