use log::debug;

use crate::error::{ConfigurationError, Result};
use crate::units::{Quantity, Unit};

/// Upper bound on the nodes a single geometric run may produce before it is
/// treated as divergent.
pub const MAX_GEOMETRIC_NODES: usize = 1_000_000;




/**
 * How the nodes of one layer are placed along the partitioned axis.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spacing {
    /// Evenly spaced nodes producing exactly `n_cells` cells.
    Constant { n_cells: usize },

    /// Steps growing by `scale` after every node. The first step is
    /// `initial_dx` if given, otherwise the last step of the preceding
    /// layer. The resulting cell count depends on the data.
    Geometric { initial_dx: Option<Quantity>, scale: f64 },
}




/**
 * Output of `constant_spacing`.
 */
#[derive(Clone, Debug)]
pub struct ConstantSpacing {
    pub nodes: Vec<f64>,
    pub dx: f64,
    pub end: f64,
}




/**
 * Output of `geometric_spacing`.
 */
#[derive(Clone, Debug)]
pub struct GeometricPartition {
    pub nodes: Vec<f64>,
    pub dx_first: f64,
    pub dx_last: f64,
    pub n_nodes: usize,
}




/**
 * Make `n_cells + 1` evenly spaced nodes covering `[start, end]` inclusive.
 * The final node is exactly `end`.
 */
pub fn constant_spacing(start: f64, end: f64, n_cells: usize) -> Result<ConstantSpacing> {
    if n_cells == 0 {
        return Err(ConfigurationError::InvalidSpacing(
            "constant spacing needs at least one cell".to_string(),
        )
        .into());
    }
    if !(start < end) {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "constant spacing interval [{}, {}] is empty",
            start, end
        ))
        .into());
    }
    let nodes = linspace(start, end, n_cells + 1);
    let dx = nodes[1] - nodes[0];
    Ok(ConstantSpacing { nodes, dx, end })
}




/**
 * A lazy sequence of geometrically spaced nodes. Yields `start`, then keeps
 * appending `previous + step` (multiplying the step by `scale` after each
 * one) until a node exceeds `max_dist`. That overshoot node is yielded and
 * ends the sequence.
 */
#[derive(Clone, Debug)]
pub struct GeometricSpacing {
    next: Option<f64>,
    step: f64,
    scale: f64,
    max_dist: f64,
}




// ============================================================================
impl GeometricSpacing {
    pub fn new(start: f64, initial_dx: f64, scale: f64, max_dist: f64) -> Self {
        Self {
            next: Some(start),
            step: initial_dx,
            scale,
            max_dist,
        }
    }
}

impl Iterator for GeometricSpacing {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let x = self.next?;

        self.next = if x > self.max_dist {
            None
        } else {
            let n = x + self.step;
            self.step *= self.scale;
            Some(n)
        };
        Some(x)
    }
}




/**
 * Make a 1D array of nodes whose spacing grows by a constant factor. The
 * node past `max_dist` is kept (not clipped), so callers that need an exact
 * end point have to account for it.
 */
pub fn geometric_spacing(start: f64, initial_dx: f64, scale: f64, max_dist: f64) -> Result<GeometricPartition> {
    if start >= max_dist {
        return Err(ConfigurationError::StartBeyondMaxDistance { start, max_dist }.into());
    }
    if !(initial_dx > 0.0 && initial_dx.is_finite()) {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "initial step must be positive, got {}",
            initial_dx
        ))
        .into());
    }
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "growth scale must be positive, got {}",
            scale
        ))
        .into());
    }

    let mut nodes = Vec::new();

    for x in GeometricSpacing::new(start, initial_dx, scale, max_dist).take(MAX_GEOMETRIC_NODES) {
        // a step too small to move the node can never reach max_dist
        if nodes.last() == Some(&x) {
            break;
        }
        nodes.push(x);
    }

    match nodes.last() {
        Some(&last) if last > max_dist => {}
        _ => {
            return Err(ConfigurationError::SpacingDiverged {
                limit: MAX_GEOMETRIC_NODES,
                start,
                max_dist,
            }
            .into())
        }
    }

    let n = nodes.len();
    Ok(GeometricPartition {
        dx_first: nodes[1] - nodes[0],
        dx_last: nodes[n - 1] - nodes[n - 2],
        n_nodes: n,
        nodes,
    })
}




/**
 * Build the node coordinates (in cm) of an axis made of contiguous layers.
 * Layer `k` spans `[sum(thickness[..k]), sum(thickness[..=k])]`. The
 * per-layer partitions are concatenated, sorted, and nodes shared at layer
 * boundaries collapse into one.
 */
pub fn partition_layers(thicknesses: &[f64], spacings: &[Spacing]) -> Result<Vec<f64>> {
    if thicknesses.is_empty() || thicknesses.len() != spacings.len() {
        return Err(ConfigurationError::LayerMismatch(format!(
            "{} thicknesses given for {} spacings",
            thicknesses.len(),
            spacings.len()
        ))
        .into());
    }

    let mut cumulative_thickness = 0.0;
    let mut dx_last: Option<f64> = None;
    let mut total = Vec::new();

    for (layer_id, (&thickness, spacing)) in thicknesses.iter().zip(spacings).enumerate() {
        if !(thickness > 0.0 && thickness.is_finite()) {
            return Err(ConfigurationError::InvalidSpacing(format!(
                "layer {} has non-positive thickness {}",
                layer_id, thickness
            ))
            .into());
        }
        let start = cumulative_thickness;
        let stop = start + thickness;
        cumulative_thickness = stop;

        let nodes = match *spacing {
            Spacing::Constant { n_cells } => {
                let layer = constant_spacing(start, stop, n_cells)?;
                dx_last = Some(layer.dx);
                layer.nodes
            }
            Spacing::Geometric { initial_dx, scale } => {
                if layer_id == 0 {
                    return Err(ConfigurationError::GeometricSpacingOnFirstLayer.into());
                }
                let initial_dx = match initial_dx {
                    Some(dx) => dx.to(Unit::Centimeter)?,
                    None => dx_last.ok_or(ConfigurationError::GeometricSpacingOnFirstLayer)?,
                };
                let layer = geometric_spacing(start, initial_dx, scale, stop)?;
                let nodes = snap_to_layer_end(layer.nodes, stop);
                let n = nodes.len();
                dx_last = Some(nodes[n - 1] - nodes[n - 2]);
                nodes
            }
        };
        debug!("layer {} [{}, {}] has {} nodes", layer_id, start, stop, nodes.len());
        total.extend(nodes);
    }

    total.sort_by(f64::total_cmp);
    total.dedup();
    Ok(total)
}




/**
 * Replace the overshoot node of a geometric run with the layer end. A
 * remaining cell narrower than half the preceding one is merged into it.
 */
fn snap_to_layer_end(mut nodes: Vec<f64>, stop: f64) -> Vec<f64> {
    nodes.pop();

    let n = nodes.len();
    if n >= 2 && stop - nodes[n - 1] < 0.5 * (nodes[n - 1] - nodes[n - 2]) {
        nodes[n - 1] = stop;
    } else {
        nodes.push(stop);
    }
    nodes
}




/**
 * Add `n_ghost_layers` nodes to each end of an axis. Each new node is one
 * more boundary cell width beyond the last: for two layers the result is
 * `[x0 - 2 ldx, x0 - ldx, x0, .., xn, xn + rdx, xn + 2 rdx]`.
 */
pub fn pad_with_ghosts(nodes: &[f64], n_ghost_layers: usize) -> Result<Vec<f64>> {
    if !(1..=3).contains(&n_ghost_layers) {
        return Err(ConfigurationError::UnsupportedGhostLayers(n_ghost_layers).into());
    }
    if nodes.len() < 2 {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "need at least two nodes to pad, got {}",
            nodes.len()
        ))
        .into());
    }
    let n = nodes.len();
    let (x0, xn) = (nodes[0], nodes[n - 1]);
    let ldx = nodes[1] - x0;
    let rdx = xn - nodes[n - 2];
    let g = n_ghost_layers;

    let mut padded = Vec::with_capacity(n + 2 * g);
    padded.extend((1..=g).rev().map(|k| x0 - k as f64 * ldx));
    padded.extend_from_slice(nodes);
    padded.extend((1..=g).map(|k| xn + k as f64 * rdx));
    Ok(padded)
}




/**
 * Uniform nodes over `[lo, hi]` split into `n_cells`, padded with
 * `n_ghost_layers` cells of the same width on each side.
 */
pub fn padded_uniform_nodes(lo: f64, hi: f64, n_cells: usize, n_ghost_layers: usize) -> Result<(Vec<f64>, f64)> {
    if n_cells == 0 || !(lo < hi) {
        return Err(ConfigurationError::InvalidSpacing(format!(
            "cannot split [{}, {}] into {} cells",
            lo, hi, n_cells
        ))
        .into());
    }
    let dx = (hi - lo) / n_cells as f64;
    let g = n_ghost_layers as f64;
    let nodes = linspace(lo - g * dx, hi + g * dx, n_cells + 1 + 2 * n_ghost_layers);
    Ok((nodes, dx))
}




/**
 * `num` evenly spaced values from `start` to `stop` inclusive.
 */
pub(crate) fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut x: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            x[num - 1] = stop;
            x
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::error::{ConfigurationError, Error};
    use float_cmp::assert_approx_eq;

    fn strictly_increasing(x: &[f64]) -> bool {
        x.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn constant_spacing_covers_the_interval() {
        let layer = constant_spacing(0.5, 1.5, 4).unwrap();
        assert_eq!(layer.nodes.len(), 5);
        assert_eq!(layer.nodes[0], 0.5);
        assert_eq!(layer.nodes[4], 1.5);
        assert_approx_eq!(f64, layer.dx, 0.25);
        assert_eq!(layer.end, 1.5);
    }

    #[test]
    fn constant_spacing_rejects_zero_cells() {
        assert!(constant_spacing(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn geometric_spacing_grows_by_the_scale_factor() {
        let p = geometric_spacing(1.0, 0.01, 1.05, 2.0).unwrap();
        assert!(strictly_increasing(&p.nodes));
        assert_eq!(p.n_nodes, p.nodes.len());
        assert_eq!(p.nodes[0], 1.0);
        assert!(*p.nodes.last().unwrap() > 2.0);
        assert!(p.nodes[p.n_nodes - 2] <= 2.0);
        assert_approx_eq!(f64, p.dx_first, 0.01, epsilon = 1e-12);

        let steps = (p.n_nodes - 1) as i32;
        let ratio = p.dx_last / p.dx_first;
        assert_approx_eq!(f64, ratio, 1.05f64.powi(steps - 1), epsilon = 1e-6);
    }

    #[test]
    fn geometric_spacing_is_lazy() {
        let first: Vec<_> = GeometricSpacing::new(0.0, 1.0, 2.0, 1e300).take(4).collect();
        assert_eq!(first, vec![0.0, 1.0, 3.0, 7.0]);
    }

    #[test]
    fn geometric_spacing_requires_start_before_max_distance() {
        assert!(matches!(
            geometric_spacing(2.0, 0.01, 1.05, 2.0),
            Err(Error::Configuration(ConfigurationError::StartBeyondMaxDistance { .. }))
        ));
    }

    #[test]
    fn geometric_spacing_fails_fast_when_it_cannot_reach_max_distance() {
        // the steps sum to at most 0.2, so 10.0 is out of reach
        assert!(matches!(
            geometric_spacing(0.0, 0.1, 0.5, 10.0),
            Err(Error::Configuration(ConfigurationError::SpacingDiverged { .. }))
        ));
        assert!(geometric_spacing(0.0, 0.0, 1.05, 1.0).is_err());
        assert!(geometric_spacing(0.0, 0.1, -1.0, 1.0).is_err());
    }

    #[test]
    fn two_constant_layers_share_their_boundary_node() {
        let spacings = [Spacing::Constant { n_cells: 250 }, Spacing::Constant { n_cells: 1750 }];
        let x = partition_layers(&[0.125, 0.875], &spacings).unwrap();
        assert_eq!(x.len(), 2001);
        assert!(strictly_increasing(&x));
        assert!(x.contains(&0.125));
    }

    #[test]
    fn constant_layers_span_the_total_thickness() {
        let thicknesses = [0.3, 0.05, 1.7, 0.25];
        let spacings: Vec<_> = [30, 7, 100, 9]
            .iter()
            .map(|&n_cells| Spacing::Constant { n_cells })
            .collect();
        let x = partition_layers(&thicknesses, &spacings).unwrap();
        let total = thicknesses.iter().fold(0.0, |a, t| a + t);
        assert_eq!(x[x.len() - 1] - x[0], total);
        assert!(strictly_increasing(&x));
    }

    #[test]
    fn geometric_layer_continues_from_the_previous_step() {
        let spacings = [
            Spacing::Constant { n_cells: 100 },
            Spacing::Geometric { initial_dx: None, scale: 1.05 },
        ];
        let x = partition_layers(&[1.0, 1.0], &spacings).unwrap();
        assert!(strictly_increasing(&x));
        assert_eq!(x[0], 0.0);
        assert_eq!(x[x.len() - 1], 2.0);

        let i = x.iter().position(|&v| v == 1.0).unwrap();
        assert_approx_eq!(f64, x[i + 1] - x[i], 0.01, epsilon = 1e-12);
        assert_approx_eq!(f64, x[i + 2] - x[i + 1], 0.0105, epsilon = 1e-12);
    }

    #[test]
    fn geometric_layer_uses_an_explicit_initial_step() {
        let spacings = [
            Spacing::Constant { n_cells: 10 },
            Spacing::Geometric { initial_dx: Some(Quantity::new(0.5, Unit::Millimeter)), scale: 1.1 },
        ];
        let x = partition_layers(&[1.0, 1.0], &spacings).unwrap();
        assert!(strictly_increasing(&x));
        assert_eq!(x[x.len() - 1], 2.0);

        let i = x.iter().position(|&v| v == 1.0).unwrap();
        assert_approx_eq!(f64, x[i + 1] - x[i], 0.05, epsilon = 1e-12);
        assert_approx_eq!(f64, x[i + 2] - x[i + 1], 0.055, epsilon = 1e-12);
    }

    #[test]
    fn geometric_layer_after_geometric_layer_continues_from_the_snapped_cell() {
        let spacings = [
            Spacing::Constant { n_cells: 100 },
            Spacing::Geometric { initial_dx: None, scale: 1.05 },
            Spacing::Geometric { initial_dx: None, scale: 1.05 },
        ];
        let x = partition_layers(&[1.0, 1.0, 1.0], &spacings).unwrap();
        assert!(strictly_increasing(&x));

        let i = x.iter().position(|&v| v == 2.0).unwrap();
        let last_cell = x[i] - x[i - 1];
        assert_approx_eq!(f64, x[i + 1] - x[i], last_cell, epsilon = 1e-12);
    }

    #[test]
    fn geometric_first_layer_is_rejected() {
        let spacings = [Spacing::Geometric { initial_dx: None, scale: 1.05 }];
        assert!(matches!(
            partition_layers(&[1.0], &spacings),
            Err(Error::Configuration(ConfigurationError::GeometricSpacingOnFirstLayer))
        ));
    }

    #[test]
    fn mismatched_layer_inputs_are_rejected() {
        assert!(partition_layers(&[1.0, 2.0], &[Spacing::Constant { n_cells: 4 }]).is_err());
        assert!(partition_layers(&[], &[]).is_err());
        assert!(partition_layers(&[-1.0], &[Spacing::Constant { n_cells: 4 }]).is_err());
    }

    #[test]
    fn ghost_padding_extends_by_boundary_cell_widths() {
        let x = [0.0, 0.1, 0.3, 0.6];
        for g in 1..=3 {
            let padded = pad_with_ghosts(&x, g).unwrap();
            assert_eq!(padded.len(), x.len() + 2 * g);
            assert_eq!(&padded[g..g + x.len()], &x[..]);
            assert!(strictly_increasing(&padded));
        }
        let padded = pad_with_ghosts(&x, 2).unwrap();
        assert_approx_eq!(f64, padded[0], -0.2);
        assert_approx_eq!(f64, padded[1], -0.1);
        assert_approx_eq!(f64, padded[6], 0.9);
        assert_approx_eq!(f64, padded[7], 1.2);
    }

    #[test]
    fn ghost_padding_supports_one_to_three_layers_only() {
        for &g in &[0, 4, 7] {
            assert!(matches!(
                pad_with_ghosts(&[0.0, 1.0], g),
                Err(Error::Configuration(ConfigurationError::UnsupportedGhostLayers(n))) if n == g
            ));
        }
    }

    #[test]
    fn padded_uniform_nodes_include_ghost_cells() {
        let (x, dx) = padded_uniform_nodes(0.0, 1.0, 2000, 2).unwrap();
        assert_eq!(x.len(), 2005);
        assert_approx_eq!(f64, dx, 5e-4);
        assert_approx_eq!(f64, x[0], -1e-3);
        assert_approx_eq!(f64, x[2004], 1.001);
    }
}
