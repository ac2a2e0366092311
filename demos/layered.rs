use clap::Parser;
use gridgen::container::write_initial_conditions;
use gridgen::grid::{make_1d_layered_grid, make_2d_layered_grid, YExtent};
use gridgen::layer::{Layer, Material};
use gridgen::scheme::SchemeConfig;
use gridgen::units::{Quantity, Unit};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;




#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 's', long, default_value = "scheme.ini")]
    scheme: String,

    /// Thicknesses of the two layers, in cm
    #[clap(short = 't', long, number_of_values = 2, default_values = &["0.125", "0.875"])]
    thickness: Vec<f64>,

    /// Cell counts of the two layers
    #[clap(short = 'n', long, number_of_values = 2, default_values = &["250", "1750"])]
    cells: Vec<usize>,

    /// Grow the cells of the second layer by this factor instead
    #[clap(long)]
    scale: Option<f64>,

    /// Thickness in y, in cm; builds a 2D grid when given
    #[clap(short = 'y', long)]
    y_thickness: Option<f64>,

    #[clap(short = 'o', long, default_value = "layered")]
    output: String,
}




fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let opts = Opts::parse();
    info!("{:?}", opts);

    let scheme = SchemeConfig::from_path(&opts.scheme)?;
    let cm = |v: f64| Quantity::new(v, Unit::Centimeter);

    let dense = Material::at_rest_cgs(1.0, 1e6);
    let light = Material::at_rest_cgs(0.125, 1e5);
    let second = match opts.scale {
        Some(scale) => Layer::geometric(cm(opts.thickness[1]), scale, light),
        None => Layer::constant(cm(opts.thickness[1]), opts.cells[1], light),
    };
    let layers = [Layer::constant(cm(opts.thickness[0]), opts.cells[0], dense), second];

    let ic = match opts.y_thickness {
        Some(thickness) => make_2d_layered_grid(&scheme, &layers, YExtent { thickness: cm(thickness), dy: None })?,
        None => make_1d_layered_grid(&scheme, &layers)?,
    };
    let path = write_initial_conditions(&opts.output, &ic)?;
    info!("wrote {} with {:?} cells", path.display(), ic.mesh.cell_shape());
    Ok(())
}
