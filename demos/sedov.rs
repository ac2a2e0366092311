use clap::Parser;
use gridgen::container::write_initial_conditions;
use gridgen::grid::make_uniform_grid;
use gridgen::scheme::SchemeConfig;
use log::{info, LevelFilter};
use ndarray::Zip;
use simple_logger::SimpleLogger;




#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 's', long, default_value = "scheme.ini")]
    scheme: String,

    #[clap(short = 'n', long, default_value = "200")]
    num_cells: usize,

    #[clap(short = 'w', long, default_value = "0.001")]
    width: f64,

    #[clap(short = 'o', long, default_value = "sedov")]
    output: String,
}




fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let opts = Opts::parse();
    info!("{:?}", opts);

    let scheme = SchemeConfig::from_path(&opts.scheme)?;
    let n = opts.num_cells;
    let mut ic = make_uniform_grid(&scheme, (n, n), (-0.5, 0.5), (-0.5, 0.5))?;
    let w = opts.width;

    ic.fields.density.values *= 0.001;
    ic.fields.x_velocity.values.fill(0.0);
    ic.fields.y_velocity.values.fill(0.0);

    Zip::from(&mut ic.fields.pressure.values)
        .and(&ic.mesh.xc.values)
        .and(&ic.mesh.yc.values)
        .for_each(|p, &x, &y| *p = 10.0 * f64::exp(-(x * x / w + y * y / w)) + 1e-3);

    let path = write_initial_conditions(&opts.output, &ic)?;
    info!("wrote {}", path.display());
    Ok(())
}
