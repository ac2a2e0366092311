use clap::Parser;
use gridgen::container::write_initial_conditions;
use gridgen::grid::make_1d_in_x_uniform_grid;
use gridgen::scheme::SchemeConfig;
use log::{info, LevelFilter};
use ndarray::Zip;
use simple_logger::SimpleLogger;
use std::f64::consts::PI;




#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 's', long, default_value = "scheme.ini")]
    scheme: String,

    #[clap(short = 'n', long, default_value = "2000")]
    num_cells: usize,

    #[clap(short = 'o', long, default_value = "shu_osher")]
    output: String,
}




/**
 * Primitive state `(density, velocity, pressure)` of the Shu-Osher shock
 * tube at position `x`.
 */
fn shu_osher(x: f64) -> (f64, f64, f64) {
    if x < 0.125 {
        (3.857143, 2.629369, 10.3333)
    } else {
        (1.0 + 0.2 * f64::sin(8.0 * x * 2.0 * PI), 0.0, 1.0)
    }
}




fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let opts = Opts::parse();
    info!("{:?}", opts);

    let scheme = SchemeConfig::from_path(&opts.scheme)?;
    let mut ic = make_1d_in_x_uniform_grid(&scheme, opts.num_cells, (0.0, 1.0))?;
    let fields = &mut ic.fields;

    Zip::from(&mut fields.density.values)
        .and(&mut fields.x_velocity.values)
        .and(&mut fields.pressure.values)
        .and(&ic.mesh.xc.values)
        .for_each(|d, u, p, &x| {
            let (rho, vx, pre) = shu_osher(x);
            *d = rho;
            *u = vx;
            *p = pre;
        });
    fields.y_velocity.values.fill(0.0);

    let path = write_initial_conditions(&opts.output, &ic)?;
    info!("wrote {}", path.display());
    Ok(())
}
