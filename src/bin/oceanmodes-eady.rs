use clap::Parser;
use color_eyre::eyre::Context;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use oceanmodes::baroclinic::{eady_growth_rate, fft_wavenumbers};
use oceanmodes::{instability_analysis_from_n2_profile, InstabilityOptions, Which};

/// Growth rates of the Eady problem, numerical against analytical
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of vertical cells
    #[arg(long, default_value_t = 20)]
    levels: usize,
    /// Number of modes per wavenumber
    #[arg(long, default_value_t = 2)]
    num: usize,
    /// Modes to keep at every wavenumber
    #[arg(long, value_enum, default_value_t = Which::LargestImaginary)]
    sort: Which,
    /// Number of zonal wavenumbers
    #[arg(long, default_value_t = 10)]
    nk: usize,
    /// Grid spacing the wavenumbers are derived from
    #[arg(long, default_value_t = 0.1)]
    spacing: f64,
    /// Laplacian horizontal viscosity
    #[arg(long, default_value_t = 0.)]
    viscosity: f64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let nz = args.levels;

    let faces: Vec<f64> = (0..=nz).map(|i| i as f64 / nz as f64).collect();
    let centers: Vec<f64> = faces.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    let n2 = vec![1.; nz];
    let vbar = vec![0.; nz + 1];
    let k = fft_wavenumbers(args.nk, args.spacing);
    let l = [0.];

    let result = instability_analysis_from_n2_profile(
        &centers,
        &n2,
        1.,
        0.,
        &k,
        &l,
        &faces,
        &faces,
        &vbar,
        [0.; 2],
        [0.; 2],
        &InstabilityOptions {
            depth: Some(1.),
            sort: args.sort,
            num: args.num,
            horizontal_viscosity: args.viscosity,
            ..Default::default()
        },
    )
    .wrap_err("Instability analysis of the Eady problem failed")?;

    println!("{:>12} {:>16} {:>16}", "k", "growth rate", "Eady");

    for (i, &k) in k.iter().enumerate() {
        print!("{k:>12.4}");

        for n in 0..args.num {
            print!(" {:>16.8}", result.growth_rate[[n, i, 0]].im);
        }

        println!(" {:>16.8}", eady_growth_rate(k, 1.));
    }

    Ok(())
}
