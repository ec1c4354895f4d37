use std::env;

use pmss_reader::{ParticleStream, PmssError, PmssReadOptions};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <path-to-pmss-file> [--swap] [--start-row N] [--max-rows N]",
            args[0]
        );
        std::process::exit(1);
    }

    let path = &args[1];
    let mut options = PmssReadOptions::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--swap" => options.swap = true,
            "--start-row" => {
                options.start_row = parse_count(&args, &mut i, "--start-row");
            }
            "--max-rows" => {
                options.max_rows = parse_count(&args, &mut i, "--max-rows");
            }
            other => {
                eprintln!("ERROR: Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    println!("Reading PMss file: {}", path);
    println!("{}", "=".repeat(60));

    let mut stream = match ParticleStream::open(path, options) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("\nERROR: Failed to open PMss file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let header = stream.header().clone();
    println!("\nSnapshot Information:");
    println!("  Expansion factor: {}", header.aexpn);
    println!(
        "  Omega0 / OmegaL0 / h: {} / {} / {}",
        header.omega0, header.omega_l0, header.hubble
    );
    println!("  Box: {} Mpc/h", header.box_size);
    println!("  Particle mass: {}", header.particle_mass);
    println!(
        "  Node {} of {}x{}x{} grid",
        header.node_index, header.nx, header.ny, header.nz
    );
    println!(
        "  Buffer: width {} Mpc/h, {} particles",
        header.buffer_width, header.buffer_count
    );
    println!("  Particles in file: {}", header.num_particles);

    let bounds = *stream.ownership_box();
    println!("\nOwnership box:");
    println!("  x: {} .. {}", bounds.x_left, bounds.x_right);
    println!("  y: {} .. {}", bounds.y_left, bounds.y_right);
    println!("  z: {} .. {}", bounds.z_left, bounds.z_right);

    println!("\nSample rows (first 10 inside the box):");
    let mut shown = 0;
    let mut failure: Option<PmssError> = None;
    for result in &mut stream {
        match result {
            Ok(row) => {
                if shown < 10 {
                    println!(
                        "  [{}] id={} pos=({}, {}, {}) vel=({}, {}, {})",
                        row.file_row_id, row.id, row.x, row.y, row.z, row.vx, row.vy, row.vz
                    );
                    shown += 1;
                }
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Rows consumed: {}, rows emitted: {}",
        stream.rows_consumed(),
        stream.rows_emitted()
    );
    match failure {
        None => println!("Stream ended cleanly."),
        Some(e) => {
            eprintln!("Stream ended with an error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_count(args: &[String], i: &mut usize, flag: &str) -> i64 {
    *i += 1;
    match args.get(*i).map(|s| s.parse::<i64>()) {
        Some(Ok(n)) => n,
        _ => {
            eprintln!("ERROR: {} requires an integer argument.", flag);
            std::process::exit(1);
        }
    }
}
