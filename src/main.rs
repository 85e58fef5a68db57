use clap::Parser;
use lumen::camera::Camera;
use lumen::presets::{SceneDescription, ScenePreset};
use lumen::renderer::{preview_framebuffer, PathTracer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

/// lumen — render 3D scenes to plain PPM
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    version,
    about = "An offline Monte Carlo path tracer written in Rust 🦀",
    long_about = "Renders physically-based 3D scenes with mixture importance sampling, \
                  GGX microfacets, motion blur, and Russian-roulette termination, then \
                  writes the image as plain PPM (P3) to standard out.",
    after_help = "EXAMPLES:\n  \
                  lumen --scene cornell --spp 200 > cornell.ppm\n  \
                  lumen --scene bubble --width 800 -o bubble.ppm\n  \
                  lumen --scene showcase --preview > showcase.ppm\n  \
                  lumen --scene simple --unbiased --bounces 20 > simple.ppm"
)]
struct Cli {
    /// Scene preset to render
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Simple)]
    scene: ScenePreset,

    /// Output width in pixels (defaults to the preset's width)
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Samples per pixel — rounded down to a square for stratification.
    /// 10–50 for previews, 200+ for high quality.
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum ray bounce depth. Higher values are needed for glass and
    /// deep interreflections.
    #[arg(long)]
    bounces: Option<u32>,

    /// Disable the firefly luminance clamp for an unbiased estimate
    #[arg(long)]
    unbiased: bool,

    /// Show a half-block preview of the finished image on stderr
    #[arg(long)]
    preview: bool,

    /// Write the image to a file instead of standard out
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_header(scene: &SceneDescription, camera: &Camera) {
    let spp = camera.sqrt_spp() * camera.sqrt_spp();
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  lumen 💡  Offline Path Tracer                ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:      {}", scene.name);
    eprintln!("  Resolution: {}×{}", camera.width(), camera.height());
    eprintln!(
        "  Samples:    {} spp ({}×{} stratified)",
        spp,
        camera.sqrt_spp(),
        camera.sqrt_spp()
    );
    eprintln!("  Bounces:    {}", scene.render.max_depth);
    eprintln!("  Workers:    {}", rayon::current_num_threads());
    eprintln!();
}

fn write_image(fb: &lumen::renderer::Framebuffer, output: Option<&PathBuf>) -> io::Result<()> {
    match output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            fb.write_ppm(&mut out)
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            fb.write_ppm(&mut out)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(mut scene) = cli.scene.build() else {
        eprintln!("error: scene '{:?}' cannot be constructed", cli.scene);
        return ExitCode::FAILURE;
    };

    // Override preset settings with CLI arguments
    if let Some(width) = cli.width {
        scene.render.width = width;
    }
    if let Some(spp) = cli.spp {
        scene.render.samples_per_pixel = spp;
    }
    if let Some(bounces) = cli.bounces {
        scene.render.max_depth = bounces;
    }
    scene.render.firefly_clamp = !cli.unbiased;

    let camera = Camera::new(&scene.camera, &scene.render);
    print_header(&scene, &camera);

    let tracer = PathTracer {
        world: &scene.world,
        lights: &scene.lights,
        camera: &camera,
        config: &scene.render,
    };

    let t0 = Instant::now();
    let framebuffer = tracer.render();
    let elapsed = t0.elapsed();

    let total_rays = camera.width() as u64
        * camera.height() as u64
        * (camera.sqrt_spp() as u64 * camera.sqrt_spp() as u64);
    let mrays = total_rays as f64 / elapsed.as_secs_f64() / 1e6;
    eprintln!(
        "  Time: {:.2}s | {:.2}M camera rays | {:.2} Mrays/s",
        elapsed.as_secs_f64(),
        total_rays as f64 / 1e6,
        mrays
    );

    if let Err(err) = write_image(&framebuffer, cli.output.as_ref()) {
        eprintln!("error: could not write image: {err}");
        return ExitCode::FAILURE;
    }

    if cli.preview {
        let mut err = io::stderr();
        let _ = writeln!(err);
        preview_framebuffer(&framebuffer, &mut err);
    }

    ExitCode::SUCCESS
}
