//! Depthkit Application
//!
//! Command line front end for the two depth flows:
//! - `still`: reconstruct a point cloud from a single RGBD capture
//! - `live`: stream depth through the realtime pipeline and alert on proximity

mod config;
mod live;
mod logging;
mod still;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use config::AppConfig;
use depthkit_capture::CameraPosition;
use depthkit_recon::ViewMode;

/// Depthkit - RGBD reconstruction and live depth monitoring
#[derive(Parser, Debug)]
#[command(name = "depthkit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Skip GPU acquisition
    #[arg(long, global = true)]
    headless: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct a point cloud from one RGBD still
    Still {
        /// What to show
        #[arg(long, value_enum, default_value_t = View::PointCloud)]
        view: View,

        #[arg(long, value_enum, default_value_t = Camera::Back)]
        camera: Camera,

        /// Capture time in seconds on the synthetic scene
        #[arg(long, default_value_t = 4.0)]
        time: f64,

        /// Capture disparity instead of depth
        #[arg(long)]
        disparity: bool,
    },
    /// Run the realtime depth pipeline
    Live {
        /// Frames to capture before stopping
        #[arg(long)]
        frames: Option<u64>,

        #[arg(long, default_value_t = 30.0)]
        fps: f32,

        #[arg(long, value_enum, default_value_t = Camera::Back)]
        camera: Camera,

        /// Process depth rather than disparity
        #[arg(long)]
        no_disparity: bool,

        /// Disable histogram equalization
        #[arg(long)]
        no_equalize: bool,

        /// Disable sensor depth filtering
        #[arg(long)]
        no_filter: bool,

        /// Deliver frames as fast as possible
        #[arg(long)]
        unpaced: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    Image,
    PointCloud,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Image => ViewMode::Image,
            View::PointCloud => ViewMode::PointCloud,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Camera {
    Back,
    Front,
}

impl From<Camera> for CameraPosition {
    fn from(camera: Camera) -> Self {
        match camera {
            Camera::Back => CameraPosition::Back,
            Camera::Front => CameraPosition::Front,
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Still {
            view,
            camera,
            time,
            disparity,
        } => still::run(
            still::StillOptions {
                view: view.into(),
                camera: camera.into(),
                time,
                disparity,
                headless: args.headless,
            },
            config.reconstruction,
        ),
        Command::Live {
            frames,
            fps,
            camera,
            no_disparity,
            no_equalize,
            no_filter,
            unpaced,
        } => {
            let mut pipeline = config.pipeline;
            pipeline.toggles.use_disparity &= !no_disparity;
            pipeline.toggles.apply_equalization &= !no_equalize;
            pipeline.toggles.filter_enabled &= !no_filter;
            live::run(
                live::LiveOptions {
                    frames,
                    fps,
                    camera: camera.into(),
                    unpaced,
                    headless: args.headless,
                },
                pipeline,
            )
        }
    }
}

fn main() {
    let args = Args::parse();
    logging::init(&args.log_level);

    if let Err(e) = run(args) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_live_flags() {
        let args = Args::try_parse_from([
            "depthkit",
            "--headless",
            "live",
            "--frames",
            "20",
            "--no-equalize",
            "--camera",
            "front",
        ])
        .unwrap();
        assert!(args.headless);
        match args.command {
            Command::Live {
                frames,
                no_equalize,
                no_disparity,
                camera,
                ..
            } => {
                assert_eq!(frames, Some(20));
                assert!(no_equalize);
                assert!(!no_disparity);
                assert_eq!(camera, Camera::Front);
            }
            Command::Still { .. } => panic!("expected live"),
        }
    }

    #[test]
    fn test_parse_still_defaults() {
        let args = Args::try_parse_from(["depthkit", "still", "--view", "image"]).unwrap();
        assert_eq!(args.log_level, "info");
        match args.command {
            Command::Still { view, time, .. } => {
                assert_eq!(ViewMode::from(view), ViewMode::Image);
                assert_eq!(time, 4.0);
            }
            Command::Live { .. } => panic!("expected still"),
        }
    }

    #[test]
    fn test_headless_live_run() {
        let options = live::LiveOptions {
            frames: Some(15),
            fps: 30.0,
            camera: CameraPosition::Back,
            unpaced: true,
            headless: true,
        };
        let config = depthkit_live::PipelineConfig::default()
            .with_drawable_size(64, 96)
            .with_roi(depthkit_live::Roi::new(16, 32, 32, 32));
        assert!(live::run(options, config).is_ok());
    }

    #[test]
    fn test_headless_still_run() {
        let options = still::StillOptions {
            view: ViewMode::PointCloud,
            camera: CameraPosition::Front,
            time: 4.0,
            disparity: true,
            headless: true,
        };
        assert!(still::run(options, Default::default()).is_ok());
    }
}
