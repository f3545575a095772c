// In the long run this will hopefully become a convenient CLI command for
// poking at a real camera module from a development board. For now though
// it's a test bed that runs the driver against a simulated module, so that
// the probe, format and control logic can be watched in action.

use clap::{Parser, ValueEnum};
use log::{info, warn};
use rkcam::interface::fake::Interface as FakeInterface;
use rkcam::models::{gt2005, nt99250};
use rkcam::platform::fake::{Event, Platform as FakePlatform};
use rkcam::{Camera, Config, ControlId, PixelFormat, SensorDescriptor};

type FakeCamera = Camera<FakeInterface, FakePlatform>;
type CameraError = rkcam::Error<FakeInterface, FakePlatform>;

/// Runs the camera driver against a simulated camera module.
///
/// The simulated module answers with the identity of the chosen sensor,
/// so the driver probes it, initializes it, negotiates the requested
/// format, sets any requested controls and then runs any console commands,
/// reporting what it sent to the module along the way.
#[derive(Parser)]
struct Args {
    /// The sensor the simulated module carries
    #[arg(long = "sensor", value_enum, default_value = "nt99250")]
    sensor: SensorChoice,
    /// Requested frame width
    #[arg(long = "width", default_value = "640")]
    width: u32,
    /// Requested frame height
    #[arg(long = "height", default_value = "480")]
    height: u32,
    /// Requested pixel format (yuyv or uyvy)
    #[arg(long = "format", default_value = "yuyv")]
    format: String,
    /// A control to set, as NAME=VALUE (repeatable)
    #[arg(long = "control")]
    controls: Vec<String>,
    /// A register console command such as "get 3021" (repeatable)
    #[arg(long = "console")]
    console: Vec<String>,
    /// Read back every register written
    #[arg(long = "verify", action)]
    verify: bool,
    /// Simulate a board with a flash LED wired up
    #[arg(long = "flash", action)]
    flash: bool,
    /// Show verbose output
    #[arg(long = "verbose", short = 'v', action)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SensorChoice {
    Gt2005,
    Nt99250,
    None,
}

impl SensorChoice {
    fn descriptor(self) -> Option<&'static SensorDescriptor> {
        match self {
            SensorChoice::Gt2005 => Some(&gt2005::SENSOR),
            SensorChoice::Nt99250 => Some(&nt99250::SENSOR),
            SensorChoice::None => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("camera: {0}")]
    Camera(CameraError),
    #[error("control {control:?} failed: {error}")]
    Control { control: String, error: CameraError },
    #[error("invalid control assignment {0:?}, expected NAME=VALUE")]
    BadControl(String),
    #[error("unknown pixel format {0:?}")]
    BadFormat(String),
}

impl From<CameraError> for Error {
    fn from(err: CameraError) -> Self {
        Error::Camera(err)
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    if std::env::var("RKCAM_LOG").is_err() {
        std::env::set_var("RKCAM_LOG", "info");
    }
    if args.verbose {
        std::env::set_var("RKCAM_LOG", "trace");
    }
    pretty_env_logger::try_init_custom_env("RKCAM_LOG").expect("failed to initialize logger");

    let pixel_format =
        PixelFormat::from_name(&args.format).ok_or_else(|| Error::BadFormat(args.format.clone()))?;
    let controls = args
        .controls
        .iter()
        .map(|s| parse_control(s))
        .collect::<Result<Vec<_>, _>>()?;

    let config = Config::new()
        .with_write_verify(args.verify)
        .with_flash(args.flash);
    let bus = simulated_bus(args.sensor.descriptor());
    let mut cam = Camera::with_config(bus, FakePlatform::new(), config);

    match cam.probe() {
        Ok(desc) => info!("bound {} at {:#04x}", desc.name, desc.bus_address),
        Err(rkcam::Error::NoDeviceFound) => {
            println!("no camera found");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }
    cam.init()?;
    report_traffic(&mut cam, "init");

    let format = match cam.set_format(args.width, args.height, pixel_format) {
        Ok(format) => format,
        Err(rkcam::Error::FormatUnsupported(format)) => {
            warn!(
                "{}x{} is not available, fell back to {}x{}",
                args.width, args.height, format.width, format.height
            );
            format
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "{}: {}x{} {}",
        cam.name(),
        format.width,
        format.height,
        String::from_utf8_lossy(&format.pixel_format.fourcc())
    );
    report_traffic(&mut cam, "set_format");

    if let Err(err) = cam.set_controls(&controls) {
        let (id, _) = controls[err.index];
        return Err(Error::Control {
            control: id.name().to_string(),
            error: err.error,
        });
    }
    report_traffic(&mut cam, "controls");

    for line in &args.console {
        let reply = cam.console(line)?;
        println!("{}", reply);
    }

    for id in ControlId::ALL.iter().copied() {
        if let Ok(v) = cam.get_control(id) {
            println!("  {} = {}", id.name(), v);
        }
    }

    cam.deactivate()?;
    let slept = cam.borrow_platform().slept_ms();
    info!("{} powered down, {} ms spent settling", cam.name(), slept);
    Ok(())
}

/// A bus with the given sensor, if any, answering with its identity.
fn simulated_bus(desc: Option<&SensorDescriptor>) -> FakeInterface {
    let desc = match desc {
        Some(desc) => desc,
        None => return FakeInterface::new(),
    };
    let (hi, lo) = desc.id_registers;
    FakeInterface::new().with_registers(
        desc.bus_address,
        &[
            (hi, (desc.expected_id >> 8) as u8),
            (lo, (desc.expected_id & 0xff) as u8),
        ],
    )
}

fn parse_control(s: &str) -> Result<(ControlId, i32), Error> {
    let bad = || Error::BadControl(s.to_string());
    let (name, value) = s.split_once('=').ok_or_else(bad)?;
    let id = ControlId::from_name(name.trim()).ok_or_else(bad)?;
    let value = value.trim().parse::<i32>().map_err(|_| bad())?;
    Ok((id, value))
}

fn report_traffic(cam: &mut FakeCamera, step: &str) {
    let writes = cam.borrow_interface().writes().len();
    let calls = cam.borrow_interface().take_calls().len();
    let events = cam.borrow_platform().take_events();
    let flashes: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Flash(state) => Some(format!("{:?}", state)),
            _ => None,
        })
        .collect();
    info!(
        "{}: {} bus transactions ({} writes), {} platform events",
        step,
        calls,
        writes,
        events.len()
    );
    if !flashes.is_empty() {
        info!("{}: flash {}", step, flashes.join(" -> "));
    }
}
