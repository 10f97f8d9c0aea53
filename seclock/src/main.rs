mod config;
mod control;
mod controller;
mod display;
mod engine;
mod feedback;
mod password;

use crate::config::Config;
use crate::controller::Controller;
use crate::display::{ConsoleDisplay, show_banner};
use crate::engine::Engine;
use crate::feedback::GpioFeedback;
use crate::password::SharedPassword;
use dotenv::dotenv;
use eyre::WrapErr;
use log::{debug, info};
use seclock_gpio::GpioActiveLevel::Low;
use seclock_gpio::GpioBias::PullUp;
use seclock_gpio::GpioDriver;
use seclock_gpio::buzzer::Buzzer;
use seclock_gpio::keypad::MatrixKeypad;
use seclock_gpio::led::Led;
use seclock_gpio::raw::RawGpioDriver;
use seclock_gpio::servo::Servo;
use std::env::var;
use std::os::unix::net::UnixListener;
use std::thread;
use std::time::Duration;

fn parse_pin_bus(pin_str: &str) -> eyre::Result<[usize; 4]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Invalid number of pins in bus"))
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("seclock starting...");

    // Get pin numbers from env
    let led_pin_no: usize = var("SECLOCK_PIN_LED")?.parse()?;
    let buzzer_pin_no: usize = var("SECLOCK_PIN_BUZZER")?.parse()?;
    let servo_pin_no: usize = var("SECLOCK_PIN_SERVO")?.parse()?;
    let row_pin_nos: [usize; 4] = parse_pin_bus(&var("SECLOCK_PINS_ROWS")?)?;
    let col_pin_nos: [usize; 4] = parse_pin_bus(&var("SECLOCK_PINS_COLS")?)?;

    let socket_path = var("SECLOCK_SOCKET").unwrap_or_else(|_| "/run/seclock.sock".to_string());

    info!(
        "LED @ {}, Buzzer @ {}, Servo @ {}",
        led_pin_no, buzzer_pin_no, servo_pin_no
    );
    info!("Keypad @ Rows: {:?}, Cols: {:?}", row_pin_nos, col_pin_nos);

    debug!("Loading config...");
    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    debug!("Initializing GPIO driver...");
    let gpio = RawGpioDriver::new_gpiomem().wrap_err("Failed to open GPIO device")?;
    debug!("{:?} initialized.", gpio);

    // Every pin is acquired exactly once, here. Any failure is fatal:
    // the process refuses to start rather than run half-wired.
    let mut led_pin = gpio
        .get_pin(led_pin_no)
        .wrap_err_with(|| format!("Failed to acquire GPIO {led_pin_no} for LED"))?;
    let led_out = led_pin.as_output()?;
    let mut buzzer_pin = gpio
        .get_pin(buzzer_pin_no)
        .wrap_err_with(|| format!("Failed to acquire GPIO {buzzer_pin_no} for buzzer"))?;
    let buzzer_out = buzzer_pin.as_output()?;
    let mut servo_pin = gpio
        .get_pin(servo_pin_no)
        .wrap_err_with(|| format!("Failed to acquire GPIO {servo_pin_no} for servo"))?;
    let servo_out = servo_pin.as_output()?;

    debug!("Initializing keypad...");
    let mut row_bus = gpio
        .get_pin_bus(row_pin_nos)
        .wrap_err_with(|| format!("Failed to acquire GPIOs {row_pin_nos:?} for keypad rows"))?;
    let mut col_bus = gpio
        .get_pin_bus(col_pin_nos)
        .wrap_err_with(|| format!("Failed to acquire GPIOs {col_pin_nos:?} for keypad columns"))?;
    // Selected row is driven low; columns idle high through the pull-ups
    // and read low when pressed.
    row_bus.set_active_level(Low)?;
    col_bus.set_bias(PullUp)?;
    col_bus.set_active_level(Low)?;
    let row_out = row_bus.as_output()?;
    let col_in = col_bus.as_input()?;

    let keypad = MatrixKeypad::new(&*row_out, &*col_in);
    debug!("{:?} initialized.", keypad);

    let mut display = ConsoleDisplay::default();
    show_banner(&mut display)?;

    let password = SharedPassword::new();

    debug!("Binding control socket at {socket_path}...");
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)
        .wrap_err_with(|| format!("Failed to bind control socket at {socket_path}"))?;
    let control_password = password.clone();
    thread::spawn(move || control::serve(listener, control_password));

    let feedback = GpioFeedback::new(
        Buzzer::new(&*buzzer_out),
        Led::new(&*led_out),
        Servo::new(&*servo_out),
        Duration::from_millis(config.unlock_hold_ms),
    );

    let mut controller = Controller::new(&keypad, Engine::new(password), Box::new(feedback));

    let scan_interval = Duration::from_millis(config.scan_interval_ms);

    info!("seclock initialized. Starting scan loop...");

    // The next sweep is scheduled relative to "now": a cycle whose
    // feedback blocks (the unlock hold does, for seconds) simply pushes
    // every later sweep back.
    loop {
        controller.tick()?;
        thread::sleep(scan_interval);
    }
}
