//! Sensor and actuator traits
//!
//! Each sensor is an external collaborator exposing a one-time setup call and
//! simple synchronous reads. Signal processing inside the drivers is not the
//! concern of this crate.

/// Value reported by a contact temperature probe that is not on the bus
pub const TEMPERATURE_DISCONNECTED_C: f32 = -127.0;

/// Optical pulse oximeter (red + infrared channels)
pub trait PulseOximeter {
    /// Probe the device and configure LEDs
    ///
    /// Returns `false` if the device did not answer.
    fn init(&mut self) -> bool;

    /// Latest infrared intensity, used as a skin-contact proxy
    fn ir(&mut self) -> u32;

    /// Latest red intensity
    fn red(&mut self) -> u32;

    /// Whether a new sample is waiting in the FIFO
    fn available(&mut self) -> bool;

    /// Poll the device for new samples
    fn check(&mut self);

    /// Advance the FIFO to the next sample
    fn next_sample(&mut self);
}

/// Heart-rate and SpO2 window computation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowEstimate {
    /// Heart rate in beats per minute
    pub heart_rate: i32,
    /// Whether `heart_rate` is trustworthy
    pub heart_rate_valid: bool,
    /// Oxygen saturation in percent
    pub spo2: i32,
    /// Whether `spo2` is trustworthy
    pub spo2_valid: bool,
}

/// Windowed heart-rate / SpO2 computation over paired IR and red samples
pub trait SpO2Algorithm {
    /// Compute heart rate and SpO2 from equally sized sample windows
    fn compute(&mut self, ir: &[u32], red: &[u32]) -> WindowEstimate;
}

/// Three-axis accelerometer
pub trait Accelerometer {
    /// Probe the device (including any alternate bus address)
    fn init(&mut self) -> bool;

    /// Read acceleration in g for X, Y and Z
    ///
    /// An axis the device failed to read is reported as NaN.
    fn read_axes(&mut self) -> [f32; 3];
}

/// Contact temperature probe on a shared one-wire style bus
pub trait TemperatureProbe {
    /// Start the bus driver
    fn begin(&mut self);

    /// Whether at least one probe answered on the bus
    ///
    /// Configures resolution and non-blocking conversion when present.
    fn is_present(&mut self) -> bool;

    /// Trigger a temperature conversion
    fn request_conversion(&mut self);

    /// Read back the last conversion in degrees Celsius
    ///
    /// Returns [`TEMPERATURE_DISCONNECTED_C`] when the probe is gone.
    fn read_celsius(&mut self) -> f32;
}

/// Strain-gauge load cell behind a cuff pressure ADC
pub trait PressureSensor {
    /// Start the ADC and apply the scale factor
    fn begin(&mut self);

    /// Whether a conversion is ready to be read
    fn is_ready(&mut self) -> bool;

    /// Zero the baseline at the current load
    fn tare(&mut self);

    /// Read one scaled sample
    fn read_units(&mut self) -> f32;
}

/// Cuff inflation pump
pub trait PumpOutput {
    /// Turn the pump on or off
    fn set_on(&mut self, on: bool);

    /// Check if the pump is currently on
    fn is_on(&self) -> bool;
}
