//! GPIO cuff pump output
//!
//! Drives the pump through a MOSFET or relay on a single output pin.

use embedded_hal::digital::OutputPin;
use vitalwatch_core::traits::PumpOutput;

/// Cuff pump on a GPIO pin
///
/// A pin write error latches [`GpioPump::has_fault`]; the logical state
/// still follows the last request so the cuff sequence can finish.
pub struct GpioPump<P> {
    pin: P,
    /// If true, pump ON = pin LOW
    inverted: bool,
    on: bool,
    fault: bool,
}

impl<P: OutputPin> GpioPump<P> {
    /// Create a pump output; the pump starts off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut pump = Self {
            pin,
            inverted,
            on: false,
            fault: false,
        };
        pump.set_on(false);
        pump
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Whether a pin write has failed since creation
    pub fn has_fault(&self) -> bool {
        self.fault
    }

    /// Release the pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> PumpOutput for GpioPump<P> {
    fn set_on(&mut self, on: bool) {
        self.on = on;

        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            self.fault = true;
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
