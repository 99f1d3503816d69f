//! Door contact input adapter.
//!
//! - **`target_os = "espidf"`**: an `esp_idf_hal` [`PinDriver`] in input
//!   mode with the internal pull-up enabled, so a reed switch to GND reads
//!   HIGH while the magnet is away.
//! - **all other targets**: a settable level for host-side runs.

#[cfg(target_os = "espidf")]
use crate::app::ports::HalDoorInput;
#[cfg(not(target_os = "espidf"))]
use crate::app::ports::DoorInputPort;
#[cfg(not(target_os = "espidf"))]
use crate::error::InputError;

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};

#[cfg(target_os = "espidf")]
pub type DoorContact = HalDoorInput<PinDriver<'static, AnyIOPin, Input>>;

/// Configure GPIO `gpio` as the door contact input.
#[cfg(target_os = "espidf")]
pub fn door_contact(gpio: i32) -> Result<DoorContact, esp_idf_svc::sys::EspError> {
    // SAFETY: called once at boot; no other driver is bound to this pin
    // (see crate::pins).
    let pin = unsafe { AnyIOPin::new(gpio) };
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    log::info!("Door contact: GPIO{} input, pull-up", gpio);
    Ok(HalDoorInput::new(driver))
}

/// Simulated contact; the level is set by the caller.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy)]
pub struct SimDoorContact {
    level: bool,
    faulted: bool,
}

#[cfg(not(target_os = "espidf"))]
impl SimDoorContact {
    pub fn new(level: bool) -> Self {
        Self {
            level,
            faulted: false,
        }
    }

    pub fn set_level(&mut self, level: bool) {
        self.level = level;
    }

    /// Make subsequent reads fail until cleared.
    pub fn set_faulted(&mut self, faulted: bool) {
        self.faulted = faulted;
    }
}

#[cfg(not(target_os = "espidf"))]
impl DoorInputPort for SimDoorContact {
    fn read_raw(&mut self) -> Result<bool, InputError> {
        if self.faulted {
            return Err(InputError::GpioReadFailed);
        }
        Ok(self.level)
    }
}
