//! Trigger output and echo input lines

use crate::HalError;

/// Digital output driving the sensor's trigger input
pub trait TriggerPin: Send {
    fn set_high(&mut self) -> Result<(), HalError>;
    fn set_low(&mut self) -> Result<(), HalError>;
}

/// Edge events reported by one echo-line interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeEvents(u8);

impl EdgeEvents {
    /// Rising transition
    pub const RISE: EdgeEvents = EdgeEvents(0b01);
    /// Falling transition
    pub const FALL: EdgeEvents = EdgeEvents(0b10);
    /// Both transitions latched in the same interrupt
    pub const BOTH: EdgeEvents = EdgeEvents(0b11);

    pub fn is_rise(self) -> bool {
        self.0 & Self::RISE.0 != 0
    }

    pub fn is_fall(self) -> bool {
        self.0 & Self::FALL.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EdgeEvents {
    type Output = EdgeEvents;

    fn bitor(self, rhs: EdgeEvents) -> EdgeEvents {
        EdgeEvents(self.0 | rhs.0)
    }
}

/// Interrupt handler invoked with the latched edge events
pub type EdgeHandler = Box<dyn FnMut(EdgeEvents) + Send + 'static>;

/// Digital input with edge interrupts on both transitions
pub trait EchoLine {
    /// Route rising and falling edge interrupts to `handler`
    fn enable_interrupt(&mut self, handler: EdgeHandler) -> Result<(), HalError>;
}
