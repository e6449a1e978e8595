//! Buttons and notifications.
//!
//! Channel-based hub between the robot's interaction hardware and the
//! behaviours. Button presses fan out to whichever behaviours are currently
//! subscribed; notifications (LED patterns and button prompts) fan out to
//! the hardware driver and any watching operator.

use tokio::sync::broadcast;

/// Hardware buttons on the robot's shoulder panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Go,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedPattern {
    #[default]
    RetainPrevious,
    Holding,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    RetainPrevious,
    On,
    Off,
}

/// A prompt for the interaction hardware: which LEDs to light and which
/// buttons to arm, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Notification {
    pub led_pattern: LedPattern,
    pub button_confirm: ButtonState,
    pub button_cancel: ButtonState,
    pub message: String,
}

const CHANNEL_CAPACITY: usize = 32;

/// Cheaply clonable interaction hub.
///
/// Pressing a button with no live subscriber is harmless, the event is
/// simply unobserved. Subscriptions only see events sent after they were
/// taken, which is what latched button checks rely on.
#[derive(Debug, Clone)]
pub struct Interactions {
    go: broadcast::Sender<Button>,
    stop: broadcast::Sender<Button>,
    notifications: broadcast::Sender<Notification>,
}

impl Default for Interactions {
    fn default() -> Self {
        Self::new()
    }
}

impl Interactions {
    pub fn new() -> Self {
        let (go, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (stop, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (notifications, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { go, stop, notifications }
    }

    pub fn press(&self, button: Button) {
        #[cfg(feature = "gopher_tracing")]
        tracing::info!("[interaction] button pressed: {:?}", button);
        let channel = match button {
            Button::Go => &self.go,
            Button::Stop => &self.stop,
        };
        let _ = channel.send(button);
    }

    pub fn subscribe(&self, button: Button) -> broadcast::Receiver<Button> {
        match button {
            Button::Go => self.go.subscribe(),
            Button::Stop => self.stop.subscribe(),
        }
    }

    pub fn notify(&self, notification: Notification) {
        #[cfg(feature = "gopher_tracing")]
        tracing::info!("[interaction] notify: {}", notification.message);
        let _ = self.notifications.send(notification);
    }

    pub fn watch(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}
