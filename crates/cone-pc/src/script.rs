//! Orientation changes scripted from the command line.

use cone_hal::{DeviceOrientation, OrientationSource};

/// One `FRAME:ORIENTATION` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateEvent {
    pub frame: u32,
    pub orientation: DeviceOrientation,
}

/// Parse `FRAME:ORIENTATION`, e.g. `10:landscape-left`.
pub fn parse_rotate(arg: &str) -> Result<RotateEvent, String> {
    let (frame, name) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:ORIENTATION, got `{arg}`"))?;
    let frame = frame
        .trim()
        .parse()
        .map_err(|e| format!("invalid frame `{frame}`: {e}"))?;
    let orientation = DeviceOrientation::from_name(name.trim()).ok_or_else(|| {
        let known: Vec<&str> = DeviceOrientation::ALL.iter().map(|o| o.name()).collect();
        format!("unknown orientation `{name}` (expected one of: {})", known.join(", "))
    })?;
    Ok(RotateEvent { frame, orientation })
}

/// Replays [`RotateEvent`]s as the frame counter advances.
pub struct ScriptedOrientation {
    events: Vec<RotateEvent>,
    next: usize,
    frame: u32,
}

impl ScriptedOrientation {
    pub fn new(mut events: Vec<RotateEvent>) -> Self {
        // Stable: events on the same frame keep command-line order.
        events.sort_by_key(|e| e.frame);
        Self {
            events,
            next: 0,
            frame: 0,
        }
    }

    /// Move to `frame`. Events scheduled at or before it become pollable.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}

impl OrientationSource for ScriptedOrientation {
    fn init(&mut self) {
        log::info!("Scripted orientation: {} events", self.events.len());
        for event in &self.events {
            log::debug!("  frame {}: {}", event.frame, event.orientation.name());
        }
    }

    fn poll(&mut self) -> Option<DeviceOrientation> {
        let event = self.events.get(self.next)?;
        if event.frame > self.frame {
            return None;
        }
        self.next += 1;
        Some(event.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_and_orientation() {
        assert_eq!(
            parse_rotate("10:landscape-left"),
            Ok(RotateEvent {
                frame: 10,
                orientation: DeviceOrientation::LandscapeLeft,
            })
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(parse_rotate("landscape-left").is_err());
        assert!(parse_rotate("x:face-up").is_err());
        let err = parse_rotate("3:sideways").unwrap_err();
        assert!(err.contains("face-up"), "{err}");
    }

    #[test]
    fn events_fire_in_frame_order() {
        let mut source = ScriptedOrientation::new(vec![
            RotateEvent {
                frame: 5,
                orientation: DeviceOrientation::FaceUp,
            },
            RotateEvent {
                frame: 2,
                orientation: DeviceOrientation::LandscapeLeft,
            },
        ]);
        source.init();

        source.set_frame(1);
        assert_eq!(source.poll(), None);

        source.set_frame(2);
        assert_eq!(source.poll(), Some(DeviceOrientation::LandscapeLeft));
        assert_eq!(source.poll(), None);

        source.set_frame(9);
        assert_eq!(source.poll(), Some(DeviceOrientation::FaceUp));
        assert_eq!(source.remaining(), 0);
    }
}
