//! GRAFIK Eye command encoding and response parsing
//!
//! The panel speaks a line-oriented text protocol over the QSE network
//! interface. Outbound zone commands carry the brightness as a percentage
//! with exactly two decimal places; the firmware rejects anything else, so
//! the formatting here must stay bit-identical.
//!
//! Inbound lines are prefixed with the interactive `QSE>` prompt which has
//! to be stripped before classification. Parsing is pure; callers decide
//! what to do with the returned [`PanelEvent`].

/// Integration ID the panel is assigned on the QSE bus.
pub const INTEGRATION_ID: u8 = 1;
/// Component number carrying a zone brightness level.
pub const COMPONENT_ZONE_LEVEL: u32 = 14;
/// Error code the interface reports when it needs a firmware reset.
pub const ERROR_FIRMWARE_FAULT: u32 = 6;
/// Button component: "all zones up", disables programmatic control.
pub const BUTTON_DISABLE: u32 = 74;
/// Button component: "all zones down", re-enables programmatic control.
pub const BUTTON_ENABLE: u32 = 75;
/// Action code reported for a button press.
const BUTTON_PRESS_ACTION: u32 = 3;

/// Interactive prompt token the interface prepends to lines.
const PROMPT: &str = "QSE>";

/// A classified line received from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// `~ERROR,<code>` response.
    ErrorCode(u32),
    /// A button press report (`~DEVICE,1,<id>,3`).
    Button(u32),
    /// A device report with a value (`~DEVICE,1,<zone>,<component>,<value>`).
    DeviceReport {
        /// Zone number the report refers to.
        zone: u32,
        /// Component number (14 = brightness level).
        component: u32,
        /// Reported value; a percentage for brightness reports.
        value: f64,
    },
    /// Line was only prompt/whitespace.
    Empty,
    /// Anything we do not understand.
    Unrecognized(String),
}

/// Map a 0-255 brightness level to the panel's percent scale, rounded to
/// two decimal places.
pub fn level_to_percent(level: u8) -> f64 {
    (f64::from(level) / 255.0 * 100.0 * 100.0).round() / 100.0
}

/// Map a panel percentage (0.00-100.00) back to a 0-255 brightness level.
pub fn percent_to_level(percent: f64) -> u8 {
    (percent / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Build the command that sets a zone's brightness.
///
/// `level` is the raw 0-255 value; the panel wants a two-decimal percent.
pub fn encode_set_zone(zone: u16, level: u8) -> String {
    format!(
        "#DEVICE,{},{},{},{:.2},00:00\r\n",
        INTEGRATION_ID,
        zone,
        COMPONENT_ZONE_LEVEL,
        level_to_percent(level)
    )
}

/// Command that reboots the QSE network interface.
pub fn reset_command() -> &'static str {
    "#RESET,0\r\n"
}

/// Classify one raw line from the panel.
pub fn decode_line(raw: &str) -> PanelEvent {
    let stripped = raw.replace(PROMPT, "");
    let line = stripped.trim();
    if line.is_empty() {
        return PanelEvent::Empty;
    }

    if let Some(rest) = line.strip_prefix("~ERROR,") {
        if let Ok(code) = rest.trim().parse::<u32>() {
            return PanelEvent::ErrorCode(code);
        }
        return PanelEvent::Unrecognized(line.to_string());
    }

    if let Some(rest) = line.strip_prefix("~DEVICE,1,") {
        let fields: Vec<&str> = rest.split(',').collect();
        match fields.len() {
            // ~DEVICE,1,<id>,<action>
            2 => {
                if let (Ok(id), Ok(action)) =
                    (fields[0].parse::<u32>(), fields[1].parse::<u32>())
                {
                    if action == BUTTON_PRESS_ACTION {
                        return PanelEvent::Button(id);
                    }
                }
            }
            // ~DEVICE,1,<zone>,<component>,<value>[,...]
            n if n >= 3 => {
                if let (Ok(zone), Ok(component), Ok(value)) = (
                    fields[0].parse::<u32>(),
                    fields[1].parse::<u32>(),
                    fields[2].parse::<f64>(),
                ) {
                    return PanelEvent::DeviceReport {
                        zone,
                        component,
                        value,
                    };
                }
            }
            _ => {}
        }
    }

    PanelEvent::Unrecognized(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_set_zone_format() {
        assert_eq!(encode_set_zone(1, 0), "#DEVICE,1,1,14,0.00,00:00\r\n");
        assert_eq!(encode_set_zone(3, 255), "#DEVICE,1,3,14,100.00,00:00\r\n");
        assert_eq!(encode_set_zone(6, 128), "#DEVICE,1,6,14,50.20,00:00\r\n");
    }

    #[test]
    fn test_encode_scenario_percents() {
        let levels = [10u8, 20, 30, 40, 50, 60];
        let expected = ["3.92", "7.84", "11.76", "15.69", "19.61", "23.53"];
        for (i, (&level, pct)) in levels.iter().zip(expected).enumerate() {
            let zone = i as u16 + 1;
            assert_eq!(
                encode_set_zone(zone, level),
                format!("#DEVICE,1,{zone},14,{pct},00:00\r\n")
            );
        }
    }

    #[test]
    fn test_percent_round_trip() {
        for level in 0..=255u8 {
            let pct = level_to_percent(level);
            let exact = f64::from(level) / 255.0 * 100.0;
            assert!((pct - exact).abs() <= 0.01, "level {level}: {pct} vs {exact}");
            assert_eq!(percent_to_level(pct), level, "level {level}");
            // A second round trip must be stable.
            assert_eq!(level_to_percent(percent_to_level(pct)), pct);
        }
    }

    #[test]
    fn test_decode_strips_prompt() {
        assert_eq!(decode_line("QSE>~ERROR,6"), PanelEvent::ErrorCode(6));
        assert_eq!(decode_line("QSE>QSE>"), PanelEvent::Empty);
        assert_eq!(decode_line("  \r\n"), PanelEvent::Empty);
    }

    #[test]
    fn test_decode_buttons() {
        assert_eq!(decode_line("~DEVICE,1,74,3"), PanelEvent::Button(74));
        assert_eq!(decode_line("~DEVICE,1,75,3"), PanelEvent::Button(75));
    }

    #[test]
    fn test_decode_device_report() {
        assert_eq!(
            decode_line("QSE>~DEVICE,1,1,14,42.75"),
            PanelEvent::DeviceReport {
                zone: 1,
                component: 14,
                value: 42.75
            }
        );
        // Trailing fields are allowed.
        assert_eq!(
            decode_line("~DEVICE,1,2,14,0.00,00:00"),
            PanelEvent::DeviceReport {
                zone: 2,
                component: 14,
                value: 0.0
            }
        );
    }

    #[test]
    fn test_decode_unrecognized() {
        assert_eq!(
            decode_line("~OUTPUT,5,1,100.00"),
            PanelEvent::Unrecognized("~OUTPUT,5,1,100.00".to_string())
        );
        assert_eq!(
            decode_line("~DEVICE,1,garbage,3"),
            PanelEvent::Unrecognized("~DEVICE,1,garbage,3".to_string())
        );
    }
}
