//! Terminal colors for module labels

use colored::Color;

/// Label colors, kept clear of the red/yellow/green used for build status
const MODULE_PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
    Color::BrightCyan,
    Color::BrightBlue,
    Color::BrightMagenta,
    Color::TrueColor { r: 255, g: 140, b: 0 },
    Color::TrueColor { r: 120, g: 130, b: 255 },
];

/// A module keeps the same label color across runs
pub fn get_module_color(module_name: &str) -> Color {
    // FNV-1a
    let hash = module_name.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    MODULE_PALETTE[(hash % MODULE_PALETTE.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_color_is_stable() {
        assert_eq!(get_module_color("core"), get_module_color("core"));
    }

    #[test]
    fn test_module_colors_avoid_status_colors() {
        for name in ["core", "api", "web", "shop", "docs", "cli"] {
            let color = get_module_color(name);
            assert!(![Color::Red, Color::Green, Color::Yellow].contains(&color));
        }
    }
}
