use anyhow::{Context, Result};
use std::path::PathBuf;

/// Apply display-unit timing values with the device entry rules
pub fn run(
    config_path: Option<PathBuf>,
    sh: Option<u64>,
    icg: Option<u64>,
    delay: Option<i64>,
) -> Result<()> {
    let config = super::open_store(config_path.as_deref())?;

    if sh.is_some() || icg.is_some() || delay.is_some() {
        config.update(|settings| {
            let timing = &mut settings.timing;
            if let Some(sh) = sh {
                timing.set_sh_display(sh);
            }
            if let Some(icg) = icg {
                timing.set_icg_display(icg);
            }
            if let Some(delay) = delay {
                timing.set_trigger_delay(delay);
            }
        });
        config.save().context("Failed to save settings")?;
    }

    let timing = &config.snapshot().settings.timing;
    println!("SH period:     {} (device {})", timing.sh_display(), timing.sh_period);
    println!("ICG period:    {} (device {})", timing.icg_display(), timing.icg_period);
    println!("Trigger delay: {}", timing.trigger_delay);
    println!("Exposure:      {} ms", timing.expected_capture_ms());
    Ok(())
}
