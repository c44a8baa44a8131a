use anyhow::{Context, Result};

/// List serial ports
pub fn run() -> Result<()> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for port in ports {
        let kind = match &port.port_type {
            serialport::SerialPortType::UsbPort(info) => format!(
                "USB {:04x}:{:04x}{}",
                info.vid,
                info.pid,
                info.product
                    .as_deref()
                    .map(|p| format!(" {}", p))
                    .unwrap_or_default()
            ),
            serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            serialport::SerialPortType::PciPort => "PCI".to_string(),
            serialport::SerialPortType::Unknown => "Unknown".to_string(),
        };
        println!("{:<20} {}", port.port_name, kind);
    }
    Ok(())
}
