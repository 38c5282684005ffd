// MIDI output port discovery

use midir::{MidiOutput, MidiOutputPort};

const SCANNER_CLIENT_NAME: &str = "midia port scanner";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

pub struct MidiDeviceManager;

impl MidiDeviceManager {
    pub fn new() -> Self {
        Self
    }

    /// Lists every available MIDI output port
    pub fn list_output_ports(&self) -> Vec<MidiDeviceInfo> {
        let mut devices = Vec::new();

        // Temporary client used only to enumerate ports
        if let Ok(midi_out) = MidiOutput::new(SCANNER_CLIENT_NAME) {
            for (index, port) in midi_out.ports().iter().enumerate() {
                if let Ok(name) = midi_out.port_name(port) {
                    devices.push(MidiDeviceInfo {
                        id: format!("midi_out_{}", index),
                        name,
                        is_default: index == 0, // First port is treated as the default
                    });
                }
            }
        }

        devices
    }

    /// First available output port
    pub fn default_output_port(&self, client_name: &str) -> Option<(MidiOutput, MidiOutputPort)> {
        let midi_out = MidiOutput::new(client_name).ok()?;
        let port = midi_out.ports().into_iter().next()?;
        Some((midi_out, port))
    }

    /// Output port whose name matches `device_name` exactly
    pub fn output_port_by_name(
        &self,
        client_name: &str,
        device_name: &str,
    ) -> Option<(MidiOutput, MidiOutputPort)> {
        let midi_out = MidiOutput::new(client_name).ok()?;
        let port = midi_out
            .ports()
            .into_iter()
            .find(|port| midi_out.port_name(port).is_ok_and(|name| name == device_name))?;
        Some((midi_out, port))
    }
}

impl Default for MidiDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}
