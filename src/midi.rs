use crate::constants::MIDI_CLIENT_NAME;
use crate::error::{PulseError, Result};
use midir::{MidiOutput, MidiOutputConnection};

const CONTROL_CHANGE: u8 = 0xB0;

/// Raw 3-byte control change message.
pub fn control_change(channel: u8, controller: u8, value: u8) -> [u8; 3] {
    [CONTROL_CHANGE | (channel & 0x0F), controller & 0x7F, value & 0x7F]
}

pub trait Sink {
    fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> Result<()> {
        (**self).send_cc(channel, controller, value)
    }
}

/// MIDI output through the system driver.
pub struct MidirSink {
    conn: Option<MidiOutputConnection>,
    port_name: String,
}

impl MidirSink {
    /// Opens the port named exactly `wanted`, falling back to the first
    /// port whose name contains it.
    pub fn connect(wanted: &str) -> Result<Self> {
        let out = MidiOutput::new(MIDI_CLIENT_NAME).map_err(PulseError::midi)?;
        let ports = out.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| out.port_name(p).unwrap_or_default())
            .collect();

        let idx = names
            .iter()
            .position(|n| n == wanted)
            .or_else(|| names.iter().position(|n| n.contains(wanted)))
            .ok_or_else(|| PulseError::PortNotFound(wanted.to_string()))?;

        let port_name = names[idx].clone();
        let conn = out
            .connect(&ports[idx], "pulse_midi-out")
            .map_err(PulseError::midi)?;
        tracing::info!(port = %port_name, "found outport");

        Ok(Self {
            conn: Some(conn),
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Sink for MidirSink {
    fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| PulseError::Midi("connection closed".into()))?;
        conn.send(&control_change(channel, controller, value))
            .map_err(PulseError::midi)
    }
}

impl Drop for MidirSink {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = conn.close();
            tracing::debug!(port = %self.port_name, "midi port closed");
        }
    }
}

pub fn list_output_ports() -> Result<Vec<String>> {
    let out = MidiOutput::new(MIDI_CLIENT_NAME).map_err(PulseError::midi)?;
    Ok(out
        .ports()
        .iter()
        .map(|p| out.port_name(p).unwrap_or_default())
        .collect())
}
