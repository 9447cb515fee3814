use std::env;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use inquire::Select;
use pdb_failover::board::SENSE_SCALING;
use pdb_failover::controller::FailoverController;
use pdb_failover::hal::PowerBoardHal;
use pdb_failover::source::{SOURCE_COUNT, Source};
use strum::IntoEnumIterator;

// Configuration constants - adjust these for your simulated pack
// Discharge is wildly accelerated so a whole run lasts seconds of simulated
// time; only the engaged battery discharges.
const DISCHARGE_VOLTS_PER_SECOND: f32 = 2.0;

struct Scenario {
    name: &'static str,
    volts: [f32; SOURCE_COUNT],
}

const SCENARIOS: [Scenario; 3] = [
    Scenario {
        name: "staggered-depletion",
        volts: [37.0, 34.0, 32.0],
    },
    Scenario {
        // Startup still picks battery 1: selection is priority-ordered, and
        // only failover chases the best candidate.
        name: "second-battery-fresher",
        volts: [31.0, 37.0, 33.0],
    },
    Scenario {
        name: "dead-on-arrival",
        volts: [29.0, 28.5, 24.0],
    },
];

/// Three simulated batteries behind the board's HAL contract.
pub struct SimBoard {
    /// Line voltage of each battery.
    volts: [f32; SOURCE_COUNT],
    /// Which battery's relay is closed, if any.
    engaged: Option<Source>,
    /// Simulated wall clock, advanced only by the controller's delays.
    elapsed_ms: u64,
    /// Last whole-volt figure printed per battery, to keep the log short.
    last_printed: [i32; SOURCE_COUNT],
}

impl SimBoard {
    pub fn new(volts: [f32; SOURCE_COUNT]) -> Self {
        Self {
            volts,
            engaged: None,
            elapsed_ms: 0,
            last_printed: [i32::MIN; SOURCE_COUNT],
        }
    }

    pub fn volts(&self, source: Source) -> f32 {
        self.volts[source.index()].max(0.0)
    }

    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }

    fn advance_ms(&mut self, ms: u32) {
        self.elapsed_ms += u64::from(ms);
        if let Some(active) = self.engaged {
            self.volts[active.index()] -= DISCHARGE_VOLTS_PER_SECOND * ms as f32 / 1000.0;
        }
    }

    fn battery_for_switch(channel: u8) -> Source {
        Source::iter()
            .find(|source| source.channels().switch == channel)
            .expect("switch drive on a channel the board does not route")
    }

    fn note_volts(&mut self, source: Source, volts: f32) {
        let whole = volts as i32;
        if self.last_printed[source.index()] != whole {
            self.last_printed[source.index()] = whole;
            println!(
                "[{:6.1}s] battery {} reads {:.1} V",
                self.elapsed_s(),
                u8::from(source),
                volts
            );
        }
    }
}

impl DelayNs for SimBoard {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_ms(ns.div_ceil(1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ms(ms);
    }
}

impl PowerBoardHal for SimBoard {
    type Error = core::convert::Infallible;

    fn select_external_adc_reference(&mut self) -> Result<(), Self::Error> {
        println!("[{:6.1}s] ADC moved to the external reference", self.elapsed_s());
        Ok(())
    }

    fn configure_switch_output(&mut self, _channel: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn configure_sense_input(&mut self, _channel: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_switch_level(&mut self, channel: u8, level: PinState) -> Result<(), Self::Error> {
        let battery = Self::battery_for_switch(channel);
        match level {
            PinState::High => {
                println!(
                    "[{:6.1}s] battery {} relay energised at full drive",
                    self.elapsed_s(),
                    u8::from(battery)
                );
                self.engaged = Some(battery);
            }
            PinState::Low => {
                if self.engaged == Some(battery) {
                    println!(
                        "[{:6.1}s] battery {} relay released",
                        self.elapsed_s(),
                        u8::from(battery)
                    );
                    self.engaged = None;
                }
            }
        }
        Ok(())
    }

    fn set_switch_duty(&mut self, channel: u8, duty: u8) -> Result<(), Self::Error> {
        let battery = Self::battery_for_switch(channel);
        println!(
            "[{:6.1}s] battery {} relay held at duty {}/255",
            self.elapsed_s(),
            u8::from(battery),
            duty
        );
        Ok(())
    }

    fn read_sense_raw(&mut self, channel: u8) -> Result<u16, Self::Error> {
        let source = Source::iter()
            .find(|source| source.channels().sense == channel)
            .expect("sense read on a channel the board does not route");
        let volts = self.volts(source);
        self.note_volts(source, volts);
        Ok(SENSE_SCALING.volts_to_raw(volts))
    }
}

fn main() {
    // Get the scenario from a command line arg or interactive selection
    let name = env::args().nth(1).unwrap_or_else(|| {
        let names: Vec<&str> = SCENARIOS.iter().map(|scenario| scenario.name).collect();
        Select::new("Select a battery scenario:", names)
            .prompt()
            .expect("Failed to select scenario")
            .to_string()
    });

    let Some(scenario) = SCENARIOS.iter().find(|scenario| scenario.name == name) else {
        eprintln!("Unknown scenario: {name}");
        eprintln!("Available scenarios:");
        for scenario in &SCENARIOS {
            eprintln!("  {}", scenario.name);
        }
        std::process::exit(1);
    };

    println!("Scenario: {}", scenario.name);
    for source in Source::iter() {
        println!(
            "  battery {} starts at {:.1} V",
            u8::from(source),
            scenario.volts[source.index()]
        );
    }
    println!();

    let board = SimBoard::new(scenario.volts);
    let mut controller = FailoverController::new(board);

    // Runs the whole life of the pack, from startup selection through each
    // failover to the final halt once nothing is left.
    controller.run().expect("simulated hardware cannot fail");

    let board = controller.release();
    println!("\n--- Halted after {:.1} s of simulated time ---", board.elapsed_s());
    for source in Source::iter() {
        println!("  battery {} left at {:.1} V", u8::from(source), board.volts(source));
    }
}
