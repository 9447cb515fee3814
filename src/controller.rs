use crate::{
    board::{
        LOW_VOLTAGE_THRESHOLD, POLL_INTERVAL, RELAY_HOLD_DUTY, RELAY_OPERATE_TIME,
        RELAY_RELEASE_TIME, SENSE_SCALING,
    },
    error::{Error, Result},
    hal::PowerBoardHal,
    selector::{SelectorState, SourceReadings},
    source::{SOURCE_COUNT, Source},
};
use embedded_hal::digital::PinState;
use strum::IntoEnumIterator;

/// You can create a FailoverController over anything which implements
/// [PowerBoardHal].
///
/// The controller owns the whole selection state machine: it picks which
/// battery feeds the bus and drives the relay sequencing for every change,
/// reporting its position through [SelectorState]. Exactly one relay is
/// closed while a source is active, and none while halted or before startup.
pub struct FailoverController<H: PowerBoardHal> {
    hal: H,
    state: SelectorState,
}

impl<H: PowerBoardHal> FailoverController<H> {
    /// Create a new controller with every switch presumed open.
    pub fn new(hal: H) -> Self {
        Self {
            hal,
            state: SelectorState::Uninitialized,
        }
    }

    /// Current position in the selection lifecycle.
    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// The source currently feeding the bus, if one is engaged.
    pub fn active_source(&self) -> Option<Source> {
        self.state.active_source()
    }

    /// Tear down the controller and hand the HAL back.
    ///
    /// The hardware keeps whatever relay state it is in; callers that want
    /// the bus dead first should wait for [SelectorState::Halted].
    pub fn release(self) -> H {
        self.hal
    }

    /// Bring the board up and engage the first healthy source.
    ///
    /// All switches are configured and driven open before anything else
    /// happens; a warm restart may find a relay still closed, and the first
    /// measurement must not run while two batteries could be tied together.
    /// After one release settle the ADC moves to the external reference and
    /// the sense inputs are configured; all three sources are then measured
    /// in priority order. The first one strictly above
    /// [LOW_VOLTAGE_THRESHOLD](crate::board::LOW_VOLTAGE_THRESHOLD) is
    /// engaged; if none qualifies the controller goes straight to
    /// [SelectorState::Halted] with nothing engaged.
    pub fn start(&mut self) -> Result<SelectorState, H::Error> {
        if self.state != SelectorState::Uninitialized {
            return Err(Error::AlreadyStarted);
        }

        for source in Source::iter() {
            let switch = source.channels().switch;
            self.hal
                .configure_switch_output(switch)
                .map_err(Error::Hal)?;
            self.hal
                .set_switch_level(switch, PinState::Low)
                .map_err(Error::Hal)?;
        }
        self.hal.delay_ms(RELAY_RELEASE_TIME.to_millis());

        self.hal
            .select_external_adc_reference()
            .map_err(Error::Hal)?;
        for source in Source::iter() {
            self.hal
                .configure_sense_input(source.channels().sense)
                .map_err(Error::Hal)?;
        }

        let readings = self.measure_all()?;
        self.state = match readings.first_above(LOW_VOLTAGE_THRESHOLD) {
            Some(source) => {
                self.engage(source)?;
                SelectorState::Active(source)
            }
            None => SelectorState::Halted,
        };
        Ok(self.state)
    }

    /// Run one check of the active source, switching or halting as needed.
    ///
    /// While the active source reads strictly above the threshold this does
    /// nothing beyond that single read. Once it sags to or below the
    /// threshold, all three sources are re-measured: if every one of them is
    /// at or below the threshold the active relay opens and the controller
    /// halts for good, otherwise the bus moves to the better of the two
    /// candidates. A fault mid-switch surfaces as [Error::Hal] with the
    /// state tracking the relays: the sagging source stays on record until
    /// its relay has opened, and the target is on record from then on.
    /// Polling a halted controller is a side-effect-free no-op; polling
    /// before [Self::start] is [Error::NotStarted].
    pub fn poll(&mut self) -> Result<SelectorState, H::Error> {
        let active = match self.state {
            SelectorState::Uninitialized => return Err(Error::NotStarted),
            SelectorState::Halted => return Ok(SelectorState::Halted),
            SelectorState::Active(source) => source,
        };

        if self.read_source_voltage(active)? > LOW_VOLTAGE_THRESHOLD {
            return Ok(self.state);
        }

        let readings = self.measure_all()?;
        match readings.failover_target(active, LOW_VOLTAGE_THRESHOLD) {
            Some(target) => self.switch_over(active, target)?,
            None => {
                self.disengage(active)?;
                self.state = SelectorState::Halted;
            }
        }
        Ok(self.state)
    }

    /// Drive the controller until the batteries run out.
    ///
    /// Calls [Self::start] if startup has not run yet, then polls at
    /// [POLL_INTERVAL](crate::board::POLL_INTERVAL) until the controller
    /// halts, at which point this returns `Ok(())` and never acts again.
    /// Hardware faults abort the loop early.
    pub fn run(&mut self) -> Result<(), H::Error> {
        if self.state == SelectorState::Uninitialized {
            self.start()?;
        }

        loop {
            match self.poll()? {
                SelectorState::Active(_) => self.hal.delay_ms(POLL_INTERVAL.to_millis()),
                _ => return Ok(()),
            }
        }
    }

    /// Take one sample of a source's line voltage, in volts.
    ///
    /// Stateless: any source can be read at any time, engaged or not.
    pub fn read_source_voltage(&mut self, source: Source) -> Result<f32, H::Error> {
        let raw = self
            .hal
            .read_sense_raw(source.channels().sense)
            .map_err(Error::Hal)?;
        Ok(SENSE_SCALING.raw_to_volts(raw))
    }

    fn measure_all(&mut self) -> Result<SourceReadings, H::Error> {
        let mut volts = [0.0; SOURCE_COUNT];
        for source in Source::iter() {
            volts[source.index()] = self.read_source_voltage(source)?;
        }
        Ok(SourceReadings::new(volts))
    }

    /// Close a source's relay and back off to the hold duty.
    ///
    /// Full drive pulls the armature in; after the operate settle the coil
    /// only needs the reduced hold level.
    fn engage(&mut self, source: Source) -> Result<(), H::Error> {
        let switch = source.channels().switch;
        self.hal
            .set_switch_level(switch, PinState::High)
            .map_err(Error::Hal)?;
        self.hal.delay_ms(RELAY_OPERATE_TIME.to_millis());
        self.hal
            .set_switch_duty(switch, RELAY_HOLD_DUTY)
            .map_err(Error::Hal)?;
        Ok(())
    }

    fn disengage(&mut self, source: Source) -> Result<(), H::Error> {
        self.hal
            .set_switch_level(source.channels().switch, PinState::Low)
            .map_err(Error::Hal)?;
        self.hal.delay_ms(RELAY_RELEASE_TIME.to_millis());
        Ok(())
    }

    /// Break before make: the old relay must be fully open, release settle
    /// included, before the new coil is driven. The active record moves at
    /// the break; a fault later in the make must not put the old source back
    /// on record.
    fn switch_over(&mut self, old: Source, new: Source) -> Result<(), H::Error> {
        self.disengage(old)?;
        self.state = SelectorState::Active(new);
        self.engage(new)
    }
}
