//! Performance session
//!
//! One owner for the whole control pipeline:
//!
//! ```text
//! frames ─► BioSignalInference ─► StyleVector
//! controls ─► [TemporalSmoother] ─► HybridAgent ─► ResponseVector ─┐
//!                              └─► SequenceMemory ─► prediction ───┴─► blend ─► render controls
//! ```
//!
//! The input smoother is optional; without one, controls reach the agent as given.
//!
//! Every hot-path method takes `&mut self`. Wrap the session in
//! [`crate::SharedSession`] to drive it from more than one thread.

use crate::logger::{InteractionLogger, SessionSummary};
use crate::queue::FrameConsumer;
use crate::watchdog::{DeadlineWatchdog, WatchdogReport};
use bj_agent::{
    AgentSnapshot, EnrichmentStatus, HybridAgent, JitterSource, SequenceMemory, TemporalSmoother,
};
use bj_core::{
    BehavioralState, BjResult, ControlVector, LatencyStats, ResponseVector, SessionConfig,
    StyleVector,
};
use bj_features::{BioSignalInference, SignalFrame};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Result of one interaction step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOutput {
    pub response: ResponseVector,
    /// Sequence memory prediction, when a predictor is loaded
    pub prediction: Option<ControlVector>,
    /// Controls for the renderer: response controls blended with the prediction
    pub render_controls: ControlVector,
    pub state: BehavioralState,
}

/// Session-wide diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub summary: SessionSummary,
    pub inference_latency: LatencyStats,
    pub watchdog: WatchdogReport,
    pub agent: AgentSnapshot,
    pub dialogue: EnrichmentStatus,
}

/// Single-writer owner of inference, agent and memory
#[derive(Debug)]
pub struct PerformanceSession {
    config: SessionConfig,
    inference: BioSignalInference,
    agent: HybridAgent,
    memory: SequenceMemory,
    logger: InteractionLogger,
    watchdog: DeadlineWatchdog,
    input_smoother: Option<TemporalSmoother>,
    last_style: Option<StyleVector>,
}

impl PerformanceSession {
    /// Validate the config and build every component
    pub fn new(config: SessionConfig) -> BjResult<Self> {
        config.validate()?;
        let inference = BioSignalInference::new(config.inference.clone())?;
        let agent = HybridAgent::new(&config.agent)?;
        let memory = SequenceMemory::new(&config.memory)?;
        let logger = InteractionLogger::new(config.inference.latency_window);
        let watchdog = DeadlineWatchdog::new(config.latency_budget_ms);

        log::info!(
            "PerformanceSession ready: budget {} ms, personalization {}, dialogue {}",
            config.latency_budget_ms,
            agent.personalization(),
            memory.status()
        );

        Ok(Self {
            config,
            inference,
            agent,
            memory,
            logger,
            watchdog,
            input_smoother: None,
            last_style: None,
        })
    }

    /// Replace the agent (e.g. one with an injected personalizer)
    pub fn with_agent(mut self, agent: HybridAgent) -> Self {
        self.agent = agent;
        self
    }

    /// Replace the sequence memory (e.g. one with an injected predictor)
    pub fn with_memory(mut self, memory: SequenceMemory) -> Self {
        self.memory = memory;
        self
    }

    /// Smooth performer controls before the agent and memory see them
    pub fn with_input_smoother(mut self, smoother: TemporalSmoother) -> Self {
        self.input_smoother = Some(smoother);
        self
    }

    pub fn input_smoother(&self) -> Option<&TemporalSmoother> {
        self.input_smoother.as_ref()
    }

    fn smooth_input(&mut self, controls: &ControlVector) -> ControlVector {
        match self.input_smoother.as_mut() {
            Some(smoother) => smoother.update(&controls.normalized()),
            None => *controls,
        }
    }

    /// Swap the agent's jitter source
    pub fn set_jitter(&mut self, jitter: Box<dyn JitterSource>) {
        self.agent.set_jitter(jitter);
    }

    // ============ Hot Path ============

    /// Biosignal frame → style vector
    pub fn process_frame(
        &mut self,
        eeg: &SignalFrame,
        fnirs: &SignalFrame,
        emg: &SignalFrame,
    ) -> BjResult<StyleVector> {
        let start = Instant::now();
        let style = self.inference.process_frame(eeg, fnirs, emg)?;
        self.watchdog.observe("process_frame", start.elapsed());
        self.last_style = Some(style);
        Ok(style)
    }

    /// Performer controls → agent response (no memory, no logging)
    pub fn respond(&mut self, controls: &ControlVector) -> ResponseVector {
        let start = Instant::now();
        let controls = self.smooth_input(controls);
        let response = self.agent.respond(&controls);
        self.watchdog.observe("respond", start.elapsed());
        response
    }

    /// Full interaction step: respond, remember, predict, blend
    pub fn step(&mut self, controls: &ControlVector) -> SessionOutput {
        let start = Instant::now();

        let controls = self.smooth_input(controls);
        let response = self.agent.respond(&controls);
        self.memory.add_context(controls);
        let prediction = self.memory.predict_response();
        let render_controls = self
            .memory
            .blend(&response.as_controls(), prediction.as_ref())
            .normalized();

        let elapsed = start.elapsed();
        self.logger.record(elapsed, render_controls);
        self.watchdog.observe("step", elapsed);

        SessionOutput {
            response,
            prediction,
            render_controls,
            state: self.agent.state(),
        }
    }

    /// Process every queued frame; returns the style of the last one
    ///
    /// Stops at the first invalid frame and returns its error; frames after
    /// it stay queued.
    pub fn drain_frames(&mut self, frames: &mut FrameConsumer) -> BjResult<Option<StyleVector>> {
        let mut last = None;
        while let Ok(packet) = frames.pop() {
            last = Some(self.process_frame(&packet.eeg, &packet.fnirs, &packet.emg)?);
        }
        Ok(last)
    }

    // ============ State ============

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn inference(&self) -> &BioSignalInference {
        &self.inference
    }

    pub fn agent(&self) -> &HybridAgent {
        &self.agent
    }

    pub fn memory(&self) -> &SequenceMemory {
        &self.memory
    }

    pub fn logger(&self) -> &InteractionLogger {
        &self.logger
    }

    pub fn watchdog(&self) -> &DeadlineWatchdog {
        &self.watchdog
    }

    /// Style vector of the most recent frame
    pub fn last_style(&self) -> Option<StyleVector> {
        self.last_style
    }

    pub fn state(&self) -> BehavioralState {
        self.agent.state()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            summary: self.logger.summary(),
            inference_latency: self.inference.performance_stats(),
            watchdog: self.watchdog.report(),
            agent: self.agent.snapshot(),
            dialogue: self.memory.status().clone(),
        }
    }

    /// Clear every component back to its freshly constructed state
    pub fn reset(&mut self) {
        self.inference.reset();
        self.agent.reset();
        self.memory.reset();
        self.logger.clear();
        self.watchdog.reset();
        if let Some(smoother) = self.input_smoother.as_mut() {
            smoother.reset();
        }
        self.last_style = None;
        log::debug!("PerformanceSession reset");
    }
}
