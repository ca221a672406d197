//! Staged startup sequence behind the preloader screen.
//!
//! The stages run strictly one after another: a short init pause, web fonts,
//! the images already in the document (awaited together, counted as each one
//! settles), a fixed stand-in delay for the 3D models and finally a timed
//! ramp to 100%. The ramp is driven by the host
//! clock, so the sequence ends even if nothing else ever reports in.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    pub fonts: Vec<String>,
    pub stage_delay_ms: u64,
    pub model_delay_ms: u64,
    pub ramp_duration_ms: u64,
    pub ramp_tick_ms: u64,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            fonts: vec!["Orbitron".to_string(), "Inter".to_string()],
            stage_delay_ms: 500,
            model_delay_ms: 1000,
            ramp_duration_ms: 4000,
            ramp_tick_ms: 50,
        }
    }
}

impl PreloadConfig {
    fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }

    fn ramp_tick(&self) -> Duration {
        Duration::from_millis(self.ramp_tick_ms.max(1))
    }

    /// Length of the whole sequence when fonts and images are already there.
    pub fn nominal_duration(&self) -> Duration {
        Duration::from_millis(
            self.stage_delay_ms * 4 + self.model_delay_ms + self.ramp_duration_ms,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Fonts,
    Images,
    Models,
    Ramp,
}

impl Stage {
    /// Progress reached once the stage has finished.
    pub fn checkpoint(self) -> u8 {
        match self {
            Stage::Init => 5,
            Stage::Fonts => 20,
            Stage::Images => 50,
            Stage::Models => 80,
            Stage::Ramp => 100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Fonts => "fonts",
            Stage::Images => "images",
            Stage::Models => "models",
            Stage::Ramp => "ramp",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreloadError {
    #[error("font loading failed: {0}")]
    Fonts(String),
    #[error("image lookup failed: {0}")]
    Images(String),
    #[error("scheduler failed: {0}")]
    Scheduler(String),
    #[error("preloader was unmounted")]
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadState {
    pub progress: u8,
    pub is_loading: bool,
}

impl Default for PreloadState {
    fn default() -> Self {
        Self {
            progress: 0,
            is_loading: true,
        }
    }
}

impl PreloadState {
    /// Moves progress forward; it never goes back and never passes 100.
    fn advance_to(&mut self, progress: u8) -> bool {
        let progress = progress.min(100);
        if progress > self.progress {
            self.progress = progress;
            true
        } else {
            false
        }
    }

    fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.is_loading, false)
    }
}

/// The environment the sequence waits on.
#[allow(async_fn_in_trait)]
pub trait PreloadHost {
    type Image;

    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    async fn sleep(&self, duration: Duration) -> Result<(), PreloadError>;
    async fn load_fonts(&self, families: &[String]) -> Result<(), PreloadError>;
    fn images(&self) -> Result<Vec<Self::Image>, PreloadError>;
    /// Resolves once the image has loaded or failed to load.
    async fn settle_image(&self, image: &Self::Image);
    async fn next_frame(&self) -> Result<(), PreloadError>;
    fn is_mounted(&self) -> bool;
    fn publish(&self, state: PreloadState);
}

pub struct PreloadSequencer {
    config: PreloadConfig,
    state: PreloadState,
}

impl PreloadSequencer {
    pub fn new(config: PreloadConfig) -> Self {
        Self {
            config,
            state: PreloadState::default(),
        }
    }

    pub fn state(&self) -> PreloadState {
        self.state
    }

    /// Runs every stage once. Errors end the sequence as if it had finished.
    pub async fn run<H: PreloadHost>(&mut self, host: &H) -> PreloadState {
        if !self.state.is_loading {
            return self.state;
        }
        match self.run_stages(host).await {
            Ok(()) => {}
            Err(PreloadError::Unmounted) => {
                log::debug!("preloader unmounted at {}%", self.state.progress);
            }
            Err(err) => {
                log::error!("error during preloading: {err}");
                self.complete(host);
            }
        }
        self.state
    }

    async fn run_stages<H: PreloadHost>(&mut self, host: &H) -> Result<(), PreloadError> {
        self.reach(host, Stage::Init.checkpoint())?;
        self.pause(host).await?;

        host.load_fonts(&self.config.fonts).await?;
        self.stage_done(host, Stage::Fonts).await?;

        let images = host.images()?;
        let total = images.len();
        let band = Stage::Images.checkpoint() - Stage::Fonts.checkpoint();
        let mut settling: FuturesUnordered<_> =
            images.iter().map(|image| host.settle_image(image)).collect();
        let mut loaded = 0;
        while settling.next().await.is_some() {
            loaded += 1;
            let share = (band as usize * loaded / total) as u8;
            self.reach(host, Stage::Fonts.checkpoint() + share)?;
        }
        self.stage_done(host, Stage::Images).await?;

        host.sleep(Duration::from_millis(self.config.model_delay_ms))
            .await?;
        self.stage_done(host, Stage::Models).await?;

        self.ramp(host).await?;
        host.next_frame().await?;
        self.ensure_mounted(host)?;
        self.complete(host);
        Ok(())
    }

    async fn stage_done<H: PreloadHost>(&mut self, host: &H, stage: Stage) -> Result<(), PreloadError> {
        log::debug!("preload stage {} done", stage.name());
        self.reach(host, stage.checkpoint())?;
        self.pause(host).await
    }

    async fn pause<H: PreloadHost>(&self, host: &H) -> Result<(), PreloadError> {
        host.sleep(self.config.stage_delay()).await
    }

    async fn ramp<H: PreloadHost>(&mut self, host: &H) -> Result<(), PreloadError> {
        let from = Stage::Models.checkpoint() as f64;
        let span = (Stage::Ramp.checkpoint() - Stage::Models.checkpoint()) as f64;
        let duration = self.config.ramp_duration_ms as f64;
        // a stalled clock still ends the ramp after the expected number of ticks
        let max_ticks = self.config.ramp_duration_ms / self.config.ramp_tick().as_millis() as u64 + 1;
        let start = host.now();

        for tick in 1..=max_ticks {
            host.sleep(self.config.ramp_tick()).await?;
            let elapsed = host.now().saturating_sub(start).as_secs_f64() * 1000.0;
            let progress = if duration > 0.0 {
                (from + elapsed / duration * span).min(100.0)
            } else {
                100.0
            };
            let progress = if tick == max_ticks { 100.0 } else { progress };
            self.reach(host, progress.round() as u8)?;
            if progress >= 100.0 {
                break;
            }
        }
        Ok(())
    }

    fn ensure_mounted<H: PreloadHost>(&self, host: &H) -> Result<(), PreloadError> {
        if host.is_mounted() {
            Ok(())
        } else {
            Err(PreloadError::Unmounted)
        }
    }

    fn reach<H: PreloadHost>(&mut self, host: &H, progress: u8) -> Result<(), PreloadError> {
        self.ensure_mounted(host)?;
        if self.state.advance_to(progress) {
            host.publish(self.state);
        }
        Ok(())
    }

    fn complete<H: PreloadHost>(&mut self, host: &H) {
        if !host.is_mounted() {
            return;
        }
        if self.state.finish() {
            log::info!("preloading finished at {}%", self.state.progress);
            host.publish(self.state);
        }
    }
}
