//! Text randomizer
//!
//! On pointer enter the text is scrambled every step, revealing the original
//! letters left to right a fraction of a letter at a time. Leaving restores
//! the original text at once.

use std::cell::RefCell;
use std::rc::Rc;

use kinet_animation::error::ensure_positive;
use kinet_animation::{AnimationError, FrameControl, FrameDriver, FrameScheduler, Result};
use kinet_core::{EventKind, ListenerGuard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::host::WidgetHost;
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Time between scramble steps
    pub step_ms: f32,
    /// Letters revealed per step
    pub reveal_per_step: f32,
    /// Letters used for scrambled positions
    pub alphabet: String,
    /// Fixed seed for reproducible scrambles
    pub seed: Option<u64>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            step_ms: 30.0,
            reveal_per_step: 1.0 / 3.0,
            alphabet: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string(),
            seed: None,
        }
    }
}

impl TextConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("text step_ms", self.step_ms)?;
        ensure_positive("text reveal_per_step", self.reveal_per_step)?;
        if self.alphabet.is_empty() {
            return Err(AnimationError::invalid("text alphabet must not be empty"));
        }
        Ok(())
    }
}

/// One scramble run over the original text
#[derive(Clone, Debug)]
pub struct Scramble {
    original: Vec<char>,
    alphabet: Vec<char>,
    reveal_per_step: f32,
    steps: u32,
}

impl Scramble {
    pub fn new(original: &str, alphabet: &str, reveal_per_step: f32) -> Self {
        Self {
            original: original.chars().collect(),
            alphabet: alphabet.chars().collect(),
            reveal_per_step,
            steps: 0,
        }
    }

    /// Letters revealed so far
    pub fn iteration(&self) -> f32 {
        self.steps as f32 * self.reveal_per_step
    }

    pub fn is_revealed(&self) -> bool {
        self.iteration() >= self.original.len() as f32
    }

    /// Produce the next frame of text. Returns the text and whether the
    /// run is complete.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> (String, bool) {
        let iteration = self.iteration();
        let text = self
            .original
            .iter()
            .enumerate()
            .map(|(index, &letter)| {
                if (index as f32) < iteration {
                    letter
                } else {
                    self.alphabet[rng.gen_range(0..self.alphabet.len())]
                }
            })
            .collect();
        let done = self.is_revealed();
        self.steps += 1;
        (text, done)
    }
}

pub struct TextRandomizer {
    text: String,
    displayed: Rc<RefCell<String>>,
    run: Rc<RefCell<Option<FrameDriver>>>,
    listener: ListenerGuard,
}

impl TextRandomizer {
    pub fn new<S>(
        host: &WidgetHost,
        text: impl Into<String>,
        surface: Rc<RefCell<S>>,
        config: TextConfig,
    ) -> Result<Self>
    where
        S: Surface + 'static,
    {
        config.validate()?;
        let text = text.into();
        let rng = Rc::new(RefCell::new(match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }));
        let displayed = Rc::new(RefCell::new(text.clone()));
        let run: Rc<RefCell<Option<FrameDriver>>> = Rc::new(RefCell::new(None));

        let listener = {
            let scheduler = host.scheduler().clone();
            let text = text.clone();
            let displayed = displayed.clone();
            let run = run.clone();
            host.events()
                .subscribe(&[EventKind::Enter, EventKind::Leave], move |event| {
                    // Replacing or clearing the slot cancels the previous run
                    let previous = run.borrow_mut().take();
                    drop(previous);

                    if event.kind == EventKind::Enter {
                        let driver = start_scramble(
                            &scheduler,
                            Scramble::new(&text, &config.alphabet, config.reveal_per_step),
                            config.step_ms,
                            rng.clone(),
                            surface.clone(),
                            displayed.clone(),
                        );
                        *run.borrow_mut() = Some(driver);
                        tracing::debug!("text scramble started");
                    } else {
                        surface.borrow_mut().apply_text(&text);
                        *displayed.borrow_mut() = text.clone();
                    }
                })
        };

        Ok(Self {
            text,
            displayed,
            run,
            listener,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text currently shown
    pub fn displayed(&self) -> String {
        self.displayed.borrow().clone()
    }

    /// True while a scramble run is ticking
    pub fn is_scrambling(&self) -> bool {
        self.run
            .borrow()
            .as_ref()
            .map_or(false, FrameDriver::is_active)
    }

    pub fn dispose(&mut self) {
        self.listener.release();
        let run = self.run.borrow_mut().take();
        drop(run);
        tracing::debug!("text randomizer disposed");
    }
}

fn start_scramble<S: Surface + 'static>(
    scheduler: &FrameScheduler,
    mut scramble: Scramble,
    step_ms: f32,
    rng: Rc<RefCell<StdRng>>,
    surface: Rc<RefCell<S>>,
    displayed: Rc<RefCell<String>>,
) -> FrameDriver {
    // The first step fires on the first frame
    let mut pending = step_ms;
    FrameDriver::start(scheduler, move |time| {
        pending += time.delta_ms;
        while pending >= step_ms {
            pending -= step_ms;
            let (text, done) = scramble.step(&mut *rng.borrow_mut());
            surface.borrow_mut().apply_text(&text);
            *displayed.borrow_mut() = text;
            if done {
                tracing::debug!("text scramble finished");
                return FrameControl::Stop;
            }
        }
        FrameControl::Continue
    })
}
