use crate::config::Slide;
use crate::error::{BookingError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::trace;

/// Slide position of the landing page carousel.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    slides: Vec<Slide>,
    current: usize,
}

impl Carousel {
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(BookingError::Validation(
                "A carousel needs at least one slide".to_string(),
            ));
        }
        Ok(Self { slides, current: 0 })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> &Slide {
        &self.slides[self.current]
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.slides.len();
        self.current
    }

    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.slides.len() - 1) % self.slides.len();
        self.current
    }

    /// Jumps to `index`; out-of-range indices leave the position unchanged.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.slides.len() {
            self.current = index;
            true
        } else {
            false
        }
    }
}

/// A carousel advanced by a repeating timer.
///
/// Manual controls move the slide immediately and do not restart the timer
/// period. Every position change is published on a watch channel. Dropping
/// the rotation stops the timer.
pub struct CarouselRotation {
    carousel: Arc<Mutex<Carousel>>,
    index_tx: watch::Sender<usize>,
    timer: JoinHandle<()>,
}

impl CarouselRotation {
    /// Starts the timer. Must be called from within a tokio runtime.
    pub fn start(carousel: Carousel, period: Duration) -> Self {
        let (index_tx, _) = watch::channel(carousel.current());
        let carousel = Arc::new(Mutex::new(carousel));

        let timer_carousel = Arc::clone(&carousel);
        let timer_tx = index_tx.clone();
        let first_tick = time::Instant::now() + period;
        let timer = tokio::spawn(async move {
            let mut ticker = time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let index = lock(&timer_carousel).next();
                trace!(index, "carousel advanced");
                timer_tx.send_replace(index);
            }
        });

        Self {
            carousel,
            index_tx,
            timer,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index_tx.subscribe()
    }

    pub fn current(&self) -> usize {
        lock(&self.carousel).current()
    }

    pub fn current_slide(&self) -> Slide {
        lock(&self.carousel).current_slide().clone()
    }

    pub fn next(&self) -> usize {
        let index = lock(&self.carousel).next();
        self.index_tx.send_replace(index);
        index
    }

    pub fn prev(&self) -> usize {
        let index = lock(&self.carousel).prev();
        self.index_tx.send_replace(index);
        index
    }

    pub fn go_to(&self, index: usize) -> bool {
        let moved = lock(&self.carousel).go_to(index);
        if moved {
            self.index_tx.send_replace(index);
        }
        moved
    }
}

impl Drop for CarouselRotation {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

// The carousel holds plain data, so a poisoned lock still has a usable value.
fn lock(carousel: &Mutex<Carousel>) -> MutexGuard<'_, Carousel> {
    carousel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
