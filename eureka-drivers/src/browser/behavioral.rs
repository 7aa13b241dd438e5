use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
/// Produces human‑like pauses and keystroke timing for form interaction.
pub struct BehavioralEngine {
    /// Per-keystroke delay range in milliseconds.
    keystroke_ms: (u64, u64),
}

impl Default for BehavioralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {
            keystroke_ms: (30, 150),
        }
    }

    fn pick(&self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        OsRng.gen_range(min..=max)
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        if self.keystroke_ms == (0, 0) {
            return;
        }
        let ms = self.pick(min, max);
        sleep(Duration::from_millis(ms)).await;
    }

    /// Type the provided text one character at a time.
    pub async fn type_text_human_like(&self, element: &Element, text: &str) -> Result<()> {
        let (min, max) = self.keystroke_ms;
        if max == 0 {
            element.send_keys(text).await?;
            return Ok(());
        }
        for ch in text.chars() {
            element.send_keys(&ch.to_string()).await?;
            sleep(Duration::from_millis(self.pick(min, max))).await;
        }
        Ok(())
    }
}
