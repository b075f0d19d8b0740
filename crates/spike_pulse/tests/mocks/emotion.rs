use std::sync::{Arc, Mutex};
use spike_pulse::{
    emotion::{EmotionAnalyzer, EmotionError},
    types::EmotionReading,
};

#[derive(Clone)]
pub struct MockEmotionAnalyzer {
    pub reading: Option<EmotionReading>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmotionAnalyzer {
    pub fn new(emotion: &str, score: f64) -> Self {
        Self {
            reading: Some(EmotionReading {
                emotion: emotion.to_string(),
                score,
                confidence: (score * 100.0).round() as u8,
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reading: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl EmotionAnalyzer for MockEmotionAnalyzer {
    async fn analyze(&self, text: &str) -> Result<EmotionReading, EmotionError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.reading.clone().ok_or(EmotionError::Api {
            status: 502,
            message: "upstream unavailable".to_string(),
        })
    }
}
