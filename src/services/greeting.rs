// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Greeting generator.
//!
//! Produces a short personalized greeting built around a generated running
//! pun. This component has no user-visible error channel: when generation
//! fails the orchestrator substitutes [`static_greeting`].

use crate::services::genai::{ContentGenerator, GenerationError};
use std::sync::Arc;

const PUN_PROMPT: &str =
    "Generate a short, witty, running-related pun. Reply with the pun only, no preamble.";

/// Greeting generation service.
#[derive(Clone)]
pub struct GreetingService {
    generator: Arc<dyn ContentGenerator>,
}

impl GreetingService {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    /// Generate a personalized greeting with a running pun.
    pub async fn generate(&self, user_name: &str) -> Result<String, GenerationError> {
        let pun = self.generator.generate_text(PUN_PROMPT).await?;
        let pun = pun.trim();
        if pun.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(render_greeting(user_name, pun))
    }
}

/// Weave the pun into one of a few greeting templates. Template choice only
/// needs to vary, not be random, so it is keyed off the pun itself.
fn render_greeting(user_name: &str, pun: &str) -> String {
    match pun.len() % 4 {
        0 => format!(
            "Hey {}, ready to hit the pavement? Remember: {}",
            user_name, pun
        ),
        1 => format!(
            "Hello {}! Here's a little something to get you moving: {}",
            user_name, pun
        ),
        2 => format!("Hi {}, time to lace up! And here's a thought: {}", user_name, pun),
        _ => format!(
            "{}, let's get those legs moving! Quick pun for you: {}",
            user_name, pun
        ),
    }
}

/// Static greeting used when generation is unavailable.
pub fn static_greeting(user_name: &str) -> String {
    format!(
        "Hello {}, your personalized dashboard content could not be generated at this time.",
        user_name
    )
}
