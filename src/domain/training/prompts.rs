//! Prompt text for the simulated customer and the training supervisor.
//!
//! Pure string builders: no I/O, no provider types.

use super::{DifficultyTier, ScenarioConfig, Transcript};

/// Sampling temperature for customer replies.
pub const CUSTOMER_TEMPERATURE: f32 = 0.8;

/// Returned when the model produces no reply text.
pub const REPLY_FALLBACK: &str = "I'm sorry, I didn't catch that. Could you repeat?";

/// Returned when the model produces no feedback text.
pub const FEEDBACK_FALLBACK: &str = "Feedback generation failed.";

/// Opening line the customer speaks when a session starts.
pub fn greeting(customer_name: &str) -> String {
    format!(
        "Hello? This is {} speaking. Who's calling and what is this about?",
        customer_name
    )
}

/// System instruction that puts the model in character.
pub fn persona_instruction(config: &ScenarioConfig) -> String {
    let mut tiers = String::new();
    for tier in DifficultyTier::ALL {
        tiers.push_str(&format!("- {}: {}\n", tier.as_str(), tier.behavior()));
    }

    format!(
        "You are a Payment Collection Simulation Customer.\n\
         ROLE: You act as {name} who owes a balance of ${balance}.\n\
         SCENARIO / REASON FOR DEBT: \"{reason}\".\n\
         DIFFICULTY LEVEL: {difficulty}.\n\
         {tiers}\n\
         GENERAL BEHAVIOR:\n\
         - Respond naturally like a real customer based on the DIFFICULTY level.\n\
         - Stay in character. Do not mention being an AI.\n\
         - Do not resolve payment immediately unless negotiated well or if you are in EASY mode.\n\
         - Provide realistic responses to payment offers.\n\
         - End the conversation if a fair agreement is reached or the agent is exceptionally professional.\n\
         \n\
         Wait for the student (Collections Agent) to speak first.",
        name = config.customer_name(),
        balance = config.balance(),
        reason = config.reason(),
        difficulty = config.difficulty(),
        tiers = tiers,
    )
}

/// One-shot supervisor prompt grading the whole transcript.
pub fn evaluation_prompt(config: &ScenarioConfig, transcript: &Transcript) -> String {
    let conversation = transcript
        .turns()
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker().label(), turn.text()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "The roleplay scenario has ended. You are now the Training Supervisor.\n\
         Evaluate the performance of the collections agent (the user) based on the following conversation history.\n\
         \n\
         SCENARIO: {reason} ({difficulty} difficulty, ${balance} balance)\n\
         \n\
         CONVERSATION:\n\
         {conversation}\n\
         \n\
         Please provide structured feedback in the following format:\n\
         --- PERFORMANCE FEEDBACK ---\n\
         \n\
         Communication Clarity:\n\
         [Evaluation of clarity and professionalism]\n\
         \n\
         Empathy and Customer Handling:\n\
         [Evaluation of understanding and EQ]\n\
         \n\
         Negotiation Skills:\n\
         [Evaluation of solutions and payment options]\n\
         \n\
         Professionalism:\n\
         [Evaluation of tone and closing skills]\n\
         \n\
         Overall Score:\n\
         [Rating from 1 to 10]\n\
         \n\
         Improvement Suggestions:\n\
         - [Tip 1]\n\
         - [Tip 2]\n\
         - [Tip 3]",
        reason = config.reason(),
        difficulty = config.difficulty(),
        balance = config.balance(),
        conversation = conversation,
    )
}
