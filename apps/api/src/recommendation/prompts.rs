// Prompt templates for the recommendation oracle.

/// System instruction for prose recommendations (free-text mode).
pub const REFINE_SYSTEM: &str =
    "You are a helpful assistant that suggests the best courses based on the following information.";

/// System instruction when replies are mapped back onto catalog titles (structured mode).
pub const REFINE_TITLES_SYSTEM: &str = "\
You are a helpful assistant that suggests the best courses based on the following information. \
Reply with the exact titles of the recommended courses, one title per line. \
Only use titles from the provided list. Do not add numbering, descriptions or any other text.";

/// Token cap shared by every recommendation call.
pub const RECOMMENDATION_MAX_TOKENS: u32 = 150;

/// Sampling temperature for the refinement variant; the plain variant uses the provider default.
pub const REFINE_TEMPERATURE: f32 = 0.7;

/// User prompt for refinement: the goal, then one candidate summary per line.
pub fn build_refine_prompt(goal: &str, summaries: &[String]) -> String {
    format!(
        "Here are some courses related to \"{goal}\". Suggest the best courses:\n\n{}",
        summaries.join("\n")
    )
}
