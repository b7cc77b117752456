use crate::github::FileSampleSet;
use std::fmt::Write as _;

pub const SYSTEM_PROMPT: &str =
    "You are a code quality analyzer. Respond only with valid JSON.";

const RESPONSE_SCHEMA: &str = concat!(
    "{\n",
    "  \"code_quality\": <score 0-100>,\n",
    "  \"complexity\": <score 0-100>,\n",
    "  \"best_practices\": <score 0-100>,\n",
    "  \"originality\": <score 0-100>,\n",
    "  \"overall_score\": <weighted average: quality 30%, complexity 25%, practices 25%, originality 20%>,\n",
    "  \"evidence_summary\": \"<2-3 sentences on what the code demonstrates, citing at least one file path>\",\n",
    "  \"strengths\": [\"<strength 1>\", \"<strength 2>\"],\n",
    "  \"weaknesses\": [\"<weakness 1>\", \"<weakness 2>\"]\n",
    "}\n",
);

const SCORING_GUIDELINES: &str = concat!(
    "Scoring guidelines:\n",
    "- code_quality: Clean syntax, proper naming, consistent formatting, no dead code\n",
    "- complexity: Sophistication of algorithms, data structures, architecture used\n",
    "- best_practices: Error handling, comments, modular design, testing\n",
    "- originality: Not a common tutorial clone, shows independent thinking\n",
);

/// Render the sampled files as labelled blocks.
pub fn render_files(samples: &FileSampleSet) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = write!(out, "\n--- FILE: {} ---\n{}\n", sample.path, sample.content);
    }
    out
}

/// Build the single user message sent to the model.
pub fn build_analysis_prompt(skill: &str, repo_url: &str, samples: &FileSampleSet) -> String {
    format!(
        "You are an expert code reviewer evaluating a developer's skill level.\n\n\
         The developer claims proficiency in: {skill}\n\
         Repository: {repo_url}\n\n\
         Analyze the following source code files and respond with exactly one JSON object \
         with these keys:\n\n\
         {RESPONSE_SCHEMA}\n\
         {SCORING_GUIDELINES}\n\
         CODE FILES:\n\
         {files}\n\
         Respond ONLY with valid JSON, no other text.",
        files = render_files(samples),
    )
}
