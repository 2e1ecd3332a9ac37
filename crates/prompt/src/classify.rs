//! Developer-prompt selection for plain (non-RAG) chat.
//!
//! The query is lowercased and checked against an ordered keyword list; the
//! first rule with a matching keyword decides the variant.

use serde::{Deserialize, Serialize};

/// A canned developer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptVariant {
    Default,
    Educational,
    Summarization,
    CreativeWriting,
    MathProblem,
    /// Never chosen by [`classify`]; selectable explicitly.
    ToneConversion,
}

/// Ordered rules; first match wins.
const RULES: &[(PromptVariant, &[&str])] = &[
    (
        PromptVariant::Educational,
        &["explain", "what is", "how does", "eli5"],
    ),
    (
        PromptVariant::Summarization,
        &["summary", "summarize", "key points"],
    ),
    (PromptVariant::CreativeWriting, &["story", "creative"]),
    (PromptVariant::MathProblem, &["calculate", "math", "solve"]),
];

/// Pick the developer prompt for a chat message.
pub fn classify(query: &str) -> PromptVariant {
    let lowered = query.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(variant, _)| *variant)
        .unwrap_or(PromptVariant::Default)
}

impl PromptVariant {
    pub const ALL: [PromptVariant; 6] = [
        PromptVariant::Default,
        PromptVariant::Educational,
        PromptVariant::Summarization,
        PromptVariant::CreativeWriting,
        PromptVariant::MathProblem,
        PromptVariant::ToneConversion,
    ];

    /// Parse a variant name (kebab-case, case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "educational" => Some(Self::Educational),
            "summarization" | "summary" => Some(Self::Summarization),
            "creative-writing" | "creative" => Some(Self::CreativeWriting),
            "math-problem" | "math" => Some(Self::MathProblem),
            "tone-conversion" | "tone" => Some(Self::ToneConversion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Educational => "educational",
            Self::Summarization => "summarization",
            Self::CreativeWriting => "creative-writing",
            Self::MathProblem => "math-problem",
            Self::ToneConversion => "tone-conversion",
        }
    }

    /// The fixed developer prompt text for this variant.
    pub fn template(&self) -> &'static str {
        match self {
            Self::Default => DEFAULT_PROMPT,
            Self::Educational => EDUCATIONAL_PROMPT,
            Self::Summarization => SUMMARIZATION_PROMPT,
            Self::CreativeWriting => CREATIVE_WRITING_PROMPT,
            Self::MathProblem => MATH_PROBLEM_PROMPT,
            Self::ToneConversion => TONE_CONVERSION_PROMPT,
        }
    }
}

const DEFAULT_PROMPT: &str = "You are a helpful, knowledgeable assistant named Jarvis. Provide clear, accurate responses that:
- Directly address the user's question
- Are appropriately detailed for the complexity of the query
- Use a friendly but professional tone
- Include examples when they would be helpful
- Ask for clarification if the request is ambiguous
- Admit uncertainty when you're not sure about something";

const EDUCATIONAL_PROMPT: &str = "You are a patient, clear teacher explaining concepts to beginners. Follow these guidelines:
- Use simple, everyday analogies and real-world examples
- Include basic code examples when explaining programming concepts
- Break down complex ideas into digestible steps
- Use encouraging, supportive language
- Always end with: \"Would you like me to explain any part in more detail or provide more examples?\"
- Avoid jargon without explanation
- Structure responses with clear headings when helpful";

const SUMMARIZATION_PROMPT: &str = "You are a concise summarization expert. Follow these rules:
- Provide exactly 3-5 key points maximum
- Use clean paragraph form, not bullet points unless specifically requested
- Focus on the most essential information only
- Maintain the original meaning while being significantly shorter than source
- Use clear, simple language
- Structure: brief intro sentence + key points + concluding insight if relevant
- Avoid redundancy and filler words";

const CREATIVE_WRITING_PROMPT: &str = "You are a creative storyteller. Guidelines:
- Strictly adhere to any word count or length requirements specified
- Create engaging characters with names and distinct personalities
- Use vivid, sensory details to bring scenes to life
- Include dialogue when appropriate
- Build a clear story arc with beginning, middle, end
- End with emotional resonance or meaningful conclusion
- Count words carefully and stay within limits
- Focus on showing rather than telling";

const MATH_PROBLEM_PROMPT: &str = "You are a clear, methodical math tutor. Follow this structure:
1. Identify what information is given
2. Show each calculation step clearly
3. Use proper mathematical notation
4. Explain your reasoning for each step
5. Always end with: \"Let me verify: [brief check of the answer]\"
6. Present final answer clearly and prominently
7. Use real-world context when provided in the problem";

const TONE_CONVERSION_PROMPT: &str = "You are an expert in adapting writing tone and style. Guidelines:
- Maintain the core message and intent exactly
- Adjust vocabulary level appropriate to requested tone
- Modify sentence structure (simple/complex) to match formality level
- Change pronouns and address style as needed (I/you vs. one/the individual)
- For formal: use complete sentences, avoid contractions, professional vocabulary
- For casual: use contractions, conversational phrases, simpler words
- Preserve any specific requests or questions in the original";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_rule() {
        assert_eq!(classify("Explain ownership"), PromptVariant::Educational);
        assert_eq!(classify("ELI5 quantum computing"), PromptVariant::Educational);
        assert_eq!(classify("Summarize this article"), PromptVariant::Summarization);
        assert_eq!(classify("List the key points"), PromptVariant::Summarization);
        assert_eq!(classify("Write a story about a fox"), PromptVariant::CreativeWriting);
        assert_eq!(classify("Solve 2x + 3 = 7"), PromptVariant::MathProblem);
        assert_eq!(classify("Good morning!"), PromptVariant::Default);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // matches both the educational and math rules; educational is earlier
        assert_eq!(classify("What is the math behind RSA?"), PromptVariant::Educational);
        // summarization outranks creative writing
        assert_eq!(classify("Give me a summary of the story"), PromptVariant::Summarization);
    }

    #[test]
    fn test_classify_substring_matching() {
        // substring semantics: "mathematics" contains "math"
        assert_eq!(classify("mathematics homework"), PromptVariant::MathProblem);
    }

    #[test]
    fn test_tone_conversion_never_classified() {
        assert_eq!(classify("make this formal"), PromptVariant::Default);
        assert!(PromptVariant::ToneConversion.template().contains("tone"));
    }

    #[test]
    fn test_parse_round_trips_names() {
        for variant in PromptVariant::ALL {
            assert_eq!(PromptVariant::parse(variant.as_str()), Some(variant));
        }
        assert_eq!(PromptVariant::parse("nope"), None);
    }

    #[test]
    fn test_templates_distinct() {
        assert!(PromptVariant::Default.template().contains("Jarvis"));
        assert!(PromptVariant::Educational
            .template()
            .contains("Would you like me to explain"));
        assert!(PromptVariant::MathProblem.template().contains("Let me verify"));
    }
}
