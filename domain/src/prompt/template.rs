//! Prompt templates for the expert-panel flow

use crate::agent::Agent;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the query-analysis call
    pub fn analysis_system() -> &'static str {
        r#"You are a medical query analyst routing patient and clinician questions to specialist agents.
Analyze the user's question and reply with a single JSON object and nothing else:

{
  "intent": "<diagnosis | treatment | medication | prevention | information | general>",
  "domains": ["<medical specialties, e.g. cardiology, endocrinology>"],
  "complexity": "<low | medium | high>",
  "keywords": ["<salient words from the question>"],
  "medicalTerms": ["<clinical terms mentioned or implied>"],
  "confidence": <number between 0 and 1>
}

Use lowercase specialty names. If the question is not medical, use intent "general" and an empty domain list."#
    }

    /// User prompt for the query-analysis call
    pub fn analysis_query(question: &str) -> String {
        format!("Analyze this question:\n\n{}", question)
    }

    /// System prompt for a panel member, falling back to a generic expert persona
    pub fn panel_system(agent: &Agent) -> String {
        if !agent.system_prompt.trim().is_empty() {
            return agent.system_prompt.clone();
        }

        let mut prompt = format!(
            "You are {}, a healthcare expert participating in a panel of specialists.",
            agent.display_name
        );
        if !agent.knowledge_domains.is_empty() {
            prompt.push_str(&format!(
                "\nYour areas of expertise: {}.",
                agent.knowledge_domains.join(", ")
            ));
        }
        prompt.push_str(
            "\nAnswer from your specialty's perspective. Be accurate and concise, state uncertainty plainly, \
             and recommend consulting a clinician where appropriate.",
        );
        prompt
    }

    /// User prompt for a panel member
    pub fn panel_query(question: &str) -> String {
        format!(
            r#"Please answer the following question:

{}

Provide a clear, well-structured response."#,
            question
        )
    }
}
