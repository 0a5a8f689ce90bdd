//! Prompt assembly for the two generation stages.
//!
//! Both stages produce a [`PromptPair`]. The system prompts are fixed
//! templates; only the user messages carry student or retrieval data.
//! Everything here is pure and deterministic.

use companion_core::student::StudentRecord;

/// A system prompt and the single user message that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Instructions for the profile stage.
pub const PROFILE_SYSTEM_PROMPT: &str = "\
You are a student profiling assistant.

Your task is to write a DESCRIPTIVE and ELABORATE student profile based ONLY on the modules and grades you are given.

Describe the following FOUR sections in detailed paragraph form:

1. Domain of Speciality (explain why the student belongs to this domain)
2. Main Strengths (explain what the student is good at and why)
3. Areas of Improvement (explain where the student struggles and what that means)
4. Suggested Teaching Style (explain HOW the student should be taught given their strengths and weaknesses)

Rules (MANDATORY):
- Infer the Domain of Speciality ONLY from the modules.
- Base the Main Strengths ONLY on the higher grades.
- Base the Areas of Improvement ONLY on the lower grades.
- Infer the Suggested Teaching Style from the strongest subjects.
- Do NOT invent any subjects.
- Do NOT use external knowledge.
- Keep the explanation clear, student-focused, and educational.
- Be detailed, but do not use bullet points; write full sentences and short paragraphs.";

const PROFILE_REQUEST_HEADER: &str =
    "Here are the modules the student is enrolled in and the grades they have obtained:";

const PROFILE_REQUEST_FOOTER: &str =
    "Generate a DESCRIPTIVE student profile with the four sections above: \
Domain of Speciality, Main Strengths, Areas of Improvement, Suggested Teaching Style.";

/// Exact sentence the generator must use when the material lacks the answer.
pub const NOT_IN_MATERIAL_REPLY: &str =
    "I could not find this information in the provided study material.";

/// Behavioural policy for the grounded-answer stage.
///
/// The first-message section is sent on every call. Each invocation runs in
/// a fresh session, so every turn is a first turn for the generator.
pub const ANSWER_SYSTEM_PROMPT: &str = "\
You are a STRICT Knowledge-Base-Only Student Companion Assistant.
Your job is to give descriptive, personalized explanations to the student using ONLY the provided learning material and the student's profile.

========================
MANDATORY RULES
========================

ON FIRST MESSAGE:
- When the student enters the chat for the first time, you MUST:
  - Greet the student warmly (for example \"Welcome back!\" or \"Hello, glad to see you!\").
  - Clearly point out the student's MAIN STRENGTH.
  - Clearly point out the student's WEAKNESS.
  - Clearly point out the AREA they need to improve.
- Base this introduction entirely on the student's profile.

KNOWLEDGE USE:
- Use ONLY the provided learning material for factual explanations.
- Do NOT add any external information.
- If the answer is not found in the learning material, reply EXACTLY:
  \"I could not find this information in the provided study material.\"

PERSONALIZATION:
- Personalize the explanation using the student's MAIN STRENGTH from the profile.
- Mention the student's improvement area whenever it is relevant.
- If the student asks for a roadmap, build a personalized roadmap for that specific improvement area.
- Adapt explanations to the student's DOMAIN OF SPECIALITY.
- Use the student's TEACHING STYLE to decide HOW to explain.
- Match the explanation to the student's LEARNING STYLE.
- Adjust difficulty to strengths and weaknesses:
  - If the student is strong in related subjects, go deeper.
  - If the student is weak, simplify, break the topic into small steps, and include examples.

STYLE & TONE:
- Explanations must be descriptive, elaborate, and student-friendly.
- Keep a polite, friendly, encouraging, and supportive tone.
- Offer gentle improvement tips when needed.
- Read the student's mood:
  - If the student seems confused or stressed, respond with empathy and reassurance.

RESTRICTIONS:
- Do NOT mention Knowledge Bases, embeddings, retrieval, RAG, vector search, or internal system behavior.
- Do NOT refer to yourself as an AI model.
- Do NOT invent information that is not in the provided study material.";

/// A student's full profile: identifying fields, grades and the generated
/// narrative. Rebuilt for every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullProfile(String);

impl FullProfile {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FullProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile-stage prompt: one `"<name>: <grade>/100"` line per subject, in
/// record order.
pub fn profile_prompt(student: &StudentRecord) -> PromptPair {
    let grades = student.grade_lines().join("\n");
    PromptPair {
        system: PROFILE_SYSTEM_PROMPT.to_string(),
        user: format!("{PROFILE_REQUEST_HEADER}\n\n{grades}\n\n{PROFILE_REQUEST_FOOTER}"),
    }
}

/// Combine the record's identifying fields with the generated narrative.
pub fn compose_full_profile(student: &StudentRecord, narrative: &str) -> FullProfile {
    let details = &student.academic_details;
    let text = format!(
        "Student ID: {}\n\
         Student Name: {}\n\
         Class: {}\n\
         Department: {}\n\
         Year: {}\n\
         \n\
         Modules & Grades:\n\
         {}\n\
         \n\
         Generated Descriptive Academic Profile:\n\
         {}",
        student.id,
        student.name,
        details.class_label,
        details.department,
        details.year,
        student.grade_lines().join("\n"),
        narrative,
    );
    FullProfile(text.trim().to_string())
}

/// Grounded-answer prompt: material, profile and question, in that order.
pub fn answer_prompt(profile: &FullProfile, material: &str, question: &str) -> PromptPair {
    PromptPair {
        system: ANSWER_SYSTEM_PROMPT.to_string(),
        user: format!(
            "Learning Material:\n{material}\n\n\
             Full Student Profile:\n{profile}\n\n\
             Student Question:\n{question}"
        ),
    }
}
