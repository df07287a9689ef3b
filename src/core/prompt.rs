//! Explanation prompt

use crate::capture::ExplanationRequest;

/// Fill the fixed instruction template with the word and its passage
pub fn build_prompt(request: &ExplanationRequest) -> String {
    let word = request.word();
    let context = request.context();

    format!(
        r#"You are a reading assistant. Explain what the word or phrase "{word}" means as it is used in the passage below.

Passage: "{context}"

Answer in 2 to 4 sentences. Describe the meaning in this specific context rather than giving a general dictionary definition. Respond with the explanation only."#
    )
}
