// Prompt templates and fixed user-facing answers

pub const NO_ANSWER: &str =
    "I could not find relevant information in the indexed documents to answer this question.";

pub const LLM_ERROR_ANSWER: &str =
    "An error occurred while generating the answer. Please try again later.";

pub const VALIDATION_FAILED_ANSWER: &str =
    "I could not produce an answer that is supported by the indexed documents.";

/// Answer prompt. The model is told to stay inside the retrieved context.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are a documentation assistant. Answer the question using ONLY the context below.
If the context does not contain the answer, say that you do not know.
Do not use outside knowledge and do not invent details.

Context:
{context}

Question: {question}

Answer:"#
    )
}

/// Grounding judge prompt. Expects `VALID` or a one-sentence rejection reason.
pub fn grounding_prompt(question: &str, answer: &str, context: &str) -> String {
    format!(
        r#"You are verifying whether an answer is fully supported by the given context.

Context:
{context}

Question: {question}

Answer: {answer}

If every claim in the answer is supported by the context, reply with exactly: VALID
Otherwise reply with one short sentence explaining which claim is not supported."#
    )
}
