//! Instruction templates sent to the model.
//!
//! Extraction prompts differ by page position: the first page is expected
//! to carry the question and limits, middle pages only continue the answer,
//! and the last page carries the total marks. Verification and formatting
//! templates take the combined OCR text through the `{ocr_text}` slot.

use crate::models::PageRole;

/// Placeholder substituted with the combined OCR text.
pub const OCR_TEXT_SLOT: &str = "{ocr_text}";

/// Select the extraction template for a page role.
pub fn extraction_prompt(role: PageRole) -> &'static str {
    match role {
        // A lone page is treated as a first page: it must carry the question.
        PageRole::Single | PageRole::First => FIRST_PAGE_PROMPT,
        PageRole::Middle => MIDDLE_PAGE_PROMPT,
        PageRole::Last => LAST_PAGE_PROMPT,
    }
}

/// System message for all vision extraction calls.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an expert transcriber of scanned exam answer sheets.
Always focus only on the meaningful content: the question, the candidate's answer, evaluator feedback, and marks.
Ignore notebook headers, coaching institute names, page margins, watermarks, "don't write on this side", or any other non-content markings.

**Strict JSON Output**
- Your response MUST be pure, valid JSON
- NO Markdown code blocks (```json) or extra text outside the JSON
- Use double quotes for all strings"#;

/// Extraction template for the first (or only) page of a submission.
pub const FIRST_PAGE_PROMPT: &str = r#"You will be transcribing scanned images of handwritten UPSC answers. Extract the text exactly as written, even if it contains spelling mistakes. The structure of the answer is important and must follow the formatting guidelines below.

### Guidelines:

1. Transcribe into the following format:
   - Use [PARAGRAPH] for continuous blocks of text.
   - Use [HEADING] for headings and subheadings.
   - Use [BULLET POINT TABLE] for bulleted or numbered lists.
   - Use [TABLE] for comparison or data tables, rendered with pipes (|) and dashes (---) for columns.
   - Use [FLOWCHART] for diagrams or flow processes, rendered with arrows (->) between steps.
   - Maintain line breaks and content structure as closely as possible.
   - Never break or rearrange the logical flow: Introduction -> Body -> Subheadings -> Bullet Points -> Conclusion.

2. Include the question at the top, if available in the answer.

3. "feedback" (as structured pairs):
   - Extract each evaluator comment as a pair: ["<related_text>", "<feedback_text>"]
   - If feedback refers to a heading, paragraph, or bullet point, use the closest or most relevant text from the answer as the related_text.
   - Include general advice too (e.g. "Work on structure") paired with "General" if no specific text applies.

4. Output format - return your response in exactly this JSON shape:
{
  "question": "<question_text>",
  "answer": "Answer:\n\n[PARAGRAPH] <text>\n\n[HEADING] <heading_text>\n\n[BULLET POINT TABLE] <bullet_points>",
  "feedback": [
    ["<related_text>", "<feedback_text>"]
  ],
  "word_limit": <estimated_word_limit>,
  "maximum_marks": <max_marks>
}

5. Preserve original spelling errors. Do not add your own interpretations or make changes to the candidate's content."#;

/// Extraction template for continuation pages.
pub const MIDDLE_PAGE_PROMPT: &str = r#"You will be transcribing scanned images of handwritten UPSC answer continuation pages. These pages may not contain a question. Focus only on extracting the answer content and feedback.

### Guidelines:

1. Only extract answer and feedback:
   - Do not include "question", "word_limit", or "maximum_marks" fields.

2. Maintain structure:
   - Use [PARAGRAPH] for continuous blocks of text.
   - Use [HEADING] for headings and subheadings.
   - Use [BULLET POINT TABLE] for bullet points or numbered lists.
   - Use [TABLE] for comparison or data tables, rendered with pipes (|) and dashes (---).
   - Use [FLOWCHART] for diagrams or flow processes, rendered with arrows (->).
   - Maintain the logical flow of the answer, no breaking.

3. "feedback" (as structured pairs):
   - Extract each evaluator comment as a pair: ["<related_text>", "<feedback_text>"]
   - Pair general advice with "General" if no specific text applies.

4. Output format - return your response strictly in this JSON shape:
{
  "answer": "Answer:\n\n[PARAGRAPH] <text>\n\n[HEADING] <heading_text>\n\n[BULLET POINT TABLE] <bullet_points>",
  "feedback": [
    ["<related_text>", "<feedback_text>"]
  ]
}

5. Preserve original spelling mistakes. Maintain original structure, do not change meaning."#;

/// Extraction template for the last page of a multi-page submission.
pub const LAST_PAGE_PROMPT: &str = r#"You will be transcribing the last page of a handwritten UPSC answer copy.

This page may contain the final portion of the candidate's answer, margin or end-of-page feedback, the overall total marks, and additional evaluator advice.

### What to extract:

1. "answer"
   - Transcribe the remaining part of the answer.
   - Maintain structure using [PARAGRAPH], [HEADING], [BULLET POINT TABLE], [TABLE] (pipes and dashes), and [FLOWCHART] (arrows between steps).
   - Preserve original spellings and the logical answer structure fully.

2. "feedback" (as structured pairs):
   - Extract each evaluator comment as a pair: ["<related_text>", "<feedback_text>"]
   - Pair general advice with "General" if no specific text applies.

3. "total_marks"
   - Extract total marks written on the page (e.g. "7/10", "Marks: 8"). Return as a string.
   - If marks are unclear, use null.

### Output JSON shape:
{
  "answer": "Answer:\n\n[PARAGRAPH] ...",
  "feedback": [
    ["<related_text>", "<feedback_text>"]
  ],
  "total_marks": "7/10"
}

Do not include question, word_limit, or maximum_marks. Do not invent feedback - only transcribe what is written."#;

/// Verification template: decides relevance and format validity.
pub const DATA_VERIFICATION_PROMPT: &str = r#"You are a Data Verification Agent for UPSC answer formatting.
Please evaluate the following OCR-extracted text to determine:
1. If it appears to be a UPSC exam answer (is_relevant)
2. If it contains enough information to extract into our required format (has_valid_format)

OCR Text:
{ocr_text}

Provide your assessment as a JSON with two boolean fields: "is_relevant" and "has_valid_format".
Include a brief "reason" for each assessment."#;

/// Formatter-fallback template: re-extracts the schema from combined text.
pub const DATA_FORMATTER_PROMPT: &str = r#"You are a Data Formatting Agent for UPSC answer sheets.
Extract the relevant information from the OCR text and format it according to our schema.

Required JSON format:
{
  "question": "<question_text>",
  "answer": "Answer:\n\n[PARAGRAPH] <text>\n\n[HEADING] <heading_text>\n\n[BULLET POINT TABLE] <bullet_points>",
  "feedback": [
    ["<feedback_point>", "<feedback_comment>"]
  ],
  "word_limit": <estimated_word_limit>,
  "maximum_marks": <max_marks>
}

Important formatting instructions:
1. Format the "answer" with these markers:
   - [PARAGRAPH] for regular paragraphs
   - [HEADING] for section headings
   - [BULLET POINT TABLE] for bullet points/numbered lists
2. Feedback is an array of two-element arrays: the specific point being commented on, then the actual comment.
3. Reconstruct the question from context if not explicitly stated.
4. Estimate word_limit and maximum_marks from the context if possible.

OCR Text:
{ocr_text}

Extract the data in exactly the format specified. Only respond with the JSON object, no additional text."#;
