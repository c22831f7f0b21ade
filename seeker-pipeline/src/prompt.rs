/// Fixed instructions sent ahead of the question and page contents.
///
/// The `###` headings are what the incremental filter waits for before it
/// shows anything, so the example format must keep them.
pub const ANSWER_INSTRUCTIONS: &str = r#"Based on the provided contents of the web pages, answer the question.
Provide as much detail as possible.
Do not repeat entire sentences word-for-word from the websites. Summarize and rephrase things in your own words.

You want to return the most helpful answer that you can. If there are multiple answers or solutions to the question,
then provide all of them. Provide as much detail as you can.

Format your answer in Markdown, following the example.

EXAMPLE

### Sources:
- [Source Title](Source URL)
- [Source Title](Source URL)

### Answer:
Answer text here.

END EXAMPLE"#;

/// Build the answer prompt. Both inputs are embedded verbatim.
pub fn compose_prompt(question: &str, page_contents: &str) -> String {
    format!("{ANSWER_INSTRUCTIONS}\n\nquestion: {question}\n\npage contents:\n\n{page_contents}")
}
