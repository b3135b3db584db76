/// Assembles the instruction prompt: persona preamble, retrieved context in
/// retrieval order, then the question.
pub fn build_rag_prompt(product: &str, context: &[&str], question: &str) -> String {
    let context_text = context.join("\n");
    format!(
        "You are a multilingual chatbot for {product}. The user may ask questions in any language. \
         Answer in English, and only based on the context given.\n\
         \n\
         ### Context:\n\
         {context_text}\n\
         \n\
         ### Question:\n\
         {question}\n\
         \n\
         ### Answer:"
    )
}
