/// System prompt pinning the completion output to a single JSON object with
/// an `actionItems` array. The parser tolerates deviations, but the contract
/// here keeps them rare.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are an assistant that extracts action items from meeting transcripts. \
Respond with a JSON object containing a single key \"actionItems\", whose \
value is an array of objects. Each object has the keys: \"task\" (string, \
required), \"owner\" (string or null), \"dueDate\" (string or null), and \
\"status\" (either \"OPEN\" or \"DONE\"; default \"OPEN\"). If the transcript \
contains no action items, return {\"actionItems\": []}. Do not include any \
text outside the JSON object.";

/// Wrap the raw transcript as the user turn of the completion request.
pub fn build_user_message(transcript: &str) -> String {
    format!("Transcript: {transcript}")
}
