//! Prompt templates for the moderator, the personas and the sentiment scorer.

/// Appended to each persona directive when knowledge integration is on
pub const REFERENCE_INSTRUCTION: &str = "\n\nYou can request external information by using [REF: your query] in your response. \
For example: 'Studies have shown [REF: latest research on AI-generated content reliability]'";

pub const SENTIMENT_SYSTEM: &str = "You are a sentiment analysis tool. Analyze the following text and return a single number \
representing the sentiment. Use -1 for very negative, 0 for neutral, and +1 for very positive.";

pub const PERSPECTIVES_INTRO: &str = "Introduce the first phase of the debate where each expert will provide their initial \
perspective. Invite them to share concise viewpoints based on their expertise.";

pub const PERSPECTIVES_SUMMARY: &str = "Summarize the key points from each expert's initial perspective. Highlight areas of \
agreement, disagreement, and unique insights. You can reference external research if helpful with [REF: relevant query]. \
Then, transition to the critique phase where experts will provide constructive feedback on each other's perspectives.";

pub const CRITIQUES_SUMMARY: &str = "Summarize the key critiques provided by the experts. Highlight patterns, tensions, and \
areas where experts challenged each other's thinking. Then, transition to the response phase where experts will address \
the critiques directed at them.";

pub const RESPONSES_SUMMARY: &str = "Summarize how the experts have responded to critiques. Highlight how positions have \
evolved or been refined. Then, transition to the common ground phase where experts will identify areas of consensus and \
potential for integration.";

pub const COMMON_GROUND_SUMMARY: &str = "Synthesize the common ground identified by the experts. Highlight key areas of \
consensus and how different perspectives might complement each other. Then, transition to the final phase where experts \
will provide their concluding thoughts and recommendations.";

pub const CONCLUSION: &str = "Conclude the debate by summarizing the journey from initial perspectives to final positions. \
Highlight how thinking evolved and identify key insights that emerged. Thank the experts for their contributions.";

pub fn moderator_system(problem: &str) -> String {
    format!(
        "You are a moderator guiding a debate on: '{problem}'.\n\
         Your job is to facilitate discussion, summarize key points, identify common ground,\n\
         and ensure a productive exchange of ideas. Be impartial but incisive, encouraging\n\
         deep exploration of the topic while keeping participants focused.\n\n\
         You can request additional information on a topic by using [REF: your query] syntax.\n\
         For example, to get information about recent AI advancements, use [REF: recent advancements in AI]."
    )
}

pub fn welcome(problem: &str) -> String {
    format!(
        "Introduce the debate on '{problem}'. Explain that we'll be exploring this topic in a structured format \
         with experts from different domains. If relevant, use [REF: {problem}] to gather background information. \
         Keep it concise but welcoming."
    )
}

/// Direct perspective prompt, used when the persona's argument capability is unavailable.
pub fn perspective(problem: &str, knowledge_enabled: bool) -> String {
    let mut prompt = format!(
        "The moderator has asked you to share your perspective on the following problem:\n\n\
         '{problem}'\n\n\
         Provide your initial thoughts based on your unique expertise and thinking style.\n"
    );
    if knowledge_enabled {
        prompt.push_str(&format!(
            "To support your perspective, include at least one specific reference request \
             using [REF: your specific query] syntax.\n\n\
             For example: \"I believe [REF: latest innovations in {problem}] \
             will have a significant impact on this area.\"\n"
        ));
    }
    prompt.push_str("\nKeep your response under 150 words and focused on your area of expertise.");
    prompt
}

pub fn target_selection(problem: &str, perspectives: &str) -> String {
    format!(
        "Here are the perspectives on '{problem}':\n\n\
         {perspectives}\n\n\
         Based on your expertise and thinking style, which other expert's perspective would you \
         most want to critique or provide constructive feedback on? Choose ONE expert and explain \
         briefly why you selected them (in 1-2 sentences).\n\n\
         Format your response as: \"I choose to critique [EXPERT NAME] because [brief reason]\""
    )
}

pub fn critique(problem: &str, target: &str, target_perspective: &str) -> String {
    format!(
        "You've decided to critique {target}'s perspective on '{problem}':\n\n\
         {target_perspective}\n\n\
         You can reference external information using [REF: your query] to support your critique.\n\
         Provide a constructive critique based on your expertise. Identify potential limitations,\n\
         oversights, or areas that could be strengthened. Be specific and constructive.\n\n\
         Start with addressing {target} directly and keep your critique under 150 words."
    )
}

pub fn response(problem: &str, critiques_received: &str) -> String {
    format!(
        "You've received the following critiques of your perspective on '{problem}':\n\n\
         {critiques_received}\n\n\
         You can reference external information using [REF: your query] to support your response.\n\
         Respond to these critiques. Acknowledge valid points and defend or refine your\n\
         position where appropriate. Be thoughtful and constructive in your response.\n\n\
         Keep your response under 150 words."
    )
}

/// For agents nobody critiqued
pub fn reflection(problem: &str) -> String {
    format!(
        "You haven't received direct critiques of your perspective on '{problem}', \
         but you've observed the critiques exchanged between others.\n\n\
         You can reference external information using [REF: your query] if helpful.\n\
         Provide a brief response that reflects on how the critiques you've observed might\n\
         apply to or affect your own thinking on the problem.\n\n\
         Keep your response under 120 words."
    )
}

pub fn common_ground(debate_context: &str) -> String {
    format!(
        "Review the debate so far:\n\n\
         {debate_context}\n\n\
         Based on your expertise and the discussion, identify:\n\
         1. Key points of common ground across the different perspectives\n\
         2. How these different viewpoints might be integrated into a stronger approach\n\n\
         You can reference external information using [REF: your query] if it helps identify integration opportunities.\n\
         Structure your response clearly and keep it under 180 words."
    )
}

pub fn final_position(problem: &str, initial_perspective: &str) -> String {
    format!(
        "The debate on '{problem}' is concluding.\n\n\
         Your initial perspective was:\n\
         {initial_perspective}\n\n\
         Since then, you've engaged in critiques, responses, and finding common ground.\n\n\
         You can reference external information using [REF: your query] to help support your final position.\n\
         Provide your final position and recommendations:\n\n\
         1. Begin with \"Final Position:\" followed by your main stance\n\
         2. List 2-3 key recommendations based on the entire debate\n\
         3. Explain how your thinking has evolved from your initial perspective\n\n\
         Keep your response under 180 words."
    )
}

pub fn final_report(problem: &str) -> String {
    format!(
        "Generate a comprehensive final report on the debate about '{problem}'.\n\n\
         The report should include:\n\
         1. Executive Summary (2-3 sentences)\n\
         2. Key Perspectives (summarize each agent's main points)\n\
         3. Evolution of Ideas (how perspectives changed through debate)\n\
         4. Areas of Agreement and Disagreement\n\
         5. Integrated Solution (combining the best ideas)\n\
         6. Implementation Considerations\n\
         7. Recommendations for Further Research\n\n\
         Use markdown formatting for better readability."
    )
}

pub fn sentiment(text: &str) -> String {
    format!("Analyze the sentiment of this text: {text}")
}
